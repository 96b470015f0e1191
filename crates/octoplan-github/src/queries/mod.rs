//! Typed GraphQL and REST operations.

use serde::Deserialize;

pub mod issues;
pub mod items;
pub mod projects;

/// A GraphQL connection, reduced to its nodes. Pagination beyond the
/// first page is bounded by the per-query `first` argument.
#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}
