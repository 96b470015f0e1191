//! GitHub remote caller for octoplan.
//!
//! GraphQL for the Projects v2 API, REST for repository issues. All
//! remote failures are mapped into the octoplan error taxonomy with the
//! raw status and message preserved.

pub mod client;
pub mod fields;
pub mod queries;

pub use client::{GithubClient, DEFAULT_API_URL, DEFAULT_GRAPHQL_URL};
pub use fields::{fetch_project_fields, FieldCache};
