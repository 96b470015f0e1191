//! Project field model.
//!
//! Field definitions are discovered from the remote project schema on
//! demand and live only for the current tool invocation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod resolve;

pub use resolve::{resolve_value, ResolvedValue};

/// Data type of a project field.
///
/// Closed set: any type the remote schema grows that is not listed here
/// deserializes into `Unsupported` and is rejected by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldDataType {
    Text,
    Number,
    Date,
    SingleSelect,
    Iteration,
    #[serde(other)]
    Unsupported,
}

/// One selectable option of a single-select field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub name: String,
}

/// One iteration of an iteration field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Iteration {
    pub id: String,
    pub title: String,
}

/// A project field definition as discovered from the remote schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    pub data_type: FieldDataType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iterations: Vec<Iteration>,
}

/// The field definitions of one project, with id and name lookup.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<FieldDefinition>,
}

impl FieldCatalog {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    /// Exact, case-sensitive id match.
    pub fn by_id(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Exact, case-sensitive name match.
    pub fn by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// `by_name` that upgrades a miss into [`Error::FieldNotFound`] carrying
    /// every name the lookup compared against.
    pub fn require(&self, name: &str) -> Result<&FieldDefinition> {
        self.by_name(name).ok_or_else(|| Error::FieldNotFound {
            name: name.to_string(),
            available: self.names(),
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> FieldCatalog {
        FieldCatalog::new(vec![
            FieldDefinition {
                id: "F1".to_string(),
                name: "Status".to_string(),
                data_type: FieldDataType::SingleSelect,
                options: vec![],
                iterations: vec![],
            },
            FieldDefinition {
                id: "F2".to_string(),
                name: "Points".to_string(),
                data_type: FieldDataType::Number,
                options: vec![],
                iterations: vec![],
            },
        ])
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = catalog();
        assert!(catalog.by_name("Status").is_some());
        assert!(catalog.by_name("status").is_none());
        assert!(catalog.by_id("F2").is_some());
        assert!(catalog.by_id("f2").is_none());
    }

    #[test]
    fn test_require_miss_carries_available_names() {
        let catalog = catalog();
        let err = catalog.require("Sprint").unwrap_err();
        match err {
            Error::FieldNotFound { name, available } => {
                assert_eq!(name, "Sprint");
                assert_eq!(available, vec!["Status".to_string(), "Points".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_data_type_deserializes_unknown_as_unsupported() {
        let parsed: FieldDataType = serde_json::from_str("\"ASSIGNEES\"").unwrap();
        assert_eq!(parsed, FieldDataType::Unsupported);

        let parsed: FieldDataType = serde_json::from_str("\"SINGLE_SELECT\"").unwrap();
        assert_eq!(parsed, FieldDataType::SingleSelect);
    }
}
