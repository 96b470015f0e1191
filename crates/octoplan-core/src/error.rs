//! Centralized error types for octoplan.

use thiserror::Error;

use crate::credential::CapabilityClass;

/// Main error type for octoplan operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub token not configured. Set the GITHUB_TOKEN environment variable.")]
    CredentialMissing,

    #[error("Token cannot run this operation ({class} token): {diagnostic}")]
    CredentialUnsuitable {
        class: CapabilityClass,
        diagnostic: String,
    },

    #[error("Field not found: '{name}'. Available fields: {}", .available.join(", "))]
    FieldNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("No option named '{value}' on field '{field}'. Valid options: {}", .available.join(", "))]
    OptionNotFound {
        field: String,
        value: String,
        available: Vec<String>,
    },

    #[error("Invalid value '{value}' for field '{field}': expected {expected}")]
    ValueFormatInvalid {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Field '{field}' has a data type octoplan cannot set. Supported types: text, number, date, single select, iteration")]
    UnsupportedFieldType { field: String },

    #[error("Not found on GitHub: {0}")]
    RemoteNotFound(String),

    #[error("GitHub request failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RemoteRequestFailed {
        status: Option<u16>,
        message: String,
        docs_url: Option<String>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for octoplan operations.
pub type Result<T> = std::result::Result<T, Error>;
