//! Credential classification and capability gating.
//!
//! GitHub token classes are detected from the token's prefix shape alone;
//! classification never touches the network. The classified credential is
//! built once at process start and threaded into every component.

use std::fmt;

use serde::Serialize;

use crate::error::Error;

/// Prefix of classic personal access tokens.
const CLASSIC_PAT_PREFIX: &str = "ghp_";

/// Prefix of fine-grained personal access tokens.
const FINE_GRAINED_PAT_PREFIX: &str = "github_pat_";

/// Capability class of a GitHub credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityClass {
    /// Classic PAT: every protocol path, including organization-scoped GraphQL.
    Full,
    /// Fine-grained PAT: repository-scoped REST only. The Projects v2
    /// GraphQL API rejects these tokens.
    Restricted,
    /// Missing or unrecognized token shape.
    Unknown,
}

impl CapabilityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Restricted => "restricted",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CapabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protocol surface an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Projects v2 GraphQL API.
    Graph,
    /// Repository-scoped REST API.
    Rest,
}

/// A GitHub credential with its capability classification.
#[derive(Debug, Clone)]
pub struct Credential {
    token: Option<String>,
    class: CapabilityClass,
    diagnostic: Option<String>,
}

impl Credential {
    /// Classify a raw token string. Pure: the same input always yields the
    /// same class.
    pub fn classify(token: Option<&str>) -> Self {
        match token {
            None | Some("") => Self {
                token: None,
                class: CapabilityClass::Unknown,
                diagnostic: Some("credential not configured".to_string()),
            },
            Some(t) if t.starts_with(CLASSIC_PAT_PREFIX) => Self {
                token: Some(t.to_string()),
                class: CapabilityClass::Full,
                diagnostic: None,
            },
            Some(t) if t.starts_with(FINE_GRAINED_PAT_PREFIX) => Self {
                token: Some(t.to_string()),
                class: CapabilityClass::Restricted,
                diagnostic: Some(
                    "fine-grained tokens cannot run the Projects v2 GraphQL API; \
                     use a classic token (ghp_...) for project tools"
                        .to_string(),
                ),
            },
            Some(t) => Self {
                token: Some(t.to_string()),
                class: CapabilityClass::Unknown,
                diagnostic: Some(
                    "unrecognized token format; assuming full access".to_string(),
                ),
            },
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn class(&self) -> CapabilityClass {
        self.class
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Gate check: only a restricted token is rejected, and only for the
    /// GraphQL surface. Unknown shapes pass and are flagged via
    /// [`Credential::diagnostic`].
    pub fn suitable_for(&self, required: Capability) -> bool {
        !(required == Capability::Graph && self.class == CapabilityClass::Restricted)
    }

    /// Structured refusal for an operation the gate rejected.
    pub fn unsuitable_error(&self) -> Error {
        Error::CredentialUnsuitable {
            class: self.class,
            diagnostic: self
                .diagnostic
                .clone()
                .unwrap_or_else(|| "credential cannot run this operation".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_missing() {
        for token in [None, Some("")] {
            let cred = Credential::classify(token);
            assert_eq!(cred.class(), CapabilityClass::Unknown);
            assert_eq!(cred.diagnostic(), Some("credential not configured"));
            assert!(cred.token().is_none());
        }
    }

    #[test]
    fn test_classify_classic() {
        let cred = Credential::classify(Some("ghp_abc123"));
        assert_eq!(cred.class(), CapabilityClass::Full);
        assert!(cred.diagnostic().is_none());
    }

    #[test]
    fn test_classify_fine_grained() {
        let cred = Credential::classify(Some("github_pat_11ABC"));
        assert_eq!(cred.class(), CapabilityClass::Restricted);
        assert!(cred.diagnostic().unwrap().contains("fine-grained"));
    }

    #[test]
    fn test_classify_unrecognized_is_advisory() {
        let cred = Credential::classify(Some("gho_something"));
        assert_eq!(cred.class(), CapabilityClass::Unknown);
        assert!(cred.diagnostic().is_some());
        // Flagged but not blocked.
        assert!(cred.suitable_for(Capability::Graph));
    }

    #[test]
    fn test_classify_is_pure() {
        let a = Credential::classify(Some("ghp_same"));
        let b = Credential::classify(Some("ghp_same"));
        assert_eq!(a.class(), b.class());
    }

    #[test]
    fn test_gate_rejects_only_restricted_graph() {
        let restricted = Credential::classify(Some("github_pat_11ABC"));
        assert!(!restricted.suitable_for(Capability::Graph));
        assert!(restricted.suitable_for(Capability::Rest));

        let full = Credential::classify(Some("ghp_abc"));
        assert!(full.suitable_for(Capability::Graph));
        assert!(full.suitable_for(Capability::Rest));

        let unknown = Credential::classify(None);
        assert!(unknown.suitable_for(Capability::Graph));
    }

    #[test]
    fn test_unsuitable_error_carries_diagnostic() {
        let restricted = Credential::classify(Some("github_pat_11ABC"));
        let err = restricted.unsuitable_error();
        let text = err.to_string();
        assert!(text.contains("restricted"));
        assert!(text.contains("fine-grained"));
    }
}
