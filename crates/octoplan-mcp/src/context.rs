//! Process-wide context threaded into every tool handler.

use octoplan_core::credential::Credential;
use octoplan_core::{Error, Result};
use octoplan_github::{GithubClient, DEFAULT_API_URL, DEFAULT_GRAPHQL_URL};

use crate::audit::AuditLog;

/// Everything a tool handler needs: the classified credential, the shared
/// remote caller and the optional audit sink. Built once at process start;
/// no component reads the environment after that.
pub struct AppContext {
    pub credential: Credential,
    client: Option<GithubClient>,
    pub audit: Option<AuditLog>,
}

impl AppContext {
    pub fn new(credential: Credential, audit: Option<AuditLog>) -> Self {
        let client = GithubClient::new(&credential).ok();
        Self {
            credential,
            client,
            audit,
        }
    }

    /// Point the remote caller at non-default endpoints (fixture servers,
    /// GitHub Enterprise).
    pub fn with_endpoints(
        mut self,
        graphql_url: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        if let Some(client) = self.client.take() {
            self.client = Some(client.with_endpoints(
                graphql_url.unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string()),
                api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ));
        }
        self
    }

    /// The shared remote caller; absent only when no token is configured.
    pub fn client(&self) -> Result<&GithubClient> {
        self.client.as_ref().ok_or(Error::CredentialMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_without_token_has_no_client() {
        let ctx = AppContext::new(Credential::classify(None), None);
        assert!(matches!(ctx.client(), Err(Error::CredentialMissing)));
    }

    #[test]
    fn test_context_with_token_has_client() {
        let ctx = AppContext::new(Credential::classify(Some("ghp_abc")), None);
        assert!(ctx.client().is_ok());
    }
}
