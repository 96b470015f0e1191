//! GitHub API client.
//!
//! One client per process, shared by every tool invocation. Suspension
//! happens only here, at the network boundary.

use octoplan_core::credential::Credential;
use octoplan_core::{Error, Result};
use serde_json::{json, Value};
use tracing::debug;

/// Default GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Default REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// HTTP client for the GitHub GraphQL and REST APIs.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    graphql_url: String,
    api_url: String,
}

impl GithubClient {
    /// Create a client for the given credential. Fails when no token is
    /// configured.
    pub fn new(credential: &Credential) -> Result<Self> {
        let token = credential
            .token()
            .ok_or(Error::CredentialMissing)?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent(concat!("octoplan/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Ok(Self {
            http,
            token,
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Override both endpoints (fixture servers, GitHub Enterprise).
    pub fn with_endpoints(
        mut self,
        graphql_url: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        self.graphql_url = graphql_url.into();
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Execute a GraphQL query or mutation and return its `data` payload.
    pub async fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        debug!(url = %self.graphql_url, "GraphQL request");

        let response = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http_error(status.as_u16(), &body));
        }

        let body: Value = response.json().await.map_err(transport_error)?;
        graphql_data(status.as_u16(), body)
    }

    pub async fn rest_get(&self, path: &str) -> Result<Value> {
        self.rest(reqwest::Method::GET, path, None).await
    }

    pub async fn rest_post(&self, path: &str, body: &Value) -> Result<Value> {
        self.rest(reqwest::Method::POST, path, Some(body)).await
    }

    pub async fn rest_patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.rest(reqwest::Method::PATCH, path, Some(body)).await
    }

    async fn rest(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.api_url, path);
        debug!(%method, url = %url, "REST request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(http_error(status.as_u16(), &text));
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(Error::from)
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    Error::RemoteRequestFailed {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
        docs_url: None,
    }
}

/// Map a non-success HTTP response, keeping GitHub's own message and docs
/// link when the body is the usual `{message, documentation_url}` shape.
fn http_error(status: u16, body: &str) -> Error {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "request failed".to_string()
            } else {
                trimmed.to_string()
            }
        });
    let docs_url = parsed
        .as_ref()
        .and_then(|v| v.get("documentation_url"))
        .and_then(Value::as_str)
        .map(str::to_string);

    if status == 404 {
        Error::RemoteNotFound(message)
    } else {
        Error::RemoteRequestFailed {
            status: Some(status),
            message,
            docs_url,
        }
    }
}

/// Extract `data` from a GraphQL body, surfacing the error list verbatim.
fn graphql_data(status: u16, mut body: Value) -> Result<Value> {
    let errors: Vec<Value> = body
        .get("errors")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if !errors.is_empty() {
        let message = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; ");
        let message = if message.is_empty() {
            "GraphQL request failed".to_string()
        } else {
            message
        };

        if errors
            .iter()
            .any(|e| e.get("type").and_then(Value::as_str) == Some("NOT_FOUND"))
        {
            return Err(Error::RemoteNotFound(message));
        }
        return Err(Error::RemoteRequestFailed {
            status: Some(status),
            message,
            docs_url: None,
        });
    }

    Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}
