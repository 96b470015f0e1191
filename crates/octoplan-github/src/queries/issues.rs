//! Repository issue operations (REST path).
//!
//! These stay available to every credential class, including fine-grained
//! tokens that the GraphQL gate turns away.

use octoplan_core::{Error, Result};
use serde_json::{json, Value};

use crate::client::GithubClient;

const ISSUES_PAGE_MAX: u64 = 100;

/// Create an issue.
pub async fn create_issue(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    title: &str,
    body: Option<&str>,
    labels: &[String],
) -> Result<Value> {
    let mut payload = json!({ "title": title });
    if let Some(body) = body {
        payload["body"] = json!(body);
    }
    if !labels.is_empty() {
        payload["labels"] = json!(labels);
    }
    client
        .rest_post(&format!("/repos/{owner}/{repo}/issues"), &payload)
        .await
}

/// List issues of a repository.
pub async fn list_issues(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    state: Option<&str>,
    limit: Option<u64>,
) -> Result<Value> {
    let state = state.unwrap_or("open");
    let per_page = limit.unwrap_or(30).min(ISSUES_PAGE_MAX);
    client
        .rest_get(&format!(
            "/repos/{owner}/{repo}/issues?state={state}&per_page={per_page}"
        ))
        .await
}

/// Fetch one issue.
pub async fn get_issue(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    number: i64,
) -> Result<Value> {
    client
        .rest_get(&format!("/repos/{owner}/{repo}/issues/{number}"))
        .await
}

/// The GraphQL node id of an issue, needed to attach it to a project.
pub async fn issue_node_id(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    number: i64,
) -> Result<String> {
    let issue = get_issue(client, owner, repo, number).await?;
    issue
        .get("node_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::RemoteRequestFailed {
            status: None,
            message: format!("issue #{number} response carried no node_id"),
            docs_url: None,
        })
}

/// Comment on an issue.
pub async fn add_comment(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    number: i64,
    body: &str,
) -> Result<Value> {
    client
        .rest_post(
            &format!("/repos/{owner}/{repo}/issues/{number}/comments"),
            &json!({ "body": body }),
        )
        .await
}

/// Open or close an issue. `state` is passed through; the remote rejects
/// anything but "open" and "closed".
pub async fn update_issue_state(
    client: &GithubClient,
    owner: &str,
    repo: &str,
    number: i64,
    state: &str,
) -> Result<Value> {
    client
        .rest_patch(
            &format!("/repos/{owner}/{repo}/issues/{number}"),
            &json!({ "state": state }),
        )
        .await
}
