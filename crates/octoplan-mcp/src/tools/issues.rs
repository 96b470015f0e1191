//! Repository issue tools (REST path). Available to every credential
//! class, including fine-grained tokens.

use serde_json::Value;

use octoplan_github::queries::issues;

use super::{optional_str, optional_u64, outcome_from, required_i64, required_str, rest_client, ToolOutcome};
use crate::context::AppContext;
use crate::server::JsonRpcError;

pub async fn create_issue(ctx: &AppContext, args: &Value) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let title = required_str(args, "title")?;
    let body = optional_str(args, "body");
    let labels: Vec<String> = args
        .get("labels")
        .and_then(Value::as_array)
        .map(|elements| {
            elements
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let client = match rest_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = issues::create_issue(client, owner, repo, title, body, &labels).await;
    Ok(outcome_from(result))
}

pub async fn list_issues(ctx: &AppContext, args: &Value) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let state = optional_str(args, "state");
    let limit = optional_u64(args, "limit");
    let client = match rest_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = issues::list_issues(client, owner, repo, state, limit).await;
    Ok(outcome_from(result))
}

pub async fn get_issue(ctx: &AppContext, args: &Value) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let number = required_i64(args, "number")?;
    let client = match rest_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = issues::get_issue(client, owner, repo, number).await;
    Ok(outcome_from(result))
}

pub async fn add_issue_comment(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let number = required_i64(args, "number")?;
    let body = required_str(args, "body")?;
    let client = match rest_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = issues::add_comment(client, owner, repo, number, body).await;
    Ok(outcome_from(result))
}

pub async fn update_issue_state(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let number = required_i64(args, "number")?;
    let state = required_str(args, "state")?;
    let client = match rest_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = issues::update_issue_state(client, owner, repo, number, state).await;
    Ok(outcome_from(result))
}
