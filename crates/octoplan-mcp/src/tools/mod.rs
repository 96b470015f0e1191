//! Tool catalogue and dispatch.

use octoplan_core::credential::Capability;
use octoplan_core::normalize::{normalize, ResultItem};
use octoplan_core::Error;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::context::AppContext;
use crate::server::JsonRpcError;

use octoplan_github::GithubClient;

pub mod issues;
pub mod items;
pub mod projects;

/// Tool definition.
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// What a tool handler produced: the normalized content plus whether it
/// represents a failure. The server turns `failed` into the envelope's
/// `isError` flag.
#[derive(Debug)]
pub struct ToolOutcome {
    pub content: Vec<ResultItem>,
    pub failed: bool,
}

impl ToolOutcome {
    pub fn ok(content: Vec<ResultItem>) -> Self {
        Self {
            content,
            failed: false,
        }
    }

    /// Fold any taxonomy error into a diagnostic item. Resolution errors
    /// already enumerate what was tried and the valid alternatives.
    pub fn fail(err: &Error) -> Self {
        info!(error = %err, "tool failed");
        Self {
            content: vec![ResultItem::text(render_error(err))],
            failed: true,
        }
    }
}

fn render_error(err: &Error) -> String {
    match err {
        Error::RemoteRequestFailed {
            docs_url: Some(url),
            ..
        } => format!("{err}\nSee {url}"),
        _ => err.to_string(),
    }
}

/// Dispatch one tool call by name.
pub async fn dispatch(
    ctx: &AppContext,
    name: &str,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    match name {
        "list_projects" => projects::list_projects(ctx, args).await,
        "get_project" => projects::get_project(ctx, args).await,
        "get_project_fields" => projects::get_project_fields(ctx, args).await,
        "get_project_views" => projects::get_project_views(ctx, args).await,
        "get_project_items" => items::get_project_items(ctx, args).await,
        "add_item_to_project" => items::add_item_to_project(ctx, args).await,
        "add_draft_issue" => items::add_draft_issue(ctx, args).await,
        "update_project_item_field" => items::update_project_item_field(ctx, args).await,
        "delete_project_item" => items::delete_project_item(ctx, args).await,
        "add_issues_to_project" => items::add_issues_to_project(ctx, args).await,
        "bulk_update_issue_status" => items::bulk_update_issue_status(ctx, args).await,
        "create_issue" => issues::create_issue(ctx, args).await,
        "list_issues" => issues::list_issues(ctx, args).await,
        "get_issue" => issues::get_issue(ctx, args).await,
        "add_issue_comment" => issues::add_issue_comment(ctx, args).await,
        "update_issue_state" => issues::update_issue_state(ctx, args).await,
        _ => Err(JsonRpcError::method_not_found(format!(
            "Unknown tool: {name}"
        ))),
    }
}

/// Gate for GraphQL-path tools: a restricted token is refused here, with
/// its diagnostic, before any remote call is issued.
pub(crate) fn graph_client(ctx: &AppContext) -> Result<&GithubClient, ToolOutcome> {
    if !ctx.credential.suitable_for(Capability::Graph) {
        return Err(ToolOutcome::fail(&ctx.credential.unsuitable_error()));
    }
    ctx.client().map_err(|err| ToolOutcome::fail(&err))
}

/// REST-path tools only need a configured token.
pub(crate) fn rest_client(ctx: &AppContext) -> Result<&GithubClient, ToolOutcome> {
    ctx.client().map_err(|err| ToolOutcome::fail(&err))
}

/// Normalize a handler result into an outcome.
pub(crate) fn outcome_from(result: octoplan_core::Result<Value>) -> ToolOutcome {
    match result {
        Ok(value) => ToolOutcome::ok(normalize(&value)),
        Err(err) => ToolOutcome::fail(&err),
    }
}

pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, JsonRpcError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {key}")))
}

pub(crate) fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub(crate) fn required_i64(args: &Value, key: &str) -> Result<i64, JsonRpcError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {key}")))
}

pub(crate) fn optional_u64(args: &Value, key: &str) -> Option<u64> {
    args.get(key).and_then(Value::as_u64)
}

pub(crate) fn required_numbers(args: &Value, key: &str) -> Result<Vec<i64>, JsonRpcError> {
    let elements = args
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| JsonRpcError::invalid_params(format!("Missing {key}")))?;

    elements
        .iter()
        .map(|element| {
            element
                .as_i64()
                .ok_or_else(|| JsonRpcError::invalid_params(format!("{key} must be a list of numbers")))
        })
        .collect()
}

/// Tool definitions advertised by `tools/list`.
pub fn tool_definitions() -> Vec<Tool> {
    fn tool(name: &str, description: &str, input_schema: Value) -> Tool {
        Tool {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }

    vec![
        tool(
            "list_projects",
            "List the GitHub Projects of an organization or user",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Organization or user login" },
                    "owner_type": { "type": "string", "description": "\"organization\" or \"user\"; probed automatically when omitted" }
                },
                "required": ["owner"]
            }),
        ),
        tool(
            "get_project",
            "Get one project by owner and project number",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Organization or user login" },
                    "number": { "type": "number", "description": "Project number" },
                    "owner_type": { "type": "string", "description": "\"organization\" or \"user\"" }
                },
                "required": ["owner", "number"]
            }),
        ),
        tool(
            "get_project_fields",
            "List the fields of a project with their options and iterations",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" }
                },
                "required": ["project_id"]
            }),
        ),
        tool(
            "get_project_views",
            "List the views of a project",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" }
                },
                "required": ["project_id"]
            }),
        ),
        tool(
            "get_project_items",
            "List the items of a project (issues, pull requests, drafts)",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "limit": { "type": "number", "description": "Maximum items to return (default 30)" }
                },
                "required": ["project_id"]
            }),
        ),
        tool(
            "add_item_to_project",
            "Add an existing issue or pull request to a project by content id",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "content_id": { "type": "string", "description": "Issue or pull request node id" }
                },
                "required": ["project_id", "content_id"]
            }),
        ),
        tool(
            "add_draft_issue",
            "Add a draft issue to a project",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "title": { "type": "string", "description": "Draft title" },
                    "body": { "type": "string", "description": "Draft body" }
                },
                "required": ["project_id", "title"]
            }),
        ),
        tool(
            "update_project_item_field",
            "Set a field of a project item. Single-select and iteration values go by name",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "item_id": { "type": "string", "description": "Project item id" },
                    "field_name": { "type": "string", "description": "Field name, exact match" },
                    "value": { "description": "Raw value: text, number, YYYY-MM-DD date, option name or iteration title" }
                },
                "required": ["project_id", "item_id", "field_name", "value"]
            }),
        ),
        tool(
            "delete_project_item",
            "Remove an item from a project",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "item_id": { "type": "string", "description": "Project item id" }
                },
                "required": ["project_id", "item_id"]
            }),
        ),
        tool(
            "add_issues_to_project",
            "Add repository issues to a project by number, best effort, optionally setting fields on each",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "issue_numbers": { "type": "array", "items": { "type": "number" }, "description": "Issue numbers to add" },
                    "field_values": { "type": "object", "description": "Optional field name to raw value map applied to each added item" }
                },
                "required": ["project_id", "owner", "repo", "issue_numbers"]
            }),
        ),
        tool(
            "bulk_update_issue_status",
            "Move several issues to a status column, best effort, optionally commenting on each",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "project_id": { "type": "string", "description": "Project node id" },
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "issue_numbers": { "type": "array", "items": { "type": "number" }, "description": "Issue numbers to update" },
                    "status": { "type": "string", "description": "Target status option name" },
                    "status_field": { "type": "string", "description": "Status field name (default \"Status\")" },
                    "comment": { "type": "string", "description": "Optional comment added to each issue" }
                },
                "required": ["project_id", "owner", "repo", "issue_numbers", "status"]
            }),
        ),
        tool(
            "create_issue",
            "Create a repository issue",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "title": { "type": "string", "description": "Issue title" },
                    "body": { "type": "string", "description": "Issue body" },
                    "labels": { "type": "array", "items": { "type": "string" }, "description": "Label names" }
                },
                "required": ["owner", "repo", "title"]
            }),
        ),
        tool(
            "list_issues",
            "List repository issues",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "state": { "type": "string", "description": "open, closed or all (default open)" },
                    "limit": { "type": "number", "description": "Maximum issues to return (default 30)" }
                },
                "required": ["owner", "repo"]
            }),
        ),
        tool(
            "get_issue",
            "Get one repository issue by number",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "number": { "type": "number", "description": "Issue number" }
                },
                "required": ["owner", "repo", "number"]
            }),
        ),
        tool(
            "add_issue_comment",
            "Comment on a repository issue",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "number": { "type": "number", "description": "Issue number" },
                    "body": { "type": "string", "description": "Comment body" }
                },
                "required": ["owner", "repo", "number", "body"]
            }),
        ),
        tool(
            "update_issue_state",
            "Open or close a repository issue",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "owner": { "type": "string", "description": "Repository owner" },
                    "repo": { "type": "string", "description": "Repository name" },
                    "number": { "type": "number", "description": "Issue number" },
                    "state": { "type": "string", "description": "\"open\" or \"closed\"" }
                },
                "required": ["owner", "repo", "number", "state"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use octoplan_core::credential::Credential;

    fn restricted_ctx() -> AppContext {
        AppContext::new(Credential::classify(Some("github_pat_11ABC")), None)
    }

    #[tokio::test]
    async fn test_graph_tools_refuse_restricted_tokens_without_remote_calls() {
        // No fixture server is running: reaching the network would fail in a
        // completely different way than the structured refusal asserted here.
        let ctx = restricted_ctx();
        let outcome = dispatch(&ctx, "list_projects", &serde_json::json!({ "owner": "acme" }))
            .await
            .unwrap();
        assert!(outcome.failed);
        assert!(outcome.content[0].text.contains("fine-grained"));
        assert!(outcome.content[0].text.contains("restricted"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_a_method_error() {
        let ctx = restricted_ctx();
        let err = dispatch(&ctx, "no_such_tool", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, -32601);
    }

    #[tokio::test]
    async fn test_missing_argument_is_invalid_params() {
        let ctx = restricted_ctx();
        let err = dispatch(&ctx, "list_projects", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[test]
    fn test_every_tool_schema_is_an_object() {
        for tool in tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
        }
    }

    #[test]
    fn test_dispatch_covers_every_advertised_tool() {
        // Names here must match the dispatch table; a rename in one place
        // only would silently break the tool.
        let names: Vec<String> = tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 16);
        assert!(names.contains(&"update_project_item_field".to_string()));
        assert!(names.contains(&"bulk_update_issue_status".to_string()));
    }
}
