//! Project item tools (GraphQL path), including the bulk operations.

use serde_json::{json, Map, Value};

use octoplan_core::batch::{run_batch, BatchItem, BatchReport};
use octoplan_core::field::resolve_value;
use octoplan_core::normalize::{normalize, ResultItem};
use octoplan_core::{Error, Result as CoreResult};
use octoplan_github::queries::{issues, items};
use octoplan_github::{fetch_project_fields, FieldCache, GithubClient};

use super::{
    graph_client, optional_str, optional_u64, outcome_from, required_numbers, required_str,
    ToolOutcome,
};
use crate::context::AppContext;
use crate::server::JsonRpcError;

pub async fn get_project_items(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let limit = optional_u64(args, "limit");
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = items::list_items(client, project_id, limit)
        .await
        .map(Value::Array);
    Ok(outcome_from(result))
}

pub async fn add_item_to_project(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let content_id = required_str(args, "content_id")?;
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    Ok(match items::add_item(client, project_id, content_id).await {
        Ok(item_id) => ToolOutcome::ok(vec![ResultItem::text(format!(
            "Added item {item_id} to project"
        ))]),
        Err(err) => ToolOutcome::fail(&err),
    })
}

pub async fn add_draft_issue(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let title = required_str(args, "title")?;
    let body = optional_str(args, "body");
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    Ok(
        match items::add_draft_issue(client, project_id, title, body).await {
            Ok(item_id) => ToolOutcome::ok(vec![ResultItem::text(format!(
                "Added draft '{title}' as item {item_id}"
            ))]),
            Err(err) => ToolOutcome::fail(&err),
        },
    )
}

pub async fn update_project_item_field(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let item_id = required_str(args, "item_id")?;
    let field_name = required_str(args, "field_name")?;
    let raw_value = args
        .get("value")
        .cloned()
        .ok_or_else(|| JsonRpcError::invalid_params("Missing value"))?;
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = async {
        let catalog = fetch_project_fields(client, project_id).await?;
        let field = catalog.require(field_name)?;
        let resolved = resolve_value(field, &raw_value)?;
        items::update_field_value(client, project_id, item_id, &field.id, &resolved).await?;
        Ok::<_, Error>(format!("Updated '{}' on item {item_id}", field.name))
    }
    .await;

    Ok(match result {
        Ok(message) => ToolOutcome::ok(vec![ResultItem::text(message)]),
        Err(err) => ToolOutcome::fail(&err),
    })
}

pub async fn delete_project_item(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let item_id = required_str(args, "item_id")?;
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    Ok(match items::delete_item(client, project_id, item_id).await {
        Ok(deleted) => ToolOutcome::ok(vec![ResultItem::text(format!(
            "Deleted item {deleted} from project"
        ))]),
        Err(err) => ToolOutcome::fail(&err),
    })
}

pub async fn add_issues_to_project(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let numbers = required_numbers(args, "issue_numbers")?;
    let field_values = args.get("field_values").and_then(Value::as_object).cloned();
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let cache = FieldCache::new();
    let cache = &cache;
    let field_values = field_values.as_ref();

    let report = run_batch(
        numbers,
        |number| format!("#{number}"),
        move |number| async move {
            let node_id = issues::issue_node_id(client, owner, repo, number).await?;
            let item_id = items::add_item(client, project_id, &node_id).await?;

            // Field values are a secondary effect: the item stays added
            // even when one of them cannot be applied.
            let secondary_error =
                apply_field_values(client, cache, project_id, &item_id, field_values).await;

            Ok(BatchItem {
                value: json!({ "issue": number, "item_id": item_id }),
                secondary_error,
            })
        },
    )
    .await;

    Ok(batch_outcome("Added issues to project", report))
}

pub async fn bulk_update_issue_status(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let owner = required_str(args, "owner")?;
    let repo = required_str(args, "repo")?;
    let numbers = required_numbers(args, "issue_numbers")?;
    let status = required_str(args, "status")?;
    let status_field = optional_str(args, "status_field").unwrap_or("Status");
    let comment = optional_str(args, "comment");
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let cache = FieldCache::new();
    let cache = &cache;

    let report = run_batch(
        numbers,
        |number| format!("#{number}"),
        move |number| async move {
            let catalog = cache.catalog(client, project_id).await?;
            let field = catalog.require(status_field)?;
            let resolved = resolve_value(field, &Value::String(status.to_string()))?;

            let item_id =
                items::find_item_for_issue(client, project_id, owner, repo, number).await?;
            items::update_field_value(client, project_id, &item_id, &field.id, &resolved)
                .await?;

            // The status move holds even when the comment fails.
            let secondary_error = match comment {
                Some(body) => issues::add_comment(client, owner, repo, number, body)
                    .await
                    .err()
                    .map(|err| format!("comment failed: {err}")),
                None => None,
            };

            Ok(BatchItem {
                value: json!({ "issue": number, "item_id": item_id, "status": status }),
                secondary_error,
            })
        },
    )
    .await;

    Ok(batch_outcome("Updated issue status", report))
}

/// Apply each requested field to a freshly added item, recording failures
/// without undoing the add. One metadata fetch serves the whole batch via
/// the cache.
async fn apply_field_values(
    client: &GithubClient,
    cache: &FieldCache,
    project_id: &str,
    item_id: &str,
    field_values: Option<&Map<String, Value>>,
) -> Option<String> {
    let field_values = field_values?;
    let mut failures = Vec::new();

    for (name, raw) in field_values {
        let applied: CoreResult<()> = async {
            let catalog = cache.catalog(client, project_id).await?;
            let field = catalog.require(name)?;
            let resolved = resolve_value(field, raw)?;
            items::update_field_value(client, project_id, item_id, &field.id, &resolved).await
        }
        .await;

        if let Err(err) = applied {
            failures.push(err.to_string());
        }
    }

    if failures.is_empty() {
        None
    } else {
        Some(failures.join("; "))
    }
}

/// Render a batch report: the aggregate line first, then one item per
/// outcome so every failure stays attributable to its input.
fn batch_outcome(action: &str, report: BatchReport<Value>) -> ToolOutcome {
    let mut content = vec![ResultItem::text(format!("{action}: {}", report.summary()))];
    match serde_json::to_value(&report.outcomes) {
        Ok(outcomes) => content.extend(normalize(&outcomes)),
        Err(err) => content.push(ResultItem::text(format!("outcomes unavailable: {err}"))),
    }
    ToolOutcome::ok(content)
}
