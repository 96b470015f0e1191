//! Project, field and view tools (GraphQL path).

use serde_json::Value;

use octoplan_github::fetch_project_fields;
use octoplan_github::queries::projects::{self, OwnerType};

use super::{graph_client, optional_str, outcome_from, required_i64, required_str, ToolOutcome};
use crate::context::AppContext;
use crate::server::JsonRpcError;

pub async fn list_projects(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let owner_type = match OwnerType::parse(optional_str(args, "owner_type")) {
        Ok(parsed) => parsed,
        Err(err) => return Ok(ToolOutcome::fail(&err)),
    };
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = projects::list_projects(client, owner, owner_type)
        .await
        .and_then(|projects| Ok(serde_json::to_value(projects)?));
    Ok(outcome_from(result))
}

pub async fn get_project(ctx: &AppContext, args: &Value) -> Result<ToolOutcome, JsonRpcError> {
    let owner = required_str(args, "owner")?;
    let number = required_i64(args, "number")?;
    let owner_type = match OwnerType::parse(optional_str(args, "owner_type")) {
        Ok(parsed) => parsed,
        Err(err) => return Ok(ToolOutcome::fail(&err)),
    };
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = projects::get_project(client, owner, number, owner_type)
        .await
        .and_then(|project| Ok(serde_json::to_value(project)?));
    Ok(outcome_from(result))
}

pub async fn get_project_fields(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = fetch_project_fields(client, project_id)
        .await
        .and_then(|catalog| Ok(serde_json::to_value(catalog.fields())?));
    Ok(outcome_from(result))
}

pub async fn get_project_views(
    ctx: &AppContext,
    args: &Value,
) -> Result<ToolOutcome, JsonRpcError> {
    let project_id = required_str(args, "project_id")?;
    let client = match graph_client(ctx) {
        Ok(client) => client,
        Err(refusal) => return Ok(refusal),
    };

    let result = projects::list_views(client, project_id)
        .await
        .and_then(|views| Ok(serde_json::to_value(views)?));
    Ok(outcome_from(result))
}
