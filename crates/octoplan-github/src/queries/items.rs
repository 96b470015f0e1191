//! Project item queries and mutations.

use octoplan_core::field::ResolvedValue;
use octoplan_core::{Error, Result};
use serde_json::{json, Value};

use crate::client::GithubClient;

const ITEMS_QUERY: &str = r#"
query ($projectId: ID!, $first: Int!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      items(first: $first) {
        nodes {
          id
          type
          content {
            ... on Issue { title number state body }
            ... on PullRequest { title number state body }
            ... on DraftIssue { title body }
          }
        }
      }
    }
  }
}
"#;

const ADD_ITEM_MUTATION: &str = r#"
mutation ($projectId: ID!, $contentId: ID!) {
  addProjectV2ItemById(input: { projectId: $projectId, contentId: $contentId }) {
    item { id }
  }
}
"#;

const ADD_DRAFT_MUTATION: &str = r#"
mutation ($projectId: ID!, $title: String!, $body: String) {
  addProjectV2DraftIssue(input: { projectId: $projectId, title: $title, body: $body }) {
    projectItem { id }
  }
}
"#;

const UPDATE_FIELD_MUTATION: &str = r#"
mutation ($projectId: ID!, $itemId: ID!, $fieldId: ID!, $value: ProjectV2FieldValue!) {
  updateProjectV2ItemFieldValue(
    input: { projectId: $projectId, itemId: $itemId, fieldId: $fieldId, value: $value }
  ) {
    projectV2Item { id }
  }
}
"#;

const DELETE_ITEM_MUTATION: &str = r#"
mutation ($projectId: ID!, $itemId: ID!) {
  deleteProjectV2Item(input: { projectId: $projectId, itemId: $itemId }) {
    deletedItemId
  }
}
"#;

const ISSUE_ITEMS_QUERY: &str = r#"
query ($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    issue(number: $number) {
      projectItems(first: 50) {
        nodes {
          id
          project { id }
        }
      }
    }
  }
}
"#;

const ITEMS_PAGE_MAX: u64 = 100;

/// List the items of a project, flattened for display: each element is
/// the item's content (title, number, state, body) with the project item
/// id attached.
pub async fn list_items(
    client: &GithubClient,
    project_id: &str,
    limit: Option<u64>,
) -> Result<Vec<Value>> {
    let first = limit.unwrap_or(30).min(ITEMS_PAGE_MAX);
    let data = client
        .graphql(ITEMS_QUERY, json!({ "projectId": project_id, "first": first }))
        .await?;

    let node = data.get("node").cloned().unwrap_or(Value::Null);
    if node.is_null() {
        return Err(Error::RemoteNotFound(format!("project {project_id}")));
    }

    let nodes = node
        .pointer("/items/nodes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Ok(nodes.into_iter().map(flatten_item).collect())
}

/// Merge an item's content with its project item id, the id every
/// follow-up mutation needs.
fn flatten_item(node: Value) -> Value {
    let item_id = node.get("id").cloned();
    let mut merged = match node.get("content") {
        Some(content) if content.is_object() => content.clone(),
        _ => json!({}),
    };
    if let (Some(object), Some(id)) = (merged.as_object_mut(), item_id) {
        object.insert("id".to_string(), id);
    }
    merged
}

/// Add existing content (issue or pull request) to a project; returns the
/// new project item id.
pub async fn add_item(
    client: &GithubClient,
    project_id: &str,
    content_id: &str,
) -> Result<String> {
    let data = client
        .graphql(
            ADD_ITEM_MUTATION,
            json!({ "projectId": project_id, "contentId": content_id }),
        )
        .await?;
    id_at(&data, "/addProjectV2ItemById/item/id")
}

/// Add a draft issue to a project; returns the new project item id.
pub async fn add_draft_issue(
    client: &GithubClient,
    project_id: &str,
    title: &str,
    body: Option<&str>,
) -> Result<String> {
    let data = client
        .graphql(
            ADD_DRAFT_MUTATION,
            json!({ "projectId": project_id, "title": title, "body": body }),
        )
        .await?;
    id_at(&data, "/addProjectV2DraftIssue/projectItem/id")
}

/// Set one field of one item to an already-resolved value.
pub async fn update_field_value(
    client: &GithubClient,
    project_id: &str,
    item_id: &str,
    field_id: &str,
    value: &ResolvedValue,
) -> Result<()> {
    client
        .graphql(
            UPDATE_FIELD_MUTATION,
            json!({
                "projectId": project_id,
                "itemId": item_id,
                "fieldId": field_id,
                "value": value.to_input(),
            }),
        )
        .await?;
    Ok(())
}

/// Remove an item from a project; returns the deleted item id.
pub async fn delete_item(
    client: &GithubClient,
    project_id: &str,
    item_id: &str,
) -> Result<String> {
    let data = client
        .graphql(
            DELETE_ITEM_MUTATION,
            json!({ "projectId": project_id, "itemId": item_id }),
        )
        .await?;
    id_at(&data, "/deleteProjectV2Item/deletedItemId")
}

/// Find the project item representing an issue on one specific project.
pub async fn find_item_for_issue(
    client: &GithubClient,
    project_id: &str,
    owner: &str,
    repo: &str,
    number: i64,
) -> Result<String> {
    let data = client
        .graphql(
            ISSUE_ITEMS_QUERY,
            json!({ "owner": owner, "repo": repo, "number": number }),
        )
        .await?;

    let nodes = data
        .pointer("/repository/issue/projectItems/nodes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    nodes
        .iter()
        .find(|node| {
            node.pointer("/project/id").and_then(Value::as_str) == Some(project_id)
        })
        .and_then(|node| node.get("id").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| {
            Error::RemoteNotFound(format!(
                "issue #{number} of {owner}/{repo} has no item on project {project_id}"
            ))
        })
}

fn id_at(data: &Value, pointer: &str) -> Result<String> {
    data.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::RemoteRequestFailed {
            status: None,
            message: format!("malformed mutation response: missing {pointer}"),
            docs_url: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_item_merges_content_and_item_id() {
        let flattened = flatten_item(json!({
            "id": "PVTI_1",
            "type": "ISSUE",
            "content": { "title": "Fix bug", "number": 5, "state": "OPEN" }
        }));
        assert_eq!(flattened["id"], "PVTI_1");
        assert_eq!(flattened["title"], "Fix bug");
        assert_eq!(flattened["number"], 5);
    }

    #[test]
    fn test_flatten_item_without_content() {
        let flattened = flatten_item(json!({ "id": "PVTI_2", "content": null }));
        assert_eq!(flattened, json!({ "id": "PVTI_2" }));
    }

    #[test]
    fn test_id_at_reports_malformed_responses() {
        let err = id_at(&json!({}), "/addProjectV2ItemById/item/id").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
