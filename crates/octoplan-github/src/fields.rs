//! Project field metadata.
//!
//! Fetches a project's field definitions (with option and iteration
//! catalogues) and memoizes them per project id for the life of a single
//! tool invocation. There is deliberately no cross-call cache: every
//! invocation re-discovers the schema, trading latency for
//! staleness-safety.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use octoplan_core::field::{FieldCatalog, FieldDataType, FieldDefinition, Iteration, SelectOption};
use octoplan_core::{Error, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::GithubClient;
use crate::queries::Connection;

const FIELDS_QUERY: &str = r#"
query ($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      fields(first: 100) {
        nodes {
          ... on ProjectV2Field { id name dataType }
          ... on ProjectV2SingleSelectField { id name dataType options { id name } }
          ... on ProjectV2IterationField {
            id name dataType
            configuration {
              iterations { id title }
              completedIterations { id title }
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Deserialize)]
struct FieldsData {
    node: Option<FieldsNode>,
}

#[derive(Deserialize)]
struct FieldsNode {
    fields: Option<Connection<RawField>>,
}

#[derive(Deserialize)]
struct RawField {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "dataType")]
    data_type: Option<FieldDataType>,
    #[serde(default)]
    options: Vec<SelectOption>,
    configuration: Option<IterationConfiguration>,
}

#[derive(Deserialize)]
struct IterationConfiguration {
    #[serde(default)]
    iterations: Vec<Iteration>,
    #[serde(default, rename = "completedIterations")]
    completed_iterations: Vec<Iteration>,
}

/// Fetch the field catalogue of one project.
pub async fn fetch_project_fields(
    client: &GithubClient,
    project_id: &str,
) -> Result<FieldCatalog> {
    let data = client
        .graphql(FIELDS_QUERY, json!({ "projectId": project_id }))
        .await?;
    catalog_from_data(project_id, data)
}

fn catalog_from_data(project_id: &str, data: Value) -> Result<FieldCatalog> {
    let parsed: FieldsData = serde_json::from_value(data)?;
    let connection = parsed
        .node
        .and_then(|node| node.fields)
        .ok_or_else(|| Error::RemoteNotFound(format!("project {project_id}")))?;

    let fields: Vec<FieldDefinition> = connection
        .nodes
        .into_iter()
        .filter_map(into_definition)
        .collect();

    debug!(project_id, count = fields.len(), "fetched project fields");
    Ok(FieldCatalog::new(fields))
}

fn into_definition(raw: RawField) -> Option<FieldDefinition> {
    // Union members that matched no fragment come back as empty objects.
    let id = raw.id?;
    let name = raw.name?;
    let data_type = raw.data_type?;

    let mut iterations = Vec::new();
    if let Some(configuration) = raw.configuration {
        iterations.extend(configuration.iterations);
        // Completed iterations stay resolvable by title.
        iterations.extend(configuration.completed_iterations);
    }

    Some(FieldDefinition {
        id,
        name,
        data_type,
        options: raw.options,
        iterations,
    })
}

/// Request-scoped memoization of field catalogues, keyed by project id.
///
/// Bulk tools resolve several values against the same project; one fetch
/// per project per invocation is enough. Single-threaded by contract: the
/// interior borrow is never held across an await.
#[derive(Default)]
pub struct FieldCache {
    entries: RefCell<HashMap<String, Arc<FieldCatalog>>>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalogue for `project_id`, fetched at most once per cache
    /// lifetime.
    pub async fn catalog(
        &self,
        client: &GithubClient,
        project_id: &str,
    ) -> Result<Arc<FieldCatalog>> {
        if let Some(hit) = self.entries.borrow().get(project_id) {
            return Ok(hit.clone());
        }

        let fetched = Arc::new(fetch_project_fields(client, project_id).await?);
        self.entries
            .borrow_mut()
            .insert(project_id.to_string(), fetched.clone());
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Value {
        json!({
            "node": {
                "fields": {
                    "nodes": [
                        { "id": "F0", "name": "Title", "dataType": "TITLE" },
                        { "id": "F1", "name": "Points", "dataType": "NUMBER" },
                        {
                            "id": "F2",
                            "name": "Status",
                            "dataType": "SINGLE_SELECT",
                            "options": [
                                { "id": "o1", "name": "Todo" },
                                { "id": "o2", "name": "Done" }
                            ]
                        },
                        {
                            "id": "F3",
                            "name": "Sprint",
                            "dataType": "ITERATION",
                            "configuration": {
                                "iterations": [{ "id": "i2", "title": "Sprint 2" }],
                                "completedIterations": [{ "id": "i1", "title": "Sprint 1" }]
                            }
                        },
                        {}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_catalog_from_fixture() {
        let catalog = catalog_from_data("P1", fixture()).unwrap();
        assert_eq!(catalog.len(), 4);

        // Unknown remote data types survive as Unsupported, not as errors.
        assert_eq!(
            catalog.by_name("Title").unwrap().data_type,
            FieldDataType::Unsupported
        );

        let status = catalog.by_name("Status").unwrap();
        assert_eq!(status.data_type, FieldDataType::SingleSelect);
        assert_eq!(status.options.len(), 2);

        let sprint = catalog.by_name("Sprint").unwrap();
        let titles: Vec<&str> = sprint.iterations.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Sprint 2", "Sprint 1"]);
    }

    #[test]
    fn test_missing_project_node_is_not_found() {
        let err = catalog_from_data("P404", json!({ "node": null })).unwrap_err();
        match err {
            Error::RemoteNotFound(message) => assert!(message.contains("P404")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_project_node_is_not_found() {
        let err = catalog_from_data("I1", json!({ "node": {} })).unwrap_err();
        assert!(matches!(err, Error::RemoteNotFound(_)));
    }
}
