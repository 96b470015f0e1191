//! Project and view queries.

use octoplan_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::Connection;
use crate::client::GithubClient;

const ORG_PROJECTS_QUERY: &str = r#"
query ($login: String!, $first: Int!) {
  organization(login: $login) {
    projectsV2(first: $first) {
      nodes { id number title url closed }
    }
  }
}
"#;

const USER_PROJECTS_QUERY: &str = r#"
query ($login: String!, $first: Int!) {
  user(login: $login) {
    projectsV2(first: $first) {
      nodes { id number title url closed }
    }
  }
}
"#;

const ORG_PROJECT_QUERY: &str = r#"
query ($login: String!, $number: Int!) {
  organization(login: $login) {
    projectV2(number: $number) { id number title url closed }
  }
}
"#;

const USER_PROJECT_QUERY: &str = r#"
query ($login: String!, $number: Int!) {
  user(login: $login) {
    projectV2(number: $number) { id number title url closed }
  }
}
"#;

const VIEWS_QUERY: &str = r#"
query ($projectId: ID!) {
  node(id: $projectId) {
    ... on ProjectV2 {
      views(first: 20) {
        nodes { id name layout }
      }
    }
  }
}
"#;

const PROJECTS_PAGE: i64 = 20;

/// A ProjectV2 summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub number: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub closed: bool,
}

/// A ProjectV2 view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    pub id: String,
    pub name: String,
    pub layout: String,
}

/// Owner kind for project queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerType {
    Organization,
    User,
}

impl OwnerType {
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        match raw {
            None => Ok(None),
            Some("organization") | Some("org") => Ok(Some(Self::Organization)),
            Some("user") => Ok(Some(Self::User)),
            Some(other) => Err(Error::ValueFormatInvalid {
                field: "owner_type".to_string(),
                value: other.to_string(),
                expected: "\"organization\" or \"user\"".to_string(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ProjectsData {
    organization: Option<ProjectsOwner>,
    user: Option<ProjectsOwner>,
}

#[derive(Deserialize)]
struct ProjectsOwner {
    #[serde(rename = "projectsV2")]
    projects: Option<Connection<Project>>,
}

#[derive(Deserialize)]
struct ProjectData {
    organization: Option<ProjectOwner>,
    user: Option<ProjectOwner>,
}

#[derive(Deserialize)]
struct ProjectOwner {
    #[serde(rename = "projectV2")]
    project: Option<Project>,
}

/// List the projects of an owner. With no explicit owner type, the
/// organization scope is probed first, then the user scope.
pub async fn list_projects(
    client: &GithubClient,
    owner: &str,
    owner_type: Option<OwnerType>,
) -> Result<Vec<Project>> {
    match owner_type {
        Some(owner_type) => list_projects_as(client, owner, owner_type).await,
        None => match list_projects_as(client, owner, OwnerType::Organization).await {
            Err(Error::RemoteNotFound(_)) => {
                list_projects_as(client, owner, OwnerType::User).await
            }
            other => other,
        },
    }
}

async fn list_projects_as(
    client: &GithubClient,
    owner: &str,
    owner_type: OwnerType,
) -> Result<Vec<Project>> {
    let query = match owner_type {
        OwnerType::Organization => ORG_PROJECTS_QUERY,
        OwnerType::User => USER_PROJECTS_QUERY,
    };
    let data = client
        .graphql(query, json!({ "login": owner, "first": PROJECTS_PAGE }))
        .await?;

    let parsed: ProjectsData = serde_json::from_value(data)?;
    let connection = parsed
        .organization
        .or(parsed.user)
        .and_then(|o| o.projects)
        .ok_or_else(|| Error::RemoteNotFound(format!("owner {owner}")))?;
    Ok(connection.nodes)
}

/// Look up one project by owner and number.
pub async fn get_project(
    client: &GithubClient,
    owner: &str,
    number: i64,
    owner_type: Option<OwnerType>,
) -> Result<Project> {
    match owner_type {
        Some(owner_type) => get_project_as(client, owner, number, owner_type).await,
        None => match get_project_as(client, owner, number, OwnerType::Organization).await {
            Err(Error::RemoteNotFound(_)) => {
                get_project_as(client, owner, number, OwnerType::User).await
            }
            other => other,
        },
    }
}

async fn get_project_as(
    client: &GithubClient,
    owner: &str,
    number: i64,
    owner_type: OwnerType,
) -> Result<Project> {
    let query = match owner_type {
        OwnerType::Organization => ORG_PROJECT_QUERY,
        OwnerType::User => USER_PROJECT_QUERY,
    };
    let data = client
        .graphql(query, json!({ "login": owner, "number": number }))
        .await?;

    let parsed: ProjectData = serde_json::from_value(data)?;
    parsed
        .organization
        .or(parsed.user)
        .and_then(|o| o.project)
        .ok_or_else(|| Error::RemoteNotFound(format!("project {number} of {owner}")))
}

#[derive(Deserialize)]
struct ViewsData {
    node: Option<ViewsNode>,
}

#[derive(Deserialize)]
struct ViewsNode {
    views: Option<Connection<View>>,
}

/// List the views of a project.
pub async fn list_views(client: &GithubClient, project_id: &str) -> Result<Vec<View>> {
    let data = client
        .graphql(VIEWS_QUERY, json!({ "projectId": project_id }))
        .await?;

    let parsed: ViewsData = serde_json::from_value(data)?;
    let connection = parsed
        .node
        .and_then(|node| node.views)
        .ok_or_else(|| Error::RemoteNotFound(format!("project {project_id}")))?;
    Ok(connection.nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_type_parse() {
        assert_eq!(OwnerType::parse(None).unwrap(), None);
        assert_eq!(
            OwnerType::parse(Some("organization")).unwrap(),
            Some(OwnerType::Organization)
        );
        assert_eq!(OwnerType::parse(Some("org")).unwrap(), Some(OwnerType::Organization));
        assert_eq!(OwnerType::parse(Some("user")).unwrap(), Some(OwnerType::User));
        assert!(OwnerType::parse(Some("team")).is_err());
    }

    #[test]
    fn test_projects_data_deserializes_either_scope() {
        let data = serde_json::json!({
            "organization": null,
            "user": { "projectsV2": { "nodes": [
                { "id": "P1", "number": 3, "title": "Roadmap", "url": "https://example.com", "closed": false }
            ] } }
        });
        let parsed: ProjectsData = serde_json::from_value(data).unwrap();
        let projects = parsed.organization.or(parsed.user).and_then(|o| o.projects).unwrap();
        assert_eq!(projects.nodes.len(), 1);
        assert_eq!(projects.nodes[0].title, "Roadmap");
    }
}
