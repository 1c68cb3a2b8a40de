use async_trait::async_trait;
use chrono::DateTime;
use octocrab::models::IssueState;
use octocrab::Octocrab;
use serde::Deserialize;

use crate::error::FetchError;
use crate::github::types::{BoardItem, BoardPage, ItemKind, SearchItem};

/// Upstream query surface the aggregation engine depends on. Production
/// code talks to GitHub through [`GitHubClient`]; tests substitute an
/// in-memory fake. Credentials are passed per call because each
/// organization carries its own token.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Flat issue/PR search scoped to one organization.
    async fn search_items(&self, token: &str, spec: &SearchSpec) -> Result<Vec<SearchItem>, FetchError>;

    /// Most recently closed pull requests of one repository, merged or not.
    async fn merged_prs(&self, token: &str, repo: &str) -> Result<Vec<SearchItem>, FetchError>;

    /// One page of up to 100 project-board items starting after `cursor`.
    async fn board_page(
        &self,
        token: &str,
        board_id: &str,
        cursor: Option<&str>,
    ) -> Result<BoardPage, FetchError>;
}

/// One org-scoped search: who the items belong to and what kind they are.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    pub org: String,
    pub predicate: SearchPredicate,
    pub kind: ItemKind,
    pub open_only: bool,
}

#[derive(Debug, Clone)]
pub enum SearchPredicate {
    Assignee(String),
    Mentions(String),
}

impl SearchSpec {
    pub fn assigned_issues(org: &str, username: &str) -> Self {
        SearchSpec {
            org: org.to_string(),
            predicate: SearchPredicate::Assignee(username.to_string()),
            kind: ItemKind::Issue,
            open_only: true,
        }
    }

    pub fn mentions(org: &str, username: &str, kind: ItemKind) -> Self {
        SearchSpec {
            org: org.to_string(),
            predicate: SearchPredicate::Mentions(username.to_string()),
            kind,
            open_only: false,
        }
    }

    pub fn to_query(&self) -> String {
        let mut query = format!("org:{}", self.org);
        match &self.predicate {
            SearchPredicate::Assignee(user) => {
                query.push_str(&format!(" assignee:{}", user));
            }
            SearchPredicate::Mentions(user) => {
                query.push_str(&format!(" mentions:{}", user));
            }
        }
        query.push_str(&format!(" is:{}", self.kind.search_term()));
        if self.open_only {
            query.push_str(" is:open");
        }
        query
    }
}

const PAGE_SIZE: u8 = 100;

const BOARD_QUERY: &str = r#"
query($board: ID!, $cursor: String) {
  node(id: $board) {
    ... on ProjectV2 {
      items(first: 100, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          createdAt
          content {
            __typename
            ... on Issue {
              number title url state createdAt updatedAt
              assignees(first: 10) { nodes { login } }
            }
            ... on PullRequest {
              number title url state createdAt updatedAt
              assignees(first: 10) { nodes { login } }
            }
            ... on DraftIssue { title createdAt updatedAt }
          }
          fieldValues(first: 20) {
            nodes {
              __typename
              ... on ProjectV2ItemFieldDateValue {
                date
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldTextValue {
                text
                field { ... on ProjectV2FieldCommon { name } }
              }
              ... on ProjectV2ItemFieldSingleSelectValue {
                name
                field { ... on ProjectV2FieldCommon { name } }
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// GitHub-backed implementation of [`GitHubApi`]. The base URI is
/// overridable so integration tests can point it at a mock server.
pub struct GitHubClient {
    base_uri: Option<String>,
}

impl GitHubClient {
    pub fn new() -> Self {
        Self { base_uri: None }
    }

    pub fn with_base_uri(uri: impl Into<String>) -> Self {
        Self {
            base_uri: Some(uri.into()),
        }
    }

    fn octocrab(&self, token: &str) -> Result<Octocrab, FetchError> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(uri) = &self.base_uri {
            builder = builder
                .base_uri(uri)
                .map_err(|e| FetchError::Unreachable(format!("invalid base URI: {}", e)))?;
        }
        builder
            .build()
            .map_err(|e| FetchError::Unreachable(format!("failed to build client: {}", e)))
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn search_items(&self, token: &str, spec: &SearchSpec) -> Result<Vec<SearchItem>, FetchError> {
        let octocrab = self.octocrab(token)?;
        let page = octocrab
            .search()
            .issues_and_pull_requests(&spec.to_query())
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(classify)?;
        Ok(page.items.iter().map(search_item_from_issue).collect())
    }

    async fn merged_prs(&self, token: &str, repo: &str) -> Result<Vec<SearchItem>, FetchError> {
        let (owner, name) = repo.split_once('/').ok_or_else(|| {
            FetchError::MalformedResponse(format!("repository must be owner/name: {}", repo))
        })?;
        let octocrab = self.octocrab(token)?;
        let page = octocrab
            .pulls(owner, name)
            .list()
            .state(octocrab::params::State::Closed)
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(classify)?;
        Ok(page.items.iter().map(search_item_from_pull).collect())
    }

    async fn board_page(
        &self,
        token: &str,
        board_id: &str,
        cursor: Option<&str>,
    ) -> Result<BoardPage, FetchError> {
        let octocrab = self.octocrab(token)?;
        let payload = serde_json::json!({
            "query": BOARD_QUERY,
            "variables": { "board": board_id, "cursor": cursor },
        });
        let response: serde_json::Value = octocrab.graphql(&payload).await.map_err(classify)?;

        if let Some(errors) = response.get("errors").and_then(|e| e.as_array()) {
            if !errors.is_empty() {
                let detail = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(FetchError::MalformedResponse(format!(
                    "board query rejected: {}",
                    detail
                )));
            }
        }

        let items = response.pointer("/data/node/items").cloned().ok_or_else(|| {
            FetchError::MalformedResponse("board response missing items connection".to_string())
        })?;
        let connection: ItemConnection = serde_json::from_value(items)
            .map_err(|e| FetchError::MalformedResponse(format!("board page: {}", e)))?;

        Ok(BoardPage {
            items: connection.nodes,
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemConnection {
    page_info: PageInfo,
    nodes: Vec<BoardItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

fn search_item_from_issue(issue: &octocrab::models::issues::Issue) -> SearchItem {
    let state = match issue.state {
        IssueState::Closed => "closed",
        _ => "open",
    };
    SearchItem {
        number: issue.number as u64,
        title: issue.title.clone(),
        url: issue.html_url.to_string(),
        state: state.to_string(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        merged_at: None,
    }
}

fn search_item_from_pull(pr: &octocrab::models::pulls::PullRequest) -> SearchItem {
    let state = if pr.merged_at.is_some() {
        "merged"
    } else {
        match pr.state {
            Some(IssueState::Closed) => "closed",
            _ => "open",
        }
    };
    SearchItem {
        number: pr.number as u64,
        title: pr.title.clone().unwrap_or_default(),
        url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
        state: state.to_string(),
        created_at: pr.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        updated_at: pr.updated_at.or(pr.created_at).unwrap_or(DateTime::UNIX_EPOCH),
        merged_at: pr.merged_at,
    }
}

/// Maps transport failures onto the fetch taxonomy: HTTP 401/403 is an
/// authentication problem, decode failures are malformed responses, and
/// everything else counts as unreachable.
fn classify(err: octocrab::Error) -> FetchError {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            if status == 401 || status == 403 {
                FetchError::AuthFailed(source.message.clone())
            } else {
                FetchError::Unreachable(format!("GitHub API error ({}): {}", status, source.message))
            }
        }
        octocrab::Error::Serde { source, .. } => FetchError::MalformedResponse(source.to_string()),
        octocrab::Error::Json { source, .. } => FetchError::MalformedResponse(source.to_string()),
        other => FetchError::Unreachable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigned_search_query_shape() {
        let spec = SearchSpec::assigned_issues("acme", "val");
        assert_eq!(spec.to_query(), "org:acme assignee:val is:issue is:open");
    }

    #[test]
    fn mention_search_queries_include_both_kinds() {
        let issues = SearchSpec::mentions("acme", "val", ItemKind::Issue);
        assert_eq!(issues.to_query(), "org:acme mentions:val is:issue");
        let prs = SearchSpec::mentions("acme", "val", ItemKind::PullRequest);
        assert_eq!(prs.to_query(), "org:acme mentions:val is:pr");
    }
}
