use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One organization paired with the credential that scopes its searches.
/// A missing token is not an error here; the aggregator downgrades it to
/// a warning and skips the org.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgCredential {
    pub org: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Issue,
    PullRequest,
}

impl ItemKind {
    /// Qualifier used in a search query, e.g. `is:issue`.
    pub fn search_term(&self) -> &'static str {
        match self {
            ItemKind::Issue => "issue",
            ItemKind::PullRequest => "pr",
        }
    }

    /// GraphQL `__typename` for board item content of this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            ItemKind::Issue => "Issue",
            ItemKind::PullRequest => "PullRequest",
        }
    }
}

/// Normalized issue record. Identity is `(repository, number)`; `number`
/// is only unique within one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub repository: String,
    /// When the item entered the project board; None for search results.
    pub added_to_board_at: Option<DateTime<Utc>>,
    /// Single-select value of the board field named "Status", if any.
    pub board_status: Option<String>,
}

/// Normalized pull request record. `merged_at` absent means never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub repository: String,
}

/// Flat record as returned by the search and pull-listing endpoints,
/// before normalization into `Issue` or `PullRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// One page of board items as reported by the upstream, along with the
/// cursor state driving the pagination loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPage {
    pub items: Vec<BoardItem>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Raw project-board entry: the wrapped content plus board-level metadata.
/// `created_at` is the time the item was added to the board, not the time
/// the underlying issue was opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItem {
    pub created_at: DateTime<Utc>,
    pub content: Option<BoardItemContent>,
    #[serde(default)]
    pub field_values: FieldValueConnection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValueConnection {
    pub nodes: Vec<BoardFieldValue>,
}

/// Issue or pull request payload inside a board item. Draft issues carry
/// no URL or number, hence the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardItemContent {
    #[serde(rename = "__typename")]
    pub kind: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub state: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignees: AssigneeConnection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssigneeConnection {
    pub nodes: Vec<Assignee>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignee {
    pub login: String,
}

/// Typed custom field value, tagged by the upstream type name. Field
/// kinds this program does not consume fold into `Other`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum BoardFieldValue {
    #[serde(rename = "ProjectV2ItemFieldDateValue")]
    Date {
        field: FieldName,
        date: Option<NaiveDate>,
    },
    #[serde(rename = "ProjectV2ItemFieldTextValue")]
    Text {
        field: FieldName,
        text: Option<String>,
    },
    #[serde(rename = "ProjectV2ItemFieldSingleSelectValue")]
    SingleSelect {
        field: FieldName,
        name: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldName {
    pub name: String,
}
