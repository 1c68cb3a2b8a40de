// Shared by every integration test binary; each one uses a subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use standup::database::Database;
use standup::error::FetchError;
use standup::github::client::{GitHubApi, SearchSpec};
use standup::github::types::{
    Assignee, AssigneeConnection, BoardFieldValue, BoardItem, BoardItemContent, BoardPage,
    FieldName, FieldValueConnection, OrgCredential, SearchItem,
};
use standup::github::AggregationRequest;

/// Setup an in-memory SQLite database for testing
pub async fn setup_test_db() -> Database {
    Database::new_in_memory()
        .await
        .expect("Failed to create test database")
}

enum BoardBehavior {
    Pages(Vec<BoardPage>),
    Endless,
    Fail(FetchError),
}

impl Default for BoardBehavior {
    fn default() -> Self {
        BoardBehavior::Pages(Vec::new())
    }
}

/// Configurable in-memory GitHub backend. Searches are keyed by their
/// query string and merged-PR scans by repository; anything not
/// configured returns an empty result. Every call is counted.
#[derive(Default)]
pub struct FakeGitHub {
    search: Mutex<HashMap<String, Result<Vec<SearchItem>, FetchError>>>,
    merged: Mutex<HashMap<String, Result<Vec<SearchItem>, FetchError>>>,
    board: Mutex<BoardBehavior>,
    search_delay: Mutex<Option<std::time::Duration>>,
    pub search_calls: AtomicU32,
    pub merged_calls: AtomicU32,
    pub board_calls: AtomicU32,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(&self, query: &str, result: Result<Vec<SearchItem>, FetchError>) {
        self.search.lock().unwrap().insert(query.to_string(), result);
    }

    pub fn on_merged(&self, repo: &str, result: Result<Vec<SearchItem>, FetchError>) {
        self.merged.lock().unwrap().insert(repo.to_string(), result);
    }

    /// Splits the given items into pages; the cursors chain them in order.
    pub fn set_board_pages(&self, pages: Vec<Vec<BoardItem>>) {
        let last = pages.len().saturating_sub(1);
        let built = pages
            .into_iter()
            .enumerate()
            .map(|(i, items)| BoardPage {
                items,
                has_next_page: i < last,
                end_cursor: if i < last {
                    Some(format!("page-{}", i + 1))
                } else {
                    None
                },
            })
            .collect();
        *self.board.lock().unwrap() = BoardBehavior::Pages(built);
    }

    /// Every board page claims another one follows it.
    pub fn set_board_endless(&self) {
        *self.board.lock().unwrap() = BoardBehavior::Endless;
    }

    pub fn set_board_failure(&self, err: FetchError) {
        *self.board.lock().unwrap() = BoardBehavior::Fail(err);
    }

    pub fn set_search_delay(&self, delay: std::time::Duration) {
        *self.search_delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    async fn search_items(
        &self,
        _token: &str,
        spec: &SearchSpec,
    ) -> Result<Vec<SearchItem>, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.search_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.search.lock().unwrap().get(&spec.to_query()).cloned();
        result.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn merged_prs(&self, _token: &str, repo: &str) -> Result<Vec<SearchItem>, FetchError> {
        self.merged_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.merged.lock().unwrap().get(repo).cloned();
        result.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn board_page(
        &self,
        _token: &str,
        _board_id: &str,
        cursor: Option<&str>,
    ) -> Result<BoardPage, FetchError> {
        self.board_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.board.lock().unwrap();
        match &*behavior {
            BoardBehavior::Fail(err) => Err(err.clone()),
            BoardBehavior::Endless => Ok(BoardPage {
                items: vec![board_issue(1, &["val"], None, 1)],
                has_next_page: true,
                end_cursor: Some("again".to_string()),
            }),
            BoardBehavior::Pages(pages) => {
                let index = match cursor {
                    None => 0,
                    Some(c) => c
                        .strip_prefix("page-")
                        .and_then(|n| n.parse::<usize>().ok())
                        .unwrap_or(0),
                };
                Ok(pages.get(index).cloned().unwrap_or(BoardPage {
                    items: Vec::new(),
                    has_next_page: false,
                    end_cursor: None,
                }))
            }
        }
    }
}

/// Minimal aggregation request; tests override the fields they exercise.
pub fn request(username: &str, orgs: &[(&str, Option<&str>)]) -> AggregationRequest {
    AggregationRequest {
        username: username.to_string(),
        orgs: orgs
            .iter()
            .map(|(org, token)| OrgCredential {
                org: org.to_string(),
                token: token.map(|t| t.to_string()),
            })
            .collect(),
        board: None,
        status_filter: None,
        stale_threshold: Duration::weeks(3),
        merge_repos: Vec::new(),
        merge_window_hours: 12,
        scan_all_status_fields: false,
        deadline: None,
    }
}

pub fn search_item(number: u64, title: &str, url: &str) -> SearchItem {
    SearchItem {
        number,
        title: title.to_string(),
        url: url.to_string(),
        state: "open".to_string(),
        created_at: Utc::now() - Duration::days(10),
        updated_at: Utc::now() - Duration::days(1),
        merged_at: None,
    }
}

pub fn merged_item(number: u64, url: &str, merged_hours_ago: i64) -> SearchItem {
    let mut item = search_item(number, &format!("PR {}", number), url);
    item.state = "closed".to_string();
    item.merged_at = Some(Utc::now() - Duration::hours(merged_hours_ago));
    item
}

/// Open board issue with the given assignees and optional Status value,
/// added to the board `added_days_ago` days ago.
pub fn board_issue(
    number: u64,
    assignees: &[&str],
    status: Option<&str>,
    added_days_ago: i64,
) -> BoardItem {
    let field_values = match status {
        Some(name) => FieldValueConnection {
            nodes: vec![BoardFieldValue::SingleSelect {
                field: FieldName {
                    name: "Status".to_string(),
                },
                name: Some(name.to_string()),
            }],
        },
        None => FieldValueConnection::default(),
    };
    BoardItem {
        created_at: Utc::now() - Duration::days(added_days_ago),
        content: Some(BoardItemContent {
            kind: "Issue".to_string(),
            number,
            title: format!("Issue {}", number),
            url: format!("https://github.com/acme/widgets/issues/{}", number),
            state: "OPEN".to_string(),
            created_at: Some(Utc::now() - Duration::days(added_days_ago + 3)),
            updated_at: Some(Utc::now() - Duration::days(1)),
            assignees: AssigneeConnection {
                nodes: assignees
                    .iter()
                    .map(|login| Assignee {
                        login: login.to_string(),
                    })
                    .collect(),
            },
        }),
        field_values,
    }
}
