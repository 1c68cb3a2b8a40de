//! Project-board fetch and the board-side filtering rules.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::FetchError;
use crate::github::client::GitHubApi;
use crate::github::normalize::issue_from_board_item;
use crate::github::staleness::is_stale;
use crate::github::types::{BoardFieldValue, BoardItem, Issue, ItemKind};

/// Board statuses that mean an item is already being handled elsewhere
/// and should not show up in a standup view.
pub const EXCLUDED_STATUSES: [&str; 4] = [
    "set for development",
    "needs code review",
    "waiting for customer feedback",
    "customer reported",
];

/// Upper bound on board pagination. A board reporting more pages than
/// this is treated as misbehaving rather than paged forever.
pub const MAX_BOARD_PAGES: u32 = 1000;

/// Walks the cursor-paginated items of one board, 100 per page, until the
/// upstream reports no further page. All-or-nothing: a failed page fails
/// the whole fetch, and pages are fetched strictly in sequence because
/// each cursor comes from the previous response.
pub async fn fetch_board_items(
    api: &dyn GitHubApi,
    token: &str,
    board_id: &str,
) -> Result<Vec<BoardItem>, FetchError> {
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages: u32 = 0;

    loop {
        if pages >= MAX_BOARD_PAGES {
            return Err(FetchError::TooManyPages(MAX_BOARD_PAGES));
        }
        let page = api.board_page(token, board_id, cursor.as_deref()).await?;
        pages += 1;
        debug!(page = pages, items = page.items.len(), "fetched board page");
        items.extend(page.items);
        if !page.has_next_page {
            break;
        }
        cursor = page.end_cursor;
    }

    Ok(items)
}

/// Ordered inclusion rules for one board item; the first failing rule
/// excludes it. `scan_all_status_fields` widens the exclusion check from
/// the first single-select field to every single-select field.
pub struct BoardFilter<'a> {
    pub kind: ItemKind,
    pub excluded_statuses: &'a [&'a str],
    pub status_filter: Option<&'a str>,
    pub require_assignee: Option<&'a str>,
    pub scan_all_status_fields: bool,
}

impl BoardFilter<'_> {
    pub fn include(&self, item: &BoardItem) -> bool {
        let content = match &item.content {
            Some(content) => content,
            None => return false,
        };
        if content.kind != self.kind.type_name() {
            return false;
        }
        if content.state.eq_ignore_ascii_case("closed") {
            return false;
        }
        if self.has_excluded_status(item) {
            return false;
        }
        if let Some(filter) = self.status_filter {
            if !filter.is_empty() && !matches_status(item, filter) {
                return false;
            }
        }
        if let Some(user) = self.require_assignee {
            if !content.assignees.nodes.iter().any(|a| a.login == user) {
                return false;
            }
        }
        true
    }

    fn has_excluded_status(&self, item: &BoardItem) -> bool {
        for fv in &item.field_values.nodes {
            if let BoardFieldValue::SingleSelect { name, .. } = fv {
                let value = name.as_deref().unwrap_or("");
                if self
                    .excluded_statuses
                    .iter()
                    .any(|excluded| excluded.eq_ignore_ascii_case(value))
                {
                    return true;
                }
                // Historical behavior: only the first single-select field
                // is consulted, whatever it is named.
                if !self.scan_all_status_fields {
                    return false;
                }
            }
        }
        false
    }
}

/// True when any single-select value equals the filter, ignoring case.
fn matches_status(item: &BoardItem, filter: &str) -> bool {
    item.field_values.nodes.iter().any(|fv| {
        matches!(
            fv,
            BoardFieldValue::SingleSelect { name: Some(value), .. }
                if value.eq_ignore_ascii_case(filter)
        )
    })
}

/// Open board issues assigned to `username`, in board order.
pub fn project_issues_for_user(
    items: &[BoardItem],
    username: &str,
    status_filter: Option<&str>,
    scan_all_status_fields: bool,
) -> Vec<Issue> {
    let filter = BoardFilter {
        kind: ItemKind::Issue,
        excluded_statuses: &EXCLUDED_STATUSES,
        status_filter,
        require_assignee: Some(username),
        scan_all_status_fields,
    };
    items
        .iter()
        .filter(|item| filter.include(item))
        .filter_map(|item| issue_from_board_item(item))
        .collect()
}

/// Open board issues that have sat on the board strictly longer than
/// `threshold`, regardless of assignee.
pub fn stale_project_issues(
    items: &[BoardItem],
    status_filter: Option<&str>,
    threshold: Duration,
    now: DateTime<Utc>,
    scan_all_status_fields: bool,
) -> Vec<Issue> {
    let filter = BoardFilter {
        kind: ItemKind::Issue,
        excluded_statuses: &EXCLUDED_STATUSES,
        status_filter,
        require_assignee: None,
        scan_all_status_fields,
    };
    items
        .iter()
        .filter(|item| filter.include(item))
        .filter(|item| is_stale(item.created_at, threshold, now))
        .filter_map(|item| issue_from_board_item(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{
        Assignee, AssigneeConnection, BoardItemContent, FieldName, FieldValueConnection,
    };
    use chrono::TimeZone;

    fn select(field: &str, value: &str) -> BoardFieldValue {
        BoardFieldValue::SingleSelect {
            field: FieldName {
                name: field.to_string(),
            },
            name: Some(value.to_string()),
        }
    }

    fn board_issue(state: &str, assignees: &[&str], fields: Vec<BoardFieldValue>) -> BoardItem {
        let added = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        BoardItem {
            created_at: added,
            content: Some(BoardItemContent {
                kind: "Issue".to_string(),
                number: 1,
                title: "Sample".to_string(),
                url: "https://github.com/acme/widgets/issues/1".to_string(),
                state: state.to_string(),
                created_at: Some(added),
                updated_at: Some(added),
                assignees: AssigneeConnection {
                    nodes: assignees
                        .iter()
                        .map(|login| Assignee {
                            login: login.to_string(),
                        })
                        .collect(),
                },
            }),
            field_values: FieldValueConnection { nodes: fields },
        }
    }

    fn default_filter<'a>() -> BoardFilter<'a> {
        BoardFilter {
            kind: ItemKind::Issue,
            excluded_statuses: &EXCLUDED_STATUSES,
            status_filter: None,
            require_assignee: None,
            scan_all_status_fields: false,
        }
    }

    #[test]
    fn closed_items_always_excluded() {
        let filter = BoardFilter {
            status_filter: Some("in progress"),
            ..default_filter()
        };
        let item = board_issue("CLOSED", &["val"], vec![select("Status", "In Progress")]);
        assert!(!filter.include(&item));
    }

    #[test]
    fn excluded_status_wins_over_matching_filter() {
        let filter = BoardFilter {
            excluded_statuses: &["stale"],
            status_filter: Some("stale"),
            ..default_filter()
        };
        let item = board_issue("OPEN", &[], vec![select("Status", "Stale")]);
        assert!(!filter.include(&item));
    }

    #[test]
    fn excluded_status_match_is_case_insensitive() {
        let filter = default_filter();
        let item = board_issue("OPEN", &[], vec![select("Status", "Set For Development")]);
        assert!(!filter.include(&item));
    }

    #[test]
    fn only_first_single_select_is_consulted_by_default() {
        let filter = default_filter();
        let item = board_issue(
            "OPEN",
            &[],
            vec![
                select("Priority", "High"),
                select("Status", "Needs code review"),
            ],
        );
        assert!(filter.include(&item));
    }

    #[test]
    fn scan_all_status_fields_widens_the_exclusion_check() {
        let filter = BoardFilter {
            scan_all_status_fields: true,
            ..default_filter()
        };
        let item = board_issue(
            "OPEN",
            &[],
            vec![
                select("Priority", "High"),
                select("Status", "Needs code review"),
            ],
        );
        assert!(!filter.include(&item));
    }

    #[test]
    fn status_filter_requires_a_case_insensitive_match() {
        let filter = BoardFilter {
            status_filter: Some("in progress"),
            ..default_filter()
        };
        let matching = board_issue("OPEN", &[], vec![select("Status", "In Progress")]);
        let other = board_issue("OPEN", &[], vec![select("Status", "Blocked")]);
        assert!(filter.include(&matching));
        assert!(!filter.include(&other));
    }

    #[test]
    fn empty_status_filter_matches_everything() {
        let filter = BoardFilter {
            status_filter: Some(""),
            ..default_filter()
        };
        let item = board_issue("OPEN", &[], vec![]);
        assert!(filter.include(&item));
    }

    #[test]
    fn assignment_mode_requires_membership() {
        let filter = BoardFilter {
            require_assignee: Some("val"),
            ..default_filter()
        };
        let mine = board_issue("OPEN", &["someone", "val"], vec![]);
        let other = board_issue("OPEN", &["someone"], vec![]);
        assert!(filter.include(&mine));
        assert!(!filter.include(&other));
    }

    #[test]
    fn wrong_content_kind_is_excluded() {
        let filter = default_filter();
        let mut item = board_issue("OPEN", &[], vec![]);
        if let Some(content) = item.content.as_mut() {
            content.kind = "PullRequest".to_string();
        }
        assert!(!filter.include(&item));
    }

    #[test]
    fn contentless_items_are_excluded() {
        let filter = default_filter();
        let mut item = board_issue("OPEN", &[], vec![]);
        item.content = None;
        assert!(!filter.include(&item));
    }

    #[test]
    fn stale_view_applies_strict_threshold() {
        let added = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let items = vec![board_issue("OPEN", &[], vec![])];
        let at_threshold = added + Duration::weeks(3);
        assert!(stale_project_issues(&items, None, Duration::weeks(3), at_threshold, false).is_empty());
        let past_threshold = at_threshold + Duration::seconds(1);
        let stale = stale_project_issues(&items, None, Duration::weeks(3), past_threshold, false);
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].added_to_board_at, Some(added));
    }

    #[test]
    fn project_view_keeps_board_order_and_assignee() {
        let items = vec![
            board_issue("OPEN", &["val"], vec![select("Status", "In Progress")]),
            board_issue("OPEN", &["other"], vec![]),
            board_issue("OPEN", &["val"], vec![]),
        ];
        let mine = project_issues_for_user(&items, "val", None, false);
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].board_status.as_deref(), Some("In Progress"));
    }
}
