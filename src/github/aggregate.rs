//! Cross-source aggregation: fans out to every configured org, repo, and
//! board, joins all fetches, and merges partial results with warnings.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::FetchError;
use crate::github::board::{fetch_board_items, project_issues_for_user, stale_project_issues};
use crate::github::client::{GitHubApi, SearchSpec};
use crate::github::normalize::{issue_from_search, pr_from_repo_listing, pr_from_search};
use crate::github::types::{Issue, ItemKind, OrgCredential, PullRequest, SearchItem};

/// Inputs for one aggregation call, immutable while the call runs.
/// Credentials arrive resolved; nothing below this layer reads the
/// process environment.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub username: String,
    pub orgs: Vec<OrgCredential>,
    pub board: Option<String>,
    pub status_filter: Option<String>,
    pub stale_threshold: Duration,
    pub merge_repos: Vec<String>,
    pub merge_window_hours: i64,
    pub scan_all_status_fields: bool,
    pub deadline: Option<std::time::Duration>,
}

impl AggregationRequest {
    /// Request mirroring the static configuration. Callers override
    /// individual fields (status filter, staleness) from CLI flags.
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        AggregationRequest {
            username: config.username.clone(),
            orgs: config.orgs.clone(),
            board: config.project_board.clone(),
            status_filter: None,
            stale_threshold: Duration::weeks(config.stale_weeks),
            merge_repos: config.merge_repos.clone(),
            merge_window_hours: config.merge_window_hours,
            scan_all_status_fields: config.scan_all_status_fields,
            deadline: None,
        }
    }
}

/// Everything one aggregation produced. Lists keep source-iteration
/// order: orgs in request order, then board order, then repo order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkSummary {
    pub assigned_issues: Vec<Issue>,
    pub mentioned_issues: Vec<Issue>,
    pub mentioned_prs: Vec<PullRequest>,
    pub project_issues: Vec<Issue>,
    pub stale_issues: Vec<Issue>,
    pub recent_merged_prs: Vec<PullRequest>,
    pub warnings: Vec<SourceWarning>,
}

/// A source that was skipped and why. The call keeps going; these are
/// annotations, not failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWarning {
    pub source: String,
    pub detail: String,
}

impl SourceWarning {
    fn new(source: impl Into<String>, err: &FetchError) -> Self {
        SourceWarning {
            source: source.into(),
            detail: err.to_string(),
        }
    }
}

impl fmt::Display for SourceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.detail)
    }
}

struct OrgFetch {
    org: String,
    assigned: Result<Vec<SearchItem>, FetchError>,
    mention_issues: Result<Vec<SearchItem>, FetchError>,
    mention_prs: Result<Vec<SearchItem>, FetchError>,
}

pub struct Aggregator {
    api: Arc<dyn GitHubApi>,
}

impl Aggregator {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self { api }
    }

    /// Runs every configured fetch, joins them all, and merges what
    /// succeeded. Per-source failures become warnings; the only way the
    /// call itself fails is the deadline expiring, in which case partial
    /// results are discarded.
    pub async fn aggregate(&self, request: &AggregationRequest) -> Result<WorkSummary, FetchError> {
        match request.deadline {
            Some(limit) => tokio::time::timeout(limit, self.collect(request))
                .await
                .map_err(|_| FetchError::DeadlineExceeded),
            None => Ok(self.collect(request).await),
        }
    }

    async fn collect(&self, request: &AggregationRequest) -> WorkSummary {
        let mut summary = WorkSummary::default();

        // Partition orgs up front so skipped ones warn exactly once and
        // active ones keep their request order.
        let mut active_orgs: Vec<(&str, &str)> = Vec::new();
        for org in &request.orgs {
            match org.token.as_deref().filter(|t| !t.is_empty()) {
                Some(token) => active_orgs.push((org.org.as_str(), token)),
                None => {
                    let err = FetchError::CredentialMissing(org.org.clone());
                    warn!(org = %org.org, "skipping org: credential not configured");
                    summary.warnings.push(SourceWarning::new(&org.org, &err));
                }
            }
        }

        info!(
            orgs = active_orgs.len(),
            repos = request.merge_repos.len(),
            board = request.board.is_some(),
            "aggregating work items"
        );

        let org_futs = active_orgs
            .iter()
            .map(|(org, token)| self.fetch_org(token, org, &request.username));

        let board_token = active_orgs.first().map(|(_, token)| *token);
        let board_fut = async {
            match (&request.board, board_token) {
                (Some(board_id), Some(token)) => {
                    Some(fetch_board_items(self.api.as_ref(), token, board_id).await)
                }
                _ => None,
            }
        };

        let repo_futs = request.merge_repos.iter().map(|repo| {
            let token = repo_token(&active_orgs, repo);
            async move {
                match token {
                    Some(token) => self.api.merged_prs(token, repo).await,
                    None => Err(FetchError::CredentialMissing(repo.clone())),
                }
            }
        });

        let (org_results, board_result, repo_results) =
            tokio::join!(join_all(org_futs), board_fut, join_all(repo_futs));

        let now = Utc::now();

        for fetch in org_results {
            match fetch.assigned {
                Ok(items) => summary
                    .assigned_issues
                    .extend(items.iter().map(issue_from_search)),
                Err(err) => {
                    warn!(org = %fetch.org, error = %err, "assigned-issue search failed");
                    summary.warnings.push(SourceWarning::new(&fetch.org, &err));
                }
            }
            match fetch.mention_issues {
                Ok(items) => summary
                    .mentioned_issues
                    .extend(items.iter().map(issue_from_search)),
                Err(err) => {
                    warn!(org = %fetch.org, error = %err, "mention search (issues) failed");
                    summary.warnings.push(SourceWarning::new(&fetch.org, &err));
                }
            }
            match fetch.mention_prs {
                Ok(items) => summary
                    .mentioned_prs
                    .extend(items.iter().map(pr_from_search)),
                Err(err) => {
                    warn!(org = %fetch.org, error = %err, "mention search (PRs) failed");
                    summary.warnings.push(SourceWarning::new(&fetch.org, &err));
                }
            }
        }

        match (&request.board, board_result) {
            (Some(_), Some(Ok(items))) => {
                let status_filter = request.status_filter.as_deref();
                summary.project_issues = project_issues_for_user(
                    &items,
                    &request.username,
                    status_filter,
                    request.scan_all_status_fields,
                );
                summary.stale_issues = stale_project_issues(
                    &items,
                    status_filter,
                    request.stale_threshold,
                    now,
                    request.scan_all_status_fields,
                );
            }
            (Some(board_id), Some(Err(err))) => {
                warn!(board = %board_id, error = %err, "board fetch failed; dropping board views");
                summary
                    .warnings
                    .push(SourceWarning::new(format!("board {}", board_id), &err));
            }
            (Some(board_id), None) => {
                let err = FetchError::CredentialMissing(format!("board {}", board_id));
                warn!(board = %board_id, "skipping board: no credential available");
                summary
                    .warnings
                    .push(SourceWarning::new(format!("board {}", board_id), &err));
            }
            (None, _) => {}
        }

        let window = Duration::hours(request.merge_window_hours);
        for (repo, result) in request.merge_repos.iter().zip(repo_results) {
            match result {
                Ok(items) => summary.recent_merged_prs.extend(
                    items
                        .iter()
                        .filter(|item| recently_merged(item, window, now))
                        .map(|item| pr_from_repo_listing(item, repo)),
                ),
                Err(err) => {
                    warn!(repo = %repo, error = %err, "merged-PR fetch failed; skipping repo");
                    summary.warnings.push(SourceWarning::new(repo, &err));
                }
            }
        }

        info!(
            assigned = summary.assigned_issues.len(),
            mentioned = summary.mentioned_issues.len() + summary.mentioned_prs.len(),
            project = summary.project_issues.len(),
            stale = summary.stale_issues.len(),
            merged = summary.recent_merged_prs.len(),
            warnings = summary.warnings.len(),
            "aggregation complete"
        );

        summary
    }

    async fn fetch_org(&self, token: &str, org: &str, username: &str) -> OrgFetch {
        // The specs must outlive the futures that borrow them.
        let assigned_spec = SearchSpec::assigned_issues(org, username);
        let mention_issue_spec = SearchSpec::mentions(org, username, ItemKind::Issue);
        let mention_pr_spec = SearchSpec::mentions(org, username, ItemKind::PullRequest);
        let (assigned, mention_issues, mention_prs) = tokio::join!(
            self.api.search_items(token, &assigned_spec),
            self.api.search_items(token, &mention_issue_spec),
            self.api.search_items(token, &mention_pr_spec)
        );
        OrgFetch {
            org: org.to_string(),
            assigned,
            mention_issues,
            mention_prs,
        }
    }
}

/// Token for a per-repo scan: the owning org's credential when the repo
/// belongs to a configured org, otherwise the first credential we have.
fn repo_token<'a>(active_orgs: &[(&'a str, &'a str)], repo: &str) -> Option<&'a str> {
    let owner = repo.split('/').next().unwrap_or(repo);
    active_orgs
        .iter()
        .find(|(org, _)| *org == owner)
        .or_else(|| active_orgs.first())
        .map(|(_, token)| *token)
}

/// A PR counts as recently merged only if it was merged at all and the
/// merge is no older than the window (inclusive).
fn recently_merged(item: &SearchItem, window: Duration, now: DateTime<Utc>) -> bool {
    match item.merged_at {
        Some(merged_at) => now - merged_at <= window,
        None => false,
    }
}
