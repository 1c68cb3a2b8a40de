use chrono::{DateTime, Utc};

use crate::github::staleness::days_on_board;
use crate::github::types::{Issue, PullRequest};

/// Renders issues as an indented text block, one stanza per issue.
/// `now` anchors the days-on-board figure so output is reproducible.
pub fn format_issues(issues: &[Issue], now: DateTime<Utc>) -> String {
    if issues.is_empty() {
        return "No issues found.".to_string();
    }
    let mut out = String::new();
    for issue in issues {
        out.push_str(&format!("\n#{} - {}\n", issue.number, issue.title));
        out.push_str(&format!("  Repository: {}\n", issue.repository));
        out.push_str(&format!("  URL: {}\n", issue.url));
        out.push_str(&format!("  State: {}\n", issue.state));
        if let Some(status) = &issue.board_status {
            out.push_str(&format!("  Project Status: {}\n", status));
        }
        out.push_str(&format!(
            "  Updated: {}\n",
            issue.updated_at.format("%Y-%m-%d %H:%M")
        ));
        if let Some(days) = days_on_board(issue.added_to_board_at, now) {
            out.push_str(&format!("  Time on board: {} days\n", days));
        }
    }
    out
}

/// Renders pull requests as an indented text block, one stanza per PR.
pub fn format_prs(prs: &[PullRequest]) -> String {
    if prs.is_empty() {
        return "No pull requests found.".to_string();
    }
    let mut out = String::new();
    for pr in prs {
        out.push_str(&format!("\n#{} - {}\n", pr.number, pr.title));
        out.push_str(&format!("  Repository: {}\n", pr.repository));
        out.push_str(&format!("  URL: {}\n", pr.url));
        out.push_str(&format!("  State: {}\n", pr.state));
        if let Some(merged_at) = pr.merged_at {
            out.push_str(&format!(
                "  Merged: {}\n",
                merged_at.format("%Y-%m-%d %H:%M")
            ));
        } else {
            out.push_str(&format!(
                "  Updated: {}\n",
                pr.updated_at.format("%Y-%m-%d %H:%M")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample_issue() -> Issue {
        Issue {
            number: 42,
            title: "Fix the widget".to_string(),
            url: "https://github.com/acme/widgets/issues/42".to_string(),
            state: "open".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 2, 20, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 2, 28, 12, 30, 0).unwrap(),
            repository: "acme/widgets".to_string(),
            added_to_board_at: None,
            board_status: None,
        }
    }

    #[test]
    fn empty_lists_have_placeholders() {
        assert_eq!(format_issues(&[], Utc::now()), "No issues found.");
        assert_eq!(format_prs(&[]), "No pull requests found.");
    }

    #[test]
    fn issue_stanza_contains_all_lines() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let text = format_issues(&[sample_issue()], now);
        assert!(text.contains("#42 - Fix the widget"));
        assert!(text.contains("  Repository: acme/widgets\n"));
        assert!(text.contains("  URL: https://github.com/acme/widgets/issues/42\n"));
        assert!(text.contains("  State: open\n"));
        assert!(text.contains("  Updated: 2024-02-28 12:30\n"));
        assert!(!text.contains("Time on board"));
        assert!(!text.contains("Project Status"));
    }

    #[test]
    fn board_issues_show_status_and_days() {
        let mut issue = sample_issue();
        let added = Utc.with_ymd_and_hms(2024, 2, 20, 0, 0, 0).unwrap();
        issue.added_to_board_at = Some(added);
        issue.board_status = Some("In Progress".to_string());
        let now = added + Duration::days(2) + Duration::hours(3);
        let text = format_issues(&[issue], now);
        assert!(text.contains("  Project Status: In Progress\n"));
        assert!(text.contains("  Time on board: 2 days\n"));
    }

    fn sample_pr(merged_at: Option<DateTime<Utc>>) -> PullRequest {
        let updated = Utc.with_ymd_and_hms(2024, 3, 2, 8, 15, 0).unwrap();
        PullRequest {
            number: 7,
            title: "Speed up parser".to_string(),
            url: "https://github.com/acme/widgets/pull/7".to_string(),
            state: "merged".to_string(),
            created_at: updated - Duration::days(1),
            updated_at: updated,
            merged_at,
            repository: "acme/widgets".to_string(),
        }
    }

    #[test]
    fn merged_prs_show_the_merge_time() {
        let merged = Utc.with_ymd_and_hms(2024, 3, 2, 8, 15, 0).unwrap();
        let text = format_prs(&[sample_pr(Some(merged))]);
        assert!(text.contains("#7 - Speed up parser"));
        assert!(text.contains("  Merged: 2024-03-02 08:15\n"));
        assert!(!text.contains("Updated:"));
    }

    #[test]
    fn unmerged_prs_show_the_update_time_instead() {
        let mut pr = sample_pr(None);
        pr.state = "open".to_string();
        let text = format_prs(&[pr]);
        assert!(text.contains("  Updated: 2024-03-02 08:15\n"));
        assert!(!text.contains("Merged:"));
    }
}
