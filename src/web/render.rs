//! Pure HTML rendering for the dashboard; no I/O in this module.

use chrono::{DateTime, Duration, Utc};

use crate::github::aggregate::{SourceWarning, WorkSummary};
use crate::github::staleness::days_on_board;
use crate::github::types::{Issue, PullRequest};

use super::DashboardData;

pub fn render_dashboard(data: &DashboardData) -> String {
    let now = data.last_updated;
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, 'Segoe UI', sans-serif; margin: 0; background: #1a1a2e; color: #e0e0e0; }}
        .header {{ background: #16213e; padding: 20px 40px; }}
        .header h1 {{ margin: 0; font-size: 22px; }}
        .header .updated {{ color: #8888aa; font-size: 13px; }}
        .warnings {{ background: #5c2a2a; color: #ffd7d7; padding: 12px 40px; }}
        .content {{ padding: 20px 40px; }}
        .section {{ margin-bottom: 32px; }}
        .section h2 {{ font-size: 16px; border-bottom: 1px solid #33335c; padding-bottom: 6px; }}
        .count {{ color: #8888aa; font-weight: normal; }}
        .card {{ background: #16213e; border: 1px solid #33335c; border-radius: 6px; padding: 12px 16px; margin: 10px 0; }}
        .card a {{ color: #7eb6ff; text-decoration: none; font-weight: 600; }}
        .meta {{ color: #9999bb; font-size: 13px; margin-top: 6px; }}
        .badge {{ display: inline-block; background: #0f3460; border-radius: 10px; padding: 1px 10px; font-size: 12px; margin-right: 8px; }}
        .empty {{ color: #666688; font-style: italic; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>{title}</h1>
        <div class="updated">Last updated: {updated}</div>
    </div>
    {warnings}
    <div class="content">
        <div class="section">
            <h2>Project Board Issues <span class="count">({project_count})</span></h2>
            {project}
        </div>
        <div class="section">
            <h2>Stale Issues (&gt;{stale_weeks} weeks) <span class="count">({stale_count})</span></h2>
            {stale}
        </div>
        <div class="section">
            <h2>All Assigned Issues <span class="count">({assigned_count})</span></h2>
            {assigned}
        </div>
        <div class="section">
            <h2>Mentions <span class="count">({mention_count})</span></h2>
            {mentions}
        </div>
        <div class="section">
            <h2>Recently Merged PRs ({merge_window}h) <span class="count">({merged_count})</span></h2>
            {merged}
        </div>
    </div>
    <script>
        setTimeout(() => location.reload(), 300000);
    </script>
</body>
</html>
"#,
        title = escape(&data.title),
        updated = now.format("%Y-%m-%d %H:%M UTC"),
        warnings = warning_banner(&data.summary.warnings),
        project_count = data.summary.project_issues.len(),
        project = issue_cards(&data.summary.project_issues, now),
        stale_weeks = data.stale_weeks,
        stale_count = data.summary.stale_issues.len(),
        stale = issue_cards(&data.summary.stale_issues, now),
        assigned_count = data.summary.assigned_issues.len(),
        assigned = issue_cards(&data.summary.assigned_issues, now),
        mention_count = data.summary.mentioned_issues.len() + data.summary.mentioned_prs.len(),
        mentions = format!(
            "{}{}",
            issue_cards(&data.summary.mentioned_issues, now),
            pr_cards(&data.summary.mentioned_prs)
        ),
        merge_window = data.merge_window_hours,
        merged_count = data.summary.recent_merged_prs.len(),
        merged = pr_cards(&data.summary.recent_merged_prs),
    )
}

fn warning_banner(warnings: &[SourceWarning]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let text = warnings
        .iter()
        .map(|w| escape(&w.to_string()))
        .collect::<Vec<_>>()
        .join("; ");
    format!(r#"<div class="warnings">⚠ {}</div>"#, text)
}

fn issue_cards(issues: &[Issue], now: DateTime<Utc>) -> String {
    if issues.is_empty() {
        return r#"<div class="empty">Nothing here.</div>"#.to_string();
    }
    issues
        .iter()
        .map(|issue| {
            let status = issue
                .board_status
                .as_ref()
                .map(|s| format!(r#"<span class="badge">{}</span>"#, escape(s)))
                .unwrap_or_default();
            let days = days_on_board(issue.added_to_board_at, now)
                .map(|d| format!(" · {} days on board", d))
                .unwrap_or_default();
            format!(
                r#"<div class="card">
    <a href="{url}">#{number} {title}</a>
    <div class="meta"><span class="badge">{repo}</span>{status}{state} · updated {updated}{days}</div>
</div>"#,
                url = escape(&issue.url),
                number = issue.number,
                title = escape(&issue.title),
                repo = escape(&issue.repository),
                status = status,
                state = escape(&issue.state),
                updated = issue.updated_at.format("%Y-%m-%d"),
                days = days,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pr_cards(prs: &[PullRequest]) -> String {
    if prs.is_empty() {
        return r#"<div class="empty">Nothing here.</div>"#.to_string();
    }
    prs.iter()
        .map(|pr| {
            let merged = pr
                .merged_at
                .map(|at| format!(" · merged {}", at.format("%Y-%m-%d %H:%M")))
                .unwrap_or_default();
            format!(
                r#"<div class="card">
    <a href="{url}">#{number} {title}</a>
    <div class="meta"><span class="badge">{repo}</span>{state}{merged}</div>
</div>"#,
                url = escape(&pr.url),
                number = pr.number,
                title = escape(&pr.title),
                repo = escape(&pr.repository),
                state = escape(&pr.state),
                merged = merged,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Canned data for `--dev` mode, so the page can be styled without
/// credentials or network access.
pub fn sample_summary() -> WorkSummary {
    let now = Utc::now();
    let issue = |number: u64, title: &str, status: Option<&str>, days: i64| Issue {
        number,
        title: title.to_string(),
        url: format!("https://github.com/acme/widgets/issues/{}", number),
        state: "open".to_string(),
        created_at: now - Duration::days(days + 2),
        updated_at: now - Duration::days(1),
        repository: "acme/widgets".to_string(),
        added_to_board_at: Some(now - Duration::days(days)),
        board_status: status.map(|s| s.to_string()),
    };
    WorkSummary {
        assigned_issues: vec![issue(101, "Update onboarding docs", None, 0)],
        mentioned_issues: vec![issue(117, "Flaky login test", None, 0)],
        mentioned_prs: Vec::new(),
        project_issues: vec![
            issue(42, "Fix the widget pipeline", Some("In Progress"), 4),
            issue(57, "Add retry budget to exporter", Some("Todo"), 1),
        ],
        stale_issues: vec![issue(23, "Polish empty states", Some("Todo"), 30)],
        recent_merged_prs: vec![PullRequest {
            number: 7,
            title: "Speed up parser".to_string(),
            url: "https://github.com/acme/widgets/pull/7".to_string(),
            state: "merged".to_string(),
            created_at: now - Duration::days(2),
            updated_at: now - Duration::hours(3),
            merged_at: Some(now - Duration::hours(3)),
            repository: "acme/widgets".to_string(),
        }],
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(summary: WorkSummary) -> DashboardData {
        DashboardData {
            title: "Daily Standup".to_string(),
            summary,
            stale_weeks: 3,
            merge_window_hours: 12,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn renders_all_sections() {
        let html = render_dashboard(&data(sample_summary()));
        assert!(html.contains("Project Board Issues"));
        assert!(html.contains("Stale Issues (&gt;3 weeks)"));
        assert!(html.contains("All Assigned Issues"));
        assert!(html.contains("Recently Merged PRs (12h)"));
        assert!(html.contains("#42 Fix the widget pipeline"));
        assert!(html.contains("4 days on board"));
    }

    #[test]
    fn escapes_markup_in_titles() {
        let mut summary = sample_summary();
        summary.assigned_issues[0].title = "<script>alert(1)</script>".to_string();
        let html = render_dashboard(&data(summary));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn warning_banner_lists_sources() {
        let mut summary = sample_summary();
        summary.warnings.push(SourceWarning {
            source: "acme".to_string(),
            detail: "credential not configured for org acme".to_string(),
        });
        let html = render_dashboard(&data(summary));
        assert!(html.contains("acme: credential not configured"));
    }

    #[test]
    fn empty_sections_have_placeholders() {
        let html = render_dashboard(&data(WorkSummary::default()));
        assert!(html.contains("Nothing here."));
    }
}
