use crate::github::types::{BoardFieldValue, BoardItem, Issue, PullRequest, SearchItem};

/// Derives `owner/repo` from a canonical item URL by position: segments 3
/// and 4 of the `/`-split (scheme, empty, host, owner, repo, ...). URLs
/// with fewer than five segments yield an empty name instead of an error.
pub fn repo_from_url(url: &str) -> String {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() >= 5 {
        format!("{}/{}", parts[3], parts[4])
    } else {
        String::new()
    }
}

pub fn issue_from_search(item: &SearchItem) -> Issue {
    Issue {
        number: item.number,
        title: item.title.clone(),
        url: item.url.clone(),
        state: item.state.clone(),
        created_at: item.created_at,
        updated_at: item.updated_at,
        repository: repo_from_url(&item.url),
        added_to_board_at: None,
        board_status: None,
    }
}

pub fn pr_from_search(item: &SearchItem) -> PullRequest {
    PullRequest {
        number: item.number,
        title: item.title.clone(),
        url: item.url.clone(),
        state: item.state.clone(),
        created_at: item.created_at,
        updated_at: item.updated_at,
        merged_at: item.merged_at,
        repository: repo_from_url(&item.url),
    }
}

/// Per-repository listings already know which repository they came from,
/// so the name is taken from the request rather than re-derived.
pub fn pr_from_repo_listing(item: &SearchItem, repository: &str) -> PullRequest {
    PullRequest {
        repository: repository.to_string(),
        ..pr_from_search(item)
    }
}

/// Folds a board entry into an issue record, carrying the board-added
/// timestamp and the "Status" single-select value. Entries without
/// content (archived or inaccessible) have no record.
pub fn issue_from_board_item(item: &BoardItem) -> Option<Issue> {
    let content = item.content.as_ref()?;
    Some(Issue {
        number: content.number,
        title: content.title.clone(),
        url: content.url.clone(),
        state: content.state.clone(),
        created_at: content.created_at.unwrap_or(item.created_at),
        updated_at: content.updated_at.unwrap_or(item.created_at),
        repository: repo_from_url(&content.url),
        added_to_board_at: Some(item.created_at),
        board_status: board_status(item),
    })
}

/// Value of the single-select field named "Status", if the item has one.
pub fn board_status(item: &BoardItem) -> Option<String> {
    item.field_values.nodes.iter().find_map(|fv| match fv {
        BoardFieldValue::SingleSelect { field, name } if field.name == "Status" => name.clone(),
        _ => None,
    })
}
