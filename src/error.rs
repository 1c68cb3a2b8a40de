use thiserror::Error;

impl From<sqlx::Error> for StandupError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(format!("Database error: {}", err))
    }
}

impl From<std::io::Error> for StandupError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(format!("I/O error: {}", err))
    }
}

impl From<FetchError> for StandupError {
    fn from(err: FetchError) -> Self {
        Self::GitHubError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum StandupError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("GitHub error: {0}")]
    GitHubError(String),

    #[error("Notification error: {0}")]
    NotifyError(String),

    #[error("Web server error: {0}")]
    WebError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

/// Outcome of a single upstream fetch. Org- and repo-level failures are
/// downgraded to warnings by the aggregator; board-level failures abort
/// the board views only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("credential not configured for org {0}")]
    CredentialMissing(String),

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("board pagination exceeded {0} pages")]
    TooManyPages(u32),

    #[error("aggregation deadline exceeded")]
    DeadlineExceeded,
}
