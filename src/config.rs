use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::StandupError;
use crate::github::types::OrgCredential;

/// Everything the program reads from its environment, resolved once at
/// startup. The engine itself never touches `env::var`; credentials reach
/// it only through the `orgs` list built here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub username: String,
    pub orgs: Vec<OrgCredential>,
    pub project_board: Option<String>,
    pub merge_repos: Vec<String>,
    pub merge_window_hours: i64,
    pub stale_weeks: i64,
    pub scan_all_status_fields: bool,
    pub state_dir: PathBuf,
    pub database_path: String,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn load() -> Result<Self, StandupError> {
        let username = env::var("GITHUB_USERNAME").unwrap_or_default();

        let orgs = split_csv(&env::var("GITHUB_ORGS").unwrap_or_default())
            .into_iter()
            .map(|org| {
                let token = env::var(token_env_var(&org)).ok().filter(|t| !t.is_empty());
                OrgCredential { org, token }
            })
            .collect();

        let project_board = env::var("GITHUB_PROJECT").ok().filter(|p| !p.is_empty());

        let merge_repos = split_csv(&env::var("GITHUB_MERGE_REPOS").unwrap_or_default());

        let merge_window_hours = env::var("GITHUB_MERGE_WINDOW_HOURS")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .map_err(|e| StandupError::ConfigError(format!("GITHUB_MERGE_WINDOW_HOURS: {}", e)))?;

        let stale_weeks = env::var("STALE_WEEKS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|e| StandupError::ConfigError(format!("STALE_WEEKS: {}", e)))?;

        let scan_all_status_fields = env::var("GITHUB_SCAN_ALL_STATUS_FIELDS")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let state_dir = match env::var("STANDUP_STATE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".standup"),
        };

        let database_path = env::var("STANDUP_DB")
            .unwrap_or_else(|_| state_dir.join("standup.db").to_string_lossy().into_owned());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|e| StandupError::ConfigError(format!("SERVER_PORT: {}", e)))?;

        Ok(AppConfig {
            username,
            orgs,
            project_board,
            merge_repos,
            merge_window_hours,
            stale_weeks,
            scan_all_status_fields,
            state_dir,
            database_path,
            server_host,
            server_port,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir.join("standup.log")
    }
}

/// Env var holding the credential for an org, e.g. `acme-labs` reads
/// `GITHUB_TOKEN_ACME_LABS`.
pub fn token_env_var(org: &str) -> String {
    format!("GITHUB_TOKEN_{}", org.to_uppercase().replace('-', "_"))
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
