//! Web dashboard for the aggregated standup view.
//!
//! Serves a self-refreshing HTML page at `/` plus a JSON endpoint at
//! `/api/refresh`. Fetch failures never take the page down; they show up in
//! the warnings banner instead.

pub mod render;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::error::StandupError;
use crate::github::aggregate::{AggregationRequest, Aggregator, SourceWarning, WorkSummary};
use crate::github::client::GitHubApi;

#[derive(Clone)]
pub struct Dashboard {
    config: AppConfig,
    api: Arc<dyn GitHubApi>,
    dev_mode: bool,
}

/// Everything the page needs for one render, also served as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub title: String,
    pub summary: WorkSummary,
    pub stale_weeks: i64,
    pub merge_window_hours: i64,
    pub last_updated: DateTime<Utc>,
}

impl Dashboard {
    pub fn new(config: AppConfig, api: Arc<dyn GitHubApi>) -> Self {
        Dashboard {
            config,
            api,
            dev_mode: false,
        }
    }

    /// Serve canned sample data instead of hitting GitHub.
    pub fn with_dev_mode(mut self) -> Self {
        self.dev_mode = true;
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/", get(dashboard_page))
            .route("/api/refresh", get(refresh_data))
            .route("/health", get(health_check))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .into_inner(),
            )
            .with_state(self)
    }

    pub async fn serve(self, port: u16) -> Result<(), StandupError> {
        let addr: SocketAddr = format!("{}:{}", self.config.server_host, port)
            .parse()
            .map_err(|e| StandupError::WebError(format!("invalid listen address: {}", e)))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| StandupError::WebError(format!("failed to bind {}: {}", addr, e)))?;
        info!("dashboard listening on http://{}", addr);
        axum::serve(listener, self.router())
            .await
            .map_err(|e| StandupError::WebError(e.to_string()))
    }

    async fn fetch(&self) -> DashboardData {
        let summary = if self.dev_mode {
            render::sample_summary()
        } else {
            let aggregator = Aggregator::new(self.api.clone());
            let request = AggregationRequest::from_config(&self.config);
            match aggregator.aggregate(&request).await {
                Ok(summary) => summary,
                Err(err) => {
                    error!(error = %err, "aggregation failed");
                    WorkSummary {
                        warnings: vec![SourceWarning {
                            source: "aggregation".to_string(),
                            detail: err.to_string(),
                        }],
                        ..Default::default()
                    }
                }
            }
        };
        DashboardData {
            title: "Daily Standup".to_string(),
            summary,
            stale_weeks: self.config.stale_weeks,
            merge_window_hours: self.config.merge_window_hours,
            last_updated: Utc::now(),
        }
    }
}

async fn dashboard_page(State(dashboard): State<Dashboard>) -> Html<String> {
    let data = dashboard.fetch().await;
    Html(render::render_dashboard(&data))
}

async fn refresh_data(State(dashboard): State<Dashboard>) -> Json<DashboardData> {
    Json(dashboard.fetch().await)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "standup-dashboard",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::GitHubClient;

    fn test_config() -> AppConfig {
        AppConfig {
            username: "val".to_string(),
            orgs: Vec::new(),
            project_board: None,
            merge_repos: Vec::new(),
            merge_window_hours: 12,
            stale_weeks: 3,
            scan_all_status_fields: false,
            state_dir: std::path::PathBuf::from("/tmp"),
            database_path: ":memory:".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
        }
    }

    #[tokio::test]
    async fn dev_mode_serves_sample_data() {
        let dashboard =
            Dashboard::new(test_config(), Arc::new(GitHubClient::new())).with_dev_mode();
        let data = dashboard.fetch().await;
        assert!(!data.summary.project_issues.is_empty());
        assert_eq!(data.stale_weeks, 3);
    }

    #[tokio::test]
    async fn empty_config_aggregates_to_an_empty_summary() {
        let dashboard = Dashboard::new(test_config(), Arc::new(GitHubClient::new()));
        let data = dashboard.fetch().await;
        assert!(data.summary.assigned_issues.is_empty());
        assert!(data.summary.warnings.is_empty());
    }
}
