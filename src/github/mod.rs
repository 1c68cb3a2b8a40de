//! GitHub work-item aggregation: typed client, board pagination and
//! filtering, temporal annotation, and the cross-source aggregator.

pub mod aggregate;
pub mod board;
pub mod client;
pub mod format;
pub mod normalize;
pub mod staleness;
pub mod types;

pub use aggregate::{AggregationRequest, Aggregator, SourceWarning, WorkSummary};
pub use client::{GitHubApi, GitHubClient};
