pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod github;
pub mod scheduler;
pub mod web;

pub use error::{FetchError, StandupError};
