//! CLI error types.

use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Tigris(#[from] tigris::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("cache clear failed: {0}")]
    CacheClear(String),

    #[error("cache stats failed: {0}")]
    CacheStats(String),
}
