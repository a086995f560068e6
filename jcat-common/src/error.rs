//! Common error types for JCAT

use thiserror::Error;

/// Common result type for JCAT operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across JCAT crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote catalog could not be fetched or decoded
    #[error("Network error: {0}")]
    Network(String),

    /// Operation exceeded its deadline
    #[error("Timed out after {0} ms")]
    Timeout(u64),

    /// Operation was cancelled before it committed
    #[error("Cancelled")]
    Cancelled,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
