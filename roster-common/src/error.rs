//! Common error types for the roster services

use thiserror::Error;

/// Common result type for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the roster crates
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

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record is missing a required field (task date, assignee, name)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Person creation collides case-insensitively with an existing name
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// A storage write failed or partially failed after rollback
    #[error("Persistence failure: {0}")]
    Persistence(String),
}
