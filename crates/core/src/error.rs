//! Core error types

use thiserror::Error;

/// Core error type for Cardloom
#[derive(Debug, Error)]
pub enum CoreError {
    /// Generic error
    #[error("Core error: {0}")]
    Generic(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias over [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
