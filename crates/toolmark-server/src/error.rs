// crates/toolmark-server/src/error.rs
// Standardized error types for toolmark

use thiserror::Error;

/// Main error type for the toolmark library
#[derive(Error, Debug)]
pub enum ToolmarkError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} ledger not initialized")]
    NotInitialized(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using ToolmarkError
pub type Result<T> = std::result::Result<T, ToolmarkError>;

impl ToolmarkError {
    /// Convert to user-facing string for tool boundaries
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }
}

impl From<ToolmarkError> for String {
    fn from(err: ToolmarkError) -> Self {
        err.to_string()
    }
}
