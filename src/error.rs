//! Error types for the comparison service and batch runner.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, BgCompareError>;

/// Error taxonomy for the orchestration layer
///
/// Inference and session failures carry the underlying library's message as
/// a string; the caller decides whether they are fatal (startup) or become a
/// per-model null entry (request handling) or a skipped step (batch).
#[derive(Error, Debug)]
pub enum BgCompareError {
    /// Input/output errors (unreadable source file, failed write, bind failure)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model session construction failures, including unknown model names
    #[error("Session error: {0}")]
    Session(String),

    /// Failures from an inference call on an existing session
    #[error("Inference error: {0}")]
    Inference(String),
}

impl BgCompareError {
    /// Create a new session error
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Self::Session(msg.into())
    }

    /// Create a new inference error
    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference(msg.into())
    }
}
