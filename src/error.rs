//! Error types for the vigil daemon.

/// Top-level error type for the reminder system.
#[derive(Debug, thiserror::Error)]
pub enum VigilError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Trigger store or notification ledger error.
    #[error("store error: {0}")]
    Store(String),

    /// Scheduler error (cycle execution, lifecycle).
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, VigilError>;
