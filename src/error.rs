use thiserror::Error;

/// Main error type for notifygen host operations.
///
/// Problems in the analysed declarations are never errors; they are
/// reported as diagnostics. These variants cover the tool itself.
#[derive(Error, Debug)]
pub enum NotifyGenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported output format: {0}")]
    OutputFormat(String),

    #[error("Analysis reported {count} diagnostic(s) in strict mode")]
    Strict { count: usize },
}

pub type Result<T> = std::result::Result<T, NotifyGenError>;
