use thiserror::Error;

/// subtrack error types
#[derive(Error, Debug)]
pub enum SubtrackError {
    /// Failed to parse user input or stored data
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Store operation failed
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for subtrack
pub type Result<T> = std::result::Result<T, SubtrackError>;
