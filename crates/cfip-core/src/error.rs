use thiserror::Error;

/// Result type alias for cfip operations
pub type Result<T> = std::result::Result<T, CfipError>;

/// Errors that can surface from cfip crates
///
/// Pipeline stages recover from their own failures; these values reach a caller
/// only from explicit fallible calls such as configuration loading or file I/O.
#[derive(Error, Debug)]
pub enum CfipError {
    /// A source could not be fetched or parsed
    #[error("source error: {0}")]
    Source(String),

    /// A registry lookup failed
    #[error("lookup error: {0}")]
    Lookup(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid IP address format
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
