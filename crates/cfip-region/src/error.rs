use thiserror::Error;

/// Result type alias for registry lookups
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Errors from registry lookups
#[derive(Error, Debug)]
pub enum LookupError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Registry has no record for the address
    #[error("no registry record for {0}")]
    NotFound(String),

    /// Registry throttled the request
    #[error("rate limited by registry")]
    RateLimited,

    /// Registry returned an unexpected status
    #[error("registry returned status {0}")]
    Status(u16),

    /// Response was not a valid registry document
    #[error("malformed registry response: {0}")]
    Json(#[from] serde_json::Error),

    /// Address could not be parsed
    #[error("invalid IP address: {0}")]
    InvalidIp(String),

    /// Timeout
    #[error("registry lookup timed out")]
    Timeout,
}

impl From<LookupError> for cfip_core::CfipError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Http(msg) => Self::Http(msg),
            LookupError::Timeout => Self::Timeout("registry lookup".to_string()),
            LookupError::InvalidIp(ip) => Self::InvalidIp(ip),
            LookupError::Json(e) => Self::Json(e),
            other @ (LookupError::NotFound(_)
            | LookupError::RateLimited
            | LookupError::Status(_)) => Self::Lookup(other.to_string()),
        }
    }
}
