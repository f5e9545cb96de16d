use thiserror::Error;

/// Result type alias for source operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Errors raised while fetching or parsing a source
#[derive(Error, Debug)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request to {0} timed out")]
    Timeout(String),

    /// Non-success status
    #[error("{url} returned status {code}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Requested URL
        url: String,
    },

    /// Body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Body parsed but had an unexpected shape
    #[error("unexpected response format: {0}")]
    Format(String),

    /// Local file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    pub(crate) fn from_reqwest(err: &reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout(url.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<SourceError> for cfip_core::CfipError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Http(msg) => Self::Http(msg),
            SourceError::Timeout(url) => Self::Timeout(url),
            SourceError::Json(e) => Self::Json(e),
            SourceError::Io(e) => Self::Io(e),
            other @ (SourceError::Status { .. } | SourceError::Format(_)) => {
                Self::Source(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfip_core::CfipError;

    #[test]
    fn test_conversion_into_cfip_error() {
        let err: CfipError = SourceError::Status {
            code: 503,
            url: "https://example.com".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "source error: https://example.com returned status 503"
        );

        let err: CfipError = SourceError::Timeout("https://slow".into()).into();
        assert!(matches!(err, CfipError::Timeout(_)));
    }
}
