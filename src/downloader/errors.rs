// Error types for platform backends

use thiserror::Error;

/// Message used when a failure carries no text of its own
pub const GENERIC_FAILURE: &str = "Download failed";

/// Message used for 429 responses without a backend message
pub const RATE_LIMITED_FALLBACK: &str = "Too many requests, please wait before trying again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// Nothing to download, rejected before any request is made
    #[error("Please enter a video URL")]
    EmptyUrl,

    /// Backend answered 429
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after: Option<String>,
    },

    /// Upstream service is down (503 on Facebook)
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Any other non-2xx status
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx envelope that declares failure or carries no payload
    #[error("{0}")]
    Rejected(String),

    /// Connection, TLS or timeout failure
    #[error("{0}")]
    Transport(String),

    /// Body could not be decoded
    #[error("{0}")]
    Parse(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DownloadError {
    /// Build a transport error, substituting the generic text for empty messages.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(non_empty_or(message.into(), GENERIC_FAILURE))
    }

    /// Build a parse error, substituting the generic text for empty messages.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(non_empty_or(message.into(), GENERIC_FAILURE))
    }

    /// Cool-down hint, only present for rate limiting
    pub fn retry_after(&self) -> Option<&str> {
        match self {
            Self::RateLimited { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::parse(e.to_string())
        } else {
            Self::transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DownloadError {
    fn from(e: serde_json::Error) -> Self {
        Self::parse(e.to_string())
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transport_message_falls_back() {
        assert_eq!(
            DownloadError::transport("").to_string(),
            GENERIC_FAILURE
        );
        assert_eq!(
            DownloadError::transport("connection refused").to_string(),
            "connection refused"
        );
    }

    #[test]
    fn test_retry_after_only_for_rate_limit() {
        let limited = DownloadError::RateLimited {
            message: "slow down".to_string(),
            retry_after: Some("30s".to_string()),
        };
        assert_eq!(limited.retry_after(), Some("30s"));
        assert!(limited.is_rate_limited());

        let http = DownloadError::Http {
            status: 500,
            message: "HTTP error! status: 500".to_string(),
        };
        assert_eq!(http.retry_after(), None);
        assert_eq!(http.to_string(), "HTTP error! status: 500");
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: DownloadError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, DownloadError::Parse(_)));
    }
}
