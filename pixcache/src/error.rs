//! Error types for image retrieval.

use thiserror::Error;

/// Errors that can occur while fetching a remote image.
///
/// Exactly one variant is produced per failed fetch. These errors never
/// reach a `get` caller directly; they are routed to the diagnostic sink
/// and the failure-report channel while the caller receives the fallback
/// image instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The key did not parse as a valid URL. No network call was made.
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// The HTTP request failed or returned a non-success status.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response body was empty or did not decode as an image.
    #[error("Decode failure: {0}")]
    Decode(String),
}

/// A classified fetch failure, as published on the failure-report channel.
///
/// Carries the key that failed alongside the classified error so observers
/// can correlate failures with the requests that caused them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    /// The key (URL) whose fetch failed.
    pub key: String,
    /// The classified error.
    pub error: FetchError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_invalid_url() {
        let err = FetchError::InvalidUrl("not a url".to_string());
        assert_eq!(err.to_string(), "Invalid image URL: not a url");
    }

    #[test]
    fn test_fetch_error_display_transport() {
        let err = FetchError::Transport("HTTP 500 from https://x/a.png".to_string());
        assert!(err.to_string().contains("Transport failure"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_fetch_error_display_decode() {
        let err = FetchError::Decode("empty response body".to_string());
        assert_eq!(err.to_string(), "Decode failure: empty response body");
    }

    #[test]
    fn test_fetch_failure_carries_key_and_error() {
        let failure = FetchFailure {
            key: "https://example.com/a.png".to_string(),
            error: FetchError::Transport("timed out".to_string()),
        };
        assert_eq!(failure.key, "https://example.com/a.png");
        assert!(matches!(failure.error, FetchError::Transport(_)));
    }
}
