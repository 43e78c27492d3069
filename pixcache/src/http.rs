//! HTTP client abstraction for testability.
//!
//! The cache only ever talks to the network through [`AsyncHttpClient`].
//! This abstraction allows for dependency injection and easier testing by
//! enabling mock HTTP clients in tests.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::FetchError;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for HTTP client operations.
///
/// Implementations must be `Send + Sync` so a single client can serve
/// fetches spawned across async tasks.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes, or [`FetchError::Transport`] if the
    /// request fails or returns a non-success status.
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(30)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default HTTP client")
    }
}

impl AsyncHttpClient for ReqwestClient {
    fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Transport(format!("Request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(FetchError::Transport(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }

            response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock HTTP client for testing.
    ///
    /// Serves canned responses per URL (falling back to a default), counts
    /// calls, and can hold individual URLs until released so tests can
    /// control delivery ordering.
    pub struct MockHttpClient {
        responses: Mutex<HashMap<String, Result<Vec<u8>, FetchError>>>,
        default_response: Result<Vec<u8>, FetchError>,
        calls: AtomicUsize,
        gates: Mutex<HashMap<String, tokio::sync::watch::Receiver<bool>>>,
    }

    impl MockHttpClient {
        pub fn new(default_response: Result<Vec<u8>, FetchError>) -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                default_response,
                calls: AtomicUsize::new(0),
                gates: Mutex::new(HashMap::new()),
            }
        }

        /// Serve `response` for requests to `url`.
        pub fn respond_with(&self, url: &str, response: Result<Vec<u8>, FetchError>) {
            self.responses.lock().insert(url.to_string(), response);
        }

        /// Hold responses for `url` until `true` is sent on the returned
        /// channel (or the sender is dropped).
        pub fn hold(&self, url: &str) -> tokio::sync::watch::Sender<bool> {
            let (tx, rx) = tokio::sync::watch::channel(false);
            self.gates.lock().insert(url.to_string(), rx);
            tx
        }

        /// Number of GET calls performed so far.
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockHttpClient {
        fn get(&self, url: &str) -> BoxFuture<'_, Result<Vec<u8>, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().get(url).cloned();
            let response = self
                .responses
                .lock()
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.default_response.clone());
            Box::pin(async move {
                if let Some(mut gate) = gate {
                    while !*gate.borrow_and_update() {
                        if gate.changed().await.is_err() {
                            break;
                        }
                    }
                }
                response
            })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockHttpClient::new(Ok(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com").await;
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_error() {
        let mock = MockHttpClient::new(Err(FetchError::Transport("Test error".to_string())));

        let result = mock.get("http://example.com").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_client_per_url_response() {
        let mock = MockHttpClient::new(Ok(vec![0]));
        mock.respond_with("http://example.com/a", Ok(vec![1]));
        mock.respond_with("http://example.com/b", Ok(vec![2]));

        assert_eq!(mock.get("http://example.com/a").await.unwrap(), vec![1]);
        assert_eq!(mock.get("http://example.com/b").await.unwrap(), vec![2]);
        assert_eq!(mock.get("http://example.com/c").await.unwrap(), vec![0]);
    }
}
