//! One-shot retrieval and decoding of remote images.

use std::sync::Arc;

use reqwest::Url;

use crate::error::FetchError;
use crate::http::AsyncHttpClient;
use crate::resource::CachedImage;

/// Stateless fetcher: validates the key, downloads the bytes, decodes them.
///
/// A fetch is one-shot; retry policy, if any, belongs to the caller.
/// Timeouts are whatever the injected transport client enforces.
pub struct Fetcher {
    client: Arc<dyn AsyncHttpClient>,
}

impl Fetcher {
    /// Create a new fetcher over the given transport client.
    pub fn new(client: Arc<dyn AsyncHttpClient>) -> Self {
        Self { client }
    }

    /// Fetch and decode the image at `key`.
    ///
    /// # Errors
    ///
    /// Exactly one classified error per failure:
    /// - [`FetchError::InvalidUrl`] if `key` does not parse as a URL; no
    ///   network call is made in that case.
    /// - [`FetchError::Transport`] if the HTTP request fails or returns a
    ///   non-success status.
    /// - [`FetchError::Decode`] if the body is empty or is not an image.
    pub async fn fetch(&self, key: &str) -> Result<CachedImage, FetchError> {
        let url = Url::parse(key).map_err(|_| FetchError::InvalidUrl(key.to_string()))?;
        let body = self.client.get(url.as_str()).await?;
        CachedImage::decode(&body)
    }
}
