//! The key-addressed image cache.
//!
//! `ImageCache` owns the mapping from URL keys to decoded images. A lookup
//! never blocks and never fails from the caller's point of view: a hit is
//! delivered immediately through the asynchronous delivery path, a miss
//! triggers a background fetch, and a failed fetch delivers the cache's
//! fallback image while the classified error goes to diagnostics.
//!
//! # Handles
//!
//! `ImageCache` is a cheap clonable handle over shared state, so one
//! instance can be constructed at process start and passed by value to
//! every consumer. A process-wide default instance is available through
//! [`ImageCache::shared`] for callers that do not want to thread a handle.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::error::{FetchError, FetchFailure};
use crate::fetch::Fetcher;
use crate::http::{AsyncHttpClient, ReqwestClient};
use crate::placeholder;
use crate::resource::CachedImage;

/// Configuration for an [`ImageCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store successfully fetched images back into the entry map.
    ///
    /// Off by default: only an explicit [`ImageCache::store`] fills the
    /// cache, and a re-requested key fetches again.
    pub cache_on_fetch: bool,

    /// Log a diagnostic line for every classified fetch failure.
    pub log_errors: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_on_fetch: false,
            log_errors: false,
        }
    }
}

impl CacheConfig {
    /// Enable or disable storing fetched images.
    pub fn with_cache_on_fetch(mut self, enabled: bool) -> Self {
        self.cache_on_fetch = enabled;
        self
    }

    /// Enable or disable failure logging.
    pub fn with_log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }
}

/// In-memory, key-addressed image cache with asynchronous delivery.
///
/// Entries never expire and are never evicted; the map lives as long as the
/// cache. See the module docs for the delivery contract.
#[derive(Clone)]
pub struct ImageCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: DashMap<String, CachedImage>,
    fetcher: Fetcher,
    fallback: RwLock<Option<CachedImage>>,
    log_errors: AtomicBool,
    cache_on_fetch: bool,
    failure_tx: RwLock<Option<mpsc::UnboundedSender<FetchFailure>>>,
}

impl ImageCache {
    /// Create a cache with the default transport client and configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create a cache with the default transport client.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_client(Arc::new(ReqwestClient::default()), config)
    }

    /// Create a cache over an injected transport client.
    ///
    /// This is the seam tests use to substitute a mock client.
    pub fn with_client(client: Arc<dyn AsyncHttpClient>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                fetcher: Fetcher::new(client),
                fallback: RwLock::new(None),
                log_errors: AtomicBool::new(config.log_errors),
                cache_on_fetch: config.cache_on_fetch,
                failure_tx: RwLock::new(None),
            }),
        }
    }

    /// The process-wide default cache instance.
    ///
    /// Lazily constructed on first access with default configuration. This
    /// is a convenience wrapper over an ordinary instance; constructing and
    /// passing explicit handles remains the primary API.
    pub fn shared() -> &'static ImageCache {
        static SHARED: OnceLock<ImageCache> = OnceLock::new();
        SHARED.get_or_init(ImageCache::new)
    }

    /// Look up `key`, fetching it over the network on a miss.
    ///
    /// Never blocks. A hit is sent into the returned [`Delivery`] with no
    /// network activity; a miss spawns the fetch on a background task. On
    /// fetch failure the delivery resolves to the fallback image; the
    /// caller never sees an error.
    ///
    /// `key` must be a non-empty string; it is not otherwise validated here
    /// (an unparsable key is classified by the fetch path, with no network
    /// call made).
    ///
    /// Concurrent misses on the same key each run their own fetch; there is
    /// no in-flight deduplication.
    ///
    /// Miss handling runs on the Tokio runtime, so `get` must be called
    /// from within one.
    pub fn get(&self, key: &str) -> Delivery {
        let (tx, rx) = oneshot::channel();

        if let Some(entry) = self.inner.entries.get(key) {
            let image = entry.value().clone();
            drop(entry);
            let _ = tx.send(image);
        } else {
            let inner = Arc::clone(&self.inner);
            let key = key.to_string();
            tokio::spawn(async move {
                let image = match inner.fetcher.fetch(&key).await {
                    Ok(image) => {
                        if inner.cache_on_fetch {
                            inner.entries.insert(key, image.clone());
                        }
                        image
                    }
                    Err(error) => {
                        inner.report_failure(&key, &error);
                        inner.fallback_image()
                    }
                };
                let _ = tx.send(image);
            });
        }

        Delivery {
            rx,
            cache: self.clone(),
        }
    }

    /// Insert or overwrite the entry for `key`. Last store wins.
    ///
    /// Synchronous and cheap; callable from any thread or task.
    pub fn store(&self, key: &str, image: CachedImage) {
        self.inner.entries.insert(key.to_string(), image);
    }

    /// The current fallback image.
    ///
    /// If no fallback was ever set, the blank placeholder is materialized on
    /// first read and returned on every subsequent unset read.
    pub fn fallback(&self) -> CachedImage {
        self.inner.fallback_image()
    }

    /// Replace the fallback image delivered when a fetch fails.
    pub fn set_fallback(&self, image: CachedImage) {
        *self.inner.fallback.write() = Some(image);
    }

    /// Whether classified fetch failures are logged.
    pub fn error_logging(&self) -> bool {
        self.inner.log_errors.load(Ordering::Relaxed)
    }

    /// Enable or disable logging of classified fetch failures.
    pub fn set_error_logging(&self, enabled: bool) {
        self.inner.log_errors.store(enabled, Ordering::Relaxed);
    }

    /// Subscribe to classified fetch failures.
    ///
    /// The delivery path never carries an error; this channel is the
    /// structured side channel for observers that want the classification.
    /// Each call replaces the previous subscriber.
    pub fn failure_reports(&self) -> mpsc::UnboundedReceiver<FetchFailure> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.failure_tx.write() = Some(tx);
        rx
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.inner.entries.len()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheInner {
    fn fallback_image(&self) -> CachedImage {
        if let Some(image) = self.fallback.read().as_ref() {
            return image.clone();
        }
        let mut slot = self.fallback.write();
        slot.get_or_insert_with(placeholder::blank_placeholder).clone()
    }

    fn report_failure(&self, key: &str, error: &FetchError) {
        if self.log_errors.load(Ordering::Relaxed) {
            warn!(key = %key, error = %error, "Image fetch failed");
        }
        let mut tx_slot = self.failure_tx.write();
        let delivered = match tx_slot.as_ref() {
            Some(tx) => tx
                .send(FetchFailure {
                    key: key.to_string(),
                    error: error.clone(),
                })
                .is_ok(),
            None => true,
        };
        if !delivered {
            // Subscriber went away; stop holding its sender.
            *tx_slot = None;
        }
    }
}

/// An in-flight image delivery.
///
/// Awaiting it yields the image for the `get` that produced it: the stored
/// entry on a hit, the fetched image on a successful miss, the fallback on
/// a failed one. Results always materialize on the awaiting task.
pub struct Delivery {
    rx: oneshot::Receiver<CachedImage>,
    cache: ImageCache,
}

impl Future for Delivery {
    type Output = CachedImage;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(image)) => Poll::Ready(image),
            // The producing task was torn down before sending (runtime
            // shutdown). A lookup still produces some image.
            Poll::Ready(Err(_)) => Poll::Ready(this.cache.fallback()),
            Poll::Pending => Poll::Pending,
        }
    }
}
