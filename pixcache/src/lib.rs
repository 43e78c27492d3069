//! Pixcache - asynchronous in-memory image caching
//!
//! This library provides a key-addressed cache for remote images: a lookup
//! serves the stored image when present and otherwise fetches it over HTTP
//! on a background task, decoding the response into a shared bitmap. A
//! lookup never blocks and never fails: when retrieval goes wrong the
//! classified error is routed to diagnostics and the caller receives the
//! cache's fallback image instead.
//!
//! # Example
//!
//! ```ignore
//! use pixcache::{ImageCache, ImageSlot};
//!
//! let cache = ImageCache::new();
//! let slot = ImageSlot::new(cache.clone());
//!
//! // Bind a display slot to a URL; a later load supersedes it.
//! slot.load("https://example.com/cover.png");
//!
//! // Or await a delivery directly.
//! let image = cache.get("https://example.com/cover.png").await;
//! ```

mod cache;
mod error;
mod fetch;
mod http;
mod placeholder;
mod resource;
mod slot;

pub use cache::{CacheConfig, Delivery, ImageCache};
pub use error::{FetchError, FetchFailure};
pub use fetch::Fetcher;
pub use http::{AsyncHttpClient, BoxFuture, ReqwestClient};
pub use placeholder::blank_placeholder;
pub use resource::CachedImage;
pub use slot::ImageSlot;
