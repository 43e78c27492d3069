//! Display-slot binding over the cache.
//!
//! An `ImageSlot` is the consumer-facing side of the delivery contract: it
//! records the key it currently cares about before issuing each request, and
//! when a delivery arrives it applies the image only if that key is still
//! current. A late delivery for an abandoned key never overwrites the
//! display state of a newer request.
//!
//! Observers watch the slot's displayed image through a `watch` channel;
//! the slot can optionally publish a loading image the moment a new key is
//! requested, before the real delivery arrives.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use crate::cache::ImageCache;
use crate::resource::CachedImage;

/// A mutable display slot bound to an [`ImageCache`].
///
/// Cheaply clonable; clones share the same display state.
#[derive(Clone)]
pub struct ImageSlot {
    inner: Arc<SlotInner>,
}

struct SlotInner {
    cache: ImageCache,
    current_key: Mutex<Option<String>>,
    display_tx: watch::Sender<Option<CachedImage>>,
    loading_image: RwLock<Option<CachedImage>>,
}

impl ImageSlot {
    /// Create a slot over an explicit cache instance.
    pub fn new(cache: ImageCache) -> Self {
        let (display_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(SlotInner {
                cache,
                current_key: Mutex::new(None),
                display_tx,
                loading_image: RwLock::new(None),
            }),
        }
    }

    /// Create a slot bound to the process-wide default cache.
    pub fn with_shared_cache() -> Self {
        Self::new(ImageCache::shared().clone())
    }

    /// Image published to the display while a request is outstanding.
    ///
    /// Unset by default; when set, it is shown immediately on every
    /// subsequent [`load`](Self::load) until the delivery arrives.
    pub fn set_loading_image(&self, image: CachedImage) {
        *self.inner.loading_image.write() = Some(image);
    }

    /// Subscribe to the displayed image.
    pub fn display(&self) -> watch::Receiver<Option<CachedImage>> {
        self.inner.display_tx.subscribe()
    }

    /// The currently displayed image, if any.
    pub fn displayed(&self) -> Option<CachedImage> {
        self.inner.display_tx.borrow().clone()
    }

    /// Request `key` and bind the eventual delivery to this slot.
    ///
    /// Marks `key` as the slot's current interest, publishes the loading
    /// image if one is set, and applies the delivery on arrival only if no
    /// newer `load` has replaced the interest in the meantime.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn load(&self, key: &str) {
        {
            let mut current = self.inner.current_key.lock();
            *current = Some(key.to_string());
            if let Some(loading) = self.inner.loading_image.read().clone() {
                self.inner.display_tx.send_replace(Some(loading));
            }
        }

        let delivery = self.inner.cache.get(key);
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        tokio::spawn(async move {
            let image = delivery.await;
            // Apply under the interest lock so a racing `load` cannot
            // interleave between the check and the publication.
            let current = inner.current_key.lock();
            if current.as_deref() == Some(key.as_str()) {
                inner.display_tx.send_replace(Some(image));
            }
        });
    }
}
