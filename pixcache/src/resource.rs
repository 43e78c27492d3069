//! The cached image resource type.
//!
//! A `CachedImage` is a decoded bitmap behind a shared pointer. Every caller
//! that requests the same key receives a handle to the same underlying
//! bitmap; cloning a handle never copies pixel data.

use std::sync::Arc;

use image::DynamicImage;
use image::GenericImageView;

use crate::error::FetchError;

/// A decoded in-memory image, shared among all callers for its key.
///
/// The bitmap is immutable once produced. Handles are cheap to clone and
/// compare equal when they share the same underlying bitmap, which is the
/// identity callers care about ("did I get back exactly what was stored?").
#[derive(Debug, Clone)]
pub struct CachedImage {
    pixels: Arc<DynamicImage>,
}

impl CachedImage {
    /// Wrap an already-decoded image.
    pub fn new(image: DynamicImage) -> Self {
        Self {
            pixels: Arc::new(image),
        }
    }

    /// Decode an image from raw response bytes.
    ///
    /// An empty body is a decode failure: the transport succeeded but there
    /// is nothing to decode.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Decode`] if the bytes are empty or do not parse
    /// as any supported image format.
    pub fn decode(bytes: &[u8]) -> Result<Self, FetchError> {
        if bytes.is_empty() {
            return Err(FetchError::Decode("empty response body".to_string()));
        }
        let image = image::load_from_memory(bytes)
            .map_err(|e| FetchError::Decode(format!("{}", e)))?;
        Ok(Self::new(image))
    }

    /// Width of the decoded bitmap in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height of the decoded bitmap in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the decoded bitmap.
    pub fn image(&self) -> &DynamicImage {
        &self.pixels
    }
}

/// Two handles are equal when they share the same underlying bitmap.
impl PartialEq for CachedImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl Eq for CachedImage {}
