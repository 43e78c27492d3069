//! Blank placeholder image for the fallback path.
//!
//! When a fetch fails, the cache delivers its fallback image instead of an
//! error. If no fallback was ever set, a blank placeholder stands in so a
//! lookup still produces *some* image.
//!
//! # Static Placeholder
//!
//! The blank bitmap is generated once at first access and cached for the
//! lifetime of the process. Every unset cache shares the same handle, which
//! keeps repeated unset reads idempotent.

use std::sync::OnceLock;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::resource::CachedImage;

/// Static placeholder cache - generated once, shared for the process lifetime.
static BLANK_PLACEHOLDER: OnceLock<CachedImage> = OnceLock::new();

/// Get the blank placeholder image, guaranteed to exist.
///
/// A 1×1 fully transparent bitmap. Generation is infallible, so unlike a
/// real fetch this can never leave a caller without an image.
///
/// # Returns
///
/// A handle to the process-wide blank placeholder bitmap. Repeated calls
/// return handles to the same bitmap.
pub fn blank_placeholder() -> CachedImage {
    BLANK_PLACEHOLDER
        .get_or_init(|| {
            let blank = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
            CachedImage::new(DynamicImage::ImageRgba8(blank))
        })
        .clone()
}
