//! Viewport geometry for normalized → pixel mapping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Active viewport geometry.
///
/// Gaze samples are normalized to the viewport; this type carries the
/// dimensions used to rescale them into pixels and to size the vendor
/// tracking window.
///
/// # Example
///
/// ```
/// use beam_types::Viewport;
/// use glam::Vec2;
///
/// let vp = Viewport::new(1920, 1080);
/// let px = vp.to_pixels(Vec2::new(0.5, 1.0));
/// assert!((px.x - 960.0).abs() < 1e-3);
/// assert!((px.y - 1080.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport with the given dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if both dimensions are non-zero.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Rescales a viewport-normalized point into pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_pixels(self, norm: Vec2) -> Vec2 {
        Vec2::new(norm.x * self.width as f32, norm.y * self.height as f32)
    }

    /// Normalizes a pixel point into viewport coordinates.
    ///
    /// Returns `Vec2::ZERO` for an invalid viewport.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_normalized(self, px: Vec2) -> Vec2 {
        if self.is_valid() {
            Vec2::new(px.x / self.width as f32, px.y / self.height as f32)
        } else {
            Vec2::ZERO
        }
    }

    /// Inclusive bottom-right corner of the vendor tracking rectangle.
    ///
    /// The vendor API takes a window spanning `(0, 0)` to `(w-1, h-1)`.
    #[must_use]
    pub const fn vendor_corner(self) -> (u32, u32) {
        (
            self.width.saturating_sub(1),
            self.height.saturating_sub(1),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}
