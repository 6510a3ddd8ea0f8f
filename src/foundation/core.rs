use crate::foundation::error::{StudioError, StudioResult};

pub use kurbo::{Affine, Point, Vec2};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 800,
            height: 1000,
        }
    }
}

impl Canvas {
    /// Largest side the CPU rasterizer accepts.
    pub const MAX_DIM: u32 = u16::MAX as u32;

    /// Create a validated canvas with non-zero sides that fit the rasterizer.
    pub fn new(width: u32, height: u32) -> StudioResult<Self> {
        if width == 0 || height == 0 {
            return Err(StudioError::validation("canvas width/height must be > 0"));
        }
        if width > Self::MAX_DIM || height > Self::MAX_DIM {
            return Err(StudioError::validation(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = Self::MAX_DIM
            )));
        }
        Ok(Self { width, height })
    }

    /// The larger of the two sides, in pixels.
    pub fn max_side(self) -> u32 {
        self.width.max(self.height)
    }

    /// Convert a percent-of-canvas position into absolute pixel coordinates.
    pub fn percent_to_px(self, x_pct: f64, y_pct: f64) -> Point {
        Point::new(
            x_pct / 100.0 * f64::from(self.width),
            y_pct / 100.0 * f64::from(self.height),
        )
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
