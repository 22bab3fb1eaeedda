use crate::foundation::error::{CarouselError, CarouselResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Nominal width of one slide cell in logical canvas units.
pub const SLIDE_WIDTH: f64 = 1080.0;

/// Lower bound of the stage zoom scale.
pub const STAGE_ZOOM_MIN: f64 = 0.1;
/// Upper bound of the stage zoom scale.
pub const STAGE_ZOOM_MAX: f64 = 5.0;
/// Multiplicative step applied per wheel notch when zooming the stage.
pub const STAGE_WHEEL_STEP: f64 = 1.1;

/// Lower bound of an image frame's crop zoom (cover fit).
pub const CROP_ZOOM_MIN: f64 = 1.0;
/// Upper bound of an image frame's crop zoom.
pub const CROP_ZOOM_MAX: f64 = 5.0;
/// Multiplicative step applied per wheel notch when zooming a crop.
pub const CROP_WHEEL_STEP: f64 = 1.05;

/// Supersampling factor used for exported slides.
pub const EXPORT_PIXEL_RATIO: f64 = 2.0;
/// Lossy encoder quality used for exported slides, in `0..=1`.
pub const EXPORT_JPEG_QUALITY: f32 = 0.9;

/// Largest edge of a freshly dropped or uploaded image, in logical units.
pub const DROP_MAX_SIZE: f64 = 500.0;

/// Smallest frame edge allowed after committing a transform-handle resize.
pub const MIN_FRAME_SIZE: f64 = 5.0;

/// Supported slide aspect presets.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SlideAspect {
    /// 1080 x 1080.
    #[default]
    Square,
    /// 1080 x 1350.
    Portrait,
}

impl SlideAspect {
    /// Slide height in logical canvas units.
    pub fn height(self) -> f64 {
        match self {
            Self::Square => 1080.0,
            Self::Portrait => 1350.0,
        }
    }

    /// Look up the preset matching a nominal slide height.
    pub fn from_height(height: f64) -> Option<Self> {
        if height == 1080.0 {
            Some(Self::Square)
        } else if height == 1350.0 {
            Some(Self::Portrait)
        } else {
            None
        }
    }
}

/// Virtual partition of the canvas into equal slide cells laid out left to right.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SlideGridRaw")]
pub struct SlideGrid {
    /// Number of slides, always `>= 1`.
    pub count: u32,
    /// Height preset shared by every slide.
    pub aspect: SlideAspect,
}

impl Default for SlideGrid {
    fn default() -> Self {
        Self {
            count: 3,
            aspect: SlideAspect::Square,
        }
    }
}

#[derive(serde::Deserialize)]
struct SlideGridRaw {
    count: u32,
    #[serde(default)]
    aspect: SlideAspect,
}

impl TryFrom<SlideGridRaw> for SlideGrid {
    type Error = CarouselError;

    fn try_from(raw: SlideGridRaw) -> Result<Self, Self::Error> {
        Self::new(raw.count, raw.aspect)
    }
}

impl SlideGrid {
    /// Create a validated grid with at least one slide.
    pub fn new(count: u32, aspect: SlideAspect) -> CarouselResult<Self> {
        if count == 0 {
            return Err(CarouselError::validation("slide count must be >= 1"));
        }
        Ok(Self { count, aspect })
    }

    /// Width of one slide.
    pub fn slide_width(self) -> f64 {
        SLIDE_WIDTH
    }

    /// Height of one slide.
    pub fn slide_height(self) -> f64 {
        self.aspect.height()
    }

    /// Width of the whole strip of slides.
    pub fn total_width(self) -> f64 {
        f64::from(self.count) * SLIDE_WIDTH
    }

    /// Canvas-space bounds of slide `index` (0-based). The index is not checked against `count`.
    pub fn slide_bounds(self, index: u32) -> Rect {
        let x0 = crate::geometry::view::slide_origin(index, SLIDE_WIDTH);
        Rect::new(x0, 0.0, x0 + SLIDE_WIDTH, self.slide_height())
    }

    /// Slide containing canvas x coordinate `x`, or `None` when it falls outside the strip.
    pub fn slide_at(self, x: f64) -> Option<u32> {
        if !x.is_finite() || x < 0.0 || x >= self.total_width() {
            return None;
        }
        Some((x / SLIDE_WIDTH).floor() as u32)
    }
}

/// Opaque layer identifier, unique within a layer stack.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub String);

impl LayerId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
