use crate::foundation::core::{
    Affine, Point, STAGE_WHEEL_STEP, STAGE_ZOOM_MAX, STAGE_ZOOM_MIN, Vec2,
};
use crate::foundation::error::{CarouselError, CarouselResult};

/// Stage pan offset and uniform zoom scale.
///
/// Screen coordinates relate to canvas coordinates by `screen = canvas * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ViewTransformRaw")]
pub struct ViewTransform {
    /// Screen-space offset of the canvas origin.
    pub pan: Vec2,
    /// Uniform zoom scale.
    pub zoom: f64,
}

#[derive(serde::Deserialize)]
struct ViewTransformRaw {
    pan: Vec2,
    zoom: f64,
}

impl TryFrom<ViewTransformRaw> for ViewTransform {
    type Error = CarouselError;

    fn try_from(raw: ViewTransformRaw) -> Result<Self, Self::Error> {
        Self::new(raw.pan, raw.zoom)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    /// No pan, 1:1 zoom. Canvas coordinates equal screen coordinates.
    pub const IDENTITY: Self = Self {
        pan: Vec2::ZERO,
        zoom: 1.0,
    };

    /// Create a view, rejecting zoom outside `[STAGE_ZOOM_MIN, STAGE_ZOOM_MAX]`.
    pub fn new(pan: Vec2, zoom: f64) -> CarouselResult<Self> {
        if !pan.x.is_finite() || !pan.y.is_finite() {
            return Err(CarouselError::validation("stage pan must be finite"));
        }
        if !zoom_in_range(zoom) {
            return Err(CarouselError::validation(format!(
                "stage zoom {zoom} outside [{STAGE_ZOOM_MIN}, {STAGE_ZOOM_MAX}]"
            )));
        }
        Ok(Self { pan, zoom })
    }

    /// Map a pointer position into logical canvas coordinates.
    pub fn screen_to_canvas(&self, pointer: Point) -> Point {
        screen_to_canvas(pointer, self.pan, self.zoom)
    }

    /// Map a canvas point onto the screen.
    pub fn canvas_to_screen(&self, p: Point) -> Point {
        canvas_to_screen(p, self.pan, self.zoom)
    }

    /// Affine taking canvas coordinates to screen coordinates.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Zoom by one wheel notch keeping the canvas point under `pointer` fixed on screen.
    ///
    /// Negative `delta_y` zooms in. Returns `None` when the resulting zoom would leave the
    /// allowed range or when `delta_y` is zero; the caller keeps its current view. A non-finite
    /// `pointer` is ignored the same way.
    pub fn zoom_at(&self, pointer: Point, delta_y: f64) -> Option<Self> {
        if !(pointer.x.is_finite() && pointer.y.is_finite()) {
            return None;
        }
        let zoom = if delta_y < 0.0 {
            self.zoom * STAGE_WHEEL_STEP
        } else if delta_y > 0.0 {
            self.zoom / STAGE_WHEEL_STEP
        } else {
            return None;
        };
        if !zoom_in_range(zoom) {
            return None;
        }
        let anchor = self.screen_to_canvas(pointer);
        let pan = Vec2::new(pointer.x - anchor.x * zoom, pointer.y - anchor.y * zoom);
        Some(Self { pan, zoom })
    }
}

/// `(pointer - pan) / zoom`.
pub fn screen_to_canvas(pointer: Point, pan: Vec2, zoom: f64) -> Point {
    Point::new((pointer.x - pan.x) / zoom, (pointer.y - pan.y) / zoom)
}

/// `p * zoom + pan`.
pub fn canvas_to_screen(p: Point, pan: Vec2, zoom: f64) -> Point {
    Point::new(p.x * zoom + pan.x, p.y * zoom + pan.y)
}

/// Absolute x offset of slide `index` (0-based, zero gap, left to right).
pub fn slide_origin(index: u32, slide_width: f64) -> f64 {
    f64::from(index) * slide_width
}

/// Convert a screen-space drag into logical canvas units.
pub fn screen_delta_to_canvas(delta: Vec2, zoom: f64) -> Vec2 {
    delta / zoom
}

pub(crate) fn zoom_in_range(zoom: f64) -> bool {
    zoom.is_finite() && (STAGE_ZOOM_MIN..=STAGE_ZOOM_MAX).contains(&zoom)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/view.rs"]
mod tests;
