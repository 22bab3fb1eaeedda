//! Cover + zoom + pan crop computation for framed images.
//!
//! A crop rectangle lives in source-image pixel space. It is always derived from the image's
//! natural size, the display size of the frame's image area, the crop zoom and the crop pan; it
//! is never stored on its own.

use crate::foundation::core::{CROP_WHEEL_STEP, CROP_ZOOM_MAX, CROP_ZOOM_MIN, Rect, Size, Vec2};
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::foundation::math::is_positive;

/// Sampling window into a source image, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width of the window.
    pub width: f64,
    /// Height of the window.
    pub height: f64,
}

impl CropRect {
    /// Area in square source pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Aspect ratio `width / height`.
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Convert into a `kurbo` rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Per-layer crop parameters: zoom (>= 1) and pan in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropState {
    /// Zoom factor, kept within `[CROP_ZOOM_MIN, CROP_ZOOM_MAX]`.
    pub zoom: f64,
    /// Pan offset subtracted from the centered window origin.
    pub pan: Vec2,
}

impl Default for CropState {
    fn default() -> Self {
        Self {
            zoom: CROP_ZOOM_MIN,
            pan: Vec2::ZERO,
        }
    }
}

impl CropState {
    /// Build a crop state, clamping `zoom` into the supported range.
    ///
    /// Non-finite zoom falls back to cover fit and non-finite pan components fall back to zero.
    pub fn new(zoom: f64, pan: Vec2) -> Self {
        let zoom = if zoom.is_finite() {
            zoom.clamp(CROP_ZOOM_MIN, CROP_ZOOM_MAX)
        } else {
            CROP_ZOOM_MIN
        };
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            zoom,
            pan: Vec2::new(finite_or_zero(pan.x), finite_or_zero(pan.y)),
        }
    }

    /// Apply one wheel notch: negative `delta_y` zooms in, positive zooms out.
    ///
    /// A zero delta leaves the state unchanged.
    pub fn wheel(self, delta_y: f64) -> Self {
        let zoom = if delta_y > 0.0 {
            self.zoom / CROP_WHEEL_STEP
        } else if delta_y < 0.0 {
            self.zoom * CROP_WHEEL_STEP
        } else {
            return self;
        };
        Self::new(zoom, self.pan)
    }

    /// Pan reached after dragging the crop by `drag` display units since the gesture started at
    /// `start_pan`.
    ///
    /// `display_width` is the on-screen width of the frame's image area; display units are
    /// scaled into source pixels by `crop.width / display_width` on both axes. Dragging right
    /// produces a negative x pan delta so the image appears to move left.
    pub fn pan_from_drag(start_pan: Vec2, drag: Vec2, crop: &CropRect, display_width: f64) -> Vec2 {
        let factor = drag_scale_factor(crop.width, display_width);
        start_pan - drag * factor
    }
}

/// Compute the crop window for an image of size `image` shown in a frame of size `frame`.
///
/// Errors on non-positive or non-finite sizes, on `zoom < 1` and on non-finite input. The
/// returned rectangle always lies inside the image bounds.
pub fn compute_crop(image: Size, frame: Size, zoom: f64, pan: Vec2) -> CarouselResult<CropRect> {
    if !is_positive(image.width) || !is_positive(image.height) {
        return Err(CarouselError::geometry(format!(
            "source image must have a positive area, got {}x{}",
            image.width, image.height
        )));
    }
    if !is_positive(frame.width) || !is_positive(frame.height) {
        return Err(CarouselError::geometry(format!(
            "frame must have a positive size, got {}x{}",
            frame.width, frame.height
        )));
    }
    if !zoom.is_finite() || zoom < CROP_ZOOM_MIN {
        return Err(CarouselError::geometry(format!(
            "crop zoom must be >= {CROP_ZOOM_MIN}, got {zoom}"
        )));
    }
    if !pan.x.is_finite() || !pan.y.is_finite() {
        return Err(CarouselError::geometry("crop pan must be finite"));
    }

    let image_aspect = image.width / image.height;
    let frame_aspect = frame.width / frame.height;

    let (cover_w, cover_h) = if image_aspect > frame_aspect {
        (image.height * frame_aspect, image.height)
    } else {
        (image.width, image.width / frame_aspect)
    };

    let width = cover_w / zoom;
    let height = cover_h / zoom;

    let x = clamp_axis((image.width - width) / 2.0 - pan.x, width, image.width);
    let y = clamp_axis((image.height - height) / 2.0 - pan.y, height, image.height);

    Ok(CropRect {
        x,
        y,
        width,
        height,
    })
}

/// Like [`compute_crop`], but an image that has not been decoded yet yields `Ok(None)`.
pub fn crop_for_image(
    image: Option<Size>,
    frame: Size,
    state: CropState,
) -> CarouselResult<Option<CropRect>> {
    match image {
        None => Ok(None),
        Some(image) => compute_crop(image, frame, state.zoom, state.pan).map(Some),
    }
}

/// Placement of the whole source image, in frame-local display units, such that the cropped
/// window lines up with `area`. Used for the translucent context image shown while cropping.
pub fn ghost_rect(image: Size, crop: &CropRect, area: Rect) -> Rect {
    let scale = area.width() / crop.width;
    let x0 = area.x0 - crop.x * scale;
    let y0 = area.y0 - crop.y * scale;
    Rect::new(x0, y0, x0 + image.width * scale, y0 + image.height * scale)
}

/// Source pixels per display unit for a crop dimension shown at `display_dim`.
pub fn drag_scale_factor(crop_dim: f64, display_dim: f64) -> f64 {
    if is_positive(display_dim) {
        crop_dim / display_dim
    } else {
        0.0
    }
}

fn clamp_axis(origin: f64, extent: f64, limit: f64) -> f64 {
    let mut v = origin;
    if v < 0.0 {
        v = 0.0;
    }
    if v + extent > limit {
        v = limit - extent;
    }
    v
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/crop.rs"]
mod tests;
