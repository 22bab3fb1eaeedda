use crate::foundation::core::{EXPORT_JPEG_QUALITY, EXPORT_PIXEL_RATIO, Rect};
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::foundation::math::is_positive;
use crate::geometry::view::ViewTransform;

/// Name of the selection/transform decoration node. It is hidden while slides are captured.
pub const TRANSFORMER_NODE: &str = "transformer";

/// Raster encodings a surface can snapshot to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageEncoding {
    /// Lossy, opaque. Transparent pixels come out black.
    #[default]
    Jpeg,
    /// Lossless with alpha.
    Png,
}

impl ImageEncoding {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// MIME type.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Options for [`RenderSurface::snapshot`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotOpts {
    /// Output pixels per logical unit.
    pub pixel_ratio: f64,
    /// Output encoding.
    pub encoding: ImageEncoding,
    /// Lossy quality in `(0, 1]`; ignored by lossless encodings.
    pub quality: f32,
}

impl Default for SnapshotOpts {
    fn default() -> Self {
        Self {
            pixel_ratio: EXPORT_PIXEL_RATIO,
            encoding: ImageEncoding::Jpeg,
            quality: EXPORT_JPEG_QUALITY,
        }
    }
}

impl SnapshotOpts {
    /// Same options with another encoding.
    pub fn with_encoding(mut self, encoding: ImageEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Same options with another pixel ratio.
    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Reject a non-positive pixel ratio and a quality outside `(0, 1]`.
    pub fn validate(&self) -> CarouselResult<()> {
        if !is_positive(self.pixel_ratio) {
            return Err(CarouselError::validation(
                "snapshot pixel_ratio must be finite and > 0",
            ));
        }
        if !(self.quality.is_finite() && self.quality > 0.0 && self.quality <= 1.0) {
            return Err(CarouselError::validation(
                "snapshot quality must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Output pixel size for a region of the given logical size.
    pub fn output_size(&self, region: Rect) -> CarouselResult<(u32, u32)> {
        self.validate()?;
        let w = (region.width() * self.pixel_ratio).round();
        let h = (region.height() * self.pixel_ratio).round();
        let max = f64::from(u16::MAX);
        if !(is_positive(w) && is_positive(h)) || w > max || h > max {
            return Err(CarouselError::render(format!(
                "snapshot size {w}x{h} is empty or too large"
            )));
        }
        Ok((w as u32, h as u32))
    }
}

/// One encoded raster image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoding of `bytes`.
    pub encoding: ImageEncoding,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

/// The rendering collaborator the slide rasterizer drives.
///
/// Regions passed to [`RenderSurface::snapshot`] are in screen space, i.e. after the surface's
/// current view transform. The rasterizer resets the view to identity first, so screen space then
/// equals canvas space.
pub trait RenderSurface {
    /// `true` once content is attached and can be captured.
    fn is_ready(&self) -> bool;

    /// Current stage view.
    fn view(&self) -> ViewTransform;

    /// Replace the stage view.
    fn set_view(&mut self, view: ViewTransform);

    /// Visibility of a named decoration node. Unknown names are visible.
    fn node_visible(&self, name: &str) -> bool;

    /// Show or hide a named decoration node.
    fn set_node_visible(&mut self, name: &str, visible: bool);

    /// Rasterize `region` and encode it.
    fn snapshot(&mut self, region: Rect, opts: &SnapshotOpts) -> CarouselResult<EncodedImage>;

    /// Block until fonts needed for text are available.
    fn fonts_ready(&mut self) -> CarouselResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
