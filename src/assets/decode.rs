use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::foundation::math::{is_positive, premultiply_rgba8_in_place};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap straight-alpha RGBA8 pixels, premultiplying them.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> CarouselResult<Self> {
        if width == 0 || height == 0 {
            return Err(CarouselError::validation("image must have a non-zero area"));
        }
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8.len() != expected {
            return Err(CarouselError::validation(format!(
                "rgba8 buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Natural size in pixels.
    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Decode any format the `image` crate recognizes.
pub fn decode_image(bytes: &[u8]) -> CarouselResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    DecodedImage::from_rgba8(width, height, rgba.into_raw())
}

/// Scale `natural` down uniformly so neither edge exceeds `max`. Sizes already within the cap
/// are returned unchanged.
pub fn fit_within(natural: Size, max: f64) -> CarouselResult<Size> {
    if !is_positive(natural.width) || !is_positive(natural.height) {
        return Err(CarouselError::geometry(format!(
            "image size must be positive, got {}x{}",
            natural.width, natural.height
        )));
    }
    if !is_positive(max) {
        return Err(CarouselError::validation("fit bound must be positive"));
    }
    if natural.width <= max && natural.height <= max {
        return Ok(natural);
    }
    let ratio = (max / natural.width).min(max / natural.height);
    Ok(Size::new(natural.width * ratio, natural.height * ratio))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
