use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::foundation::core::Size;
use crate::foundation::error::{CarouselError, CarouselResult};

/// Decoded images keyed by the source reference stored on image layers.
///
/// A layer whose source is not in the store has no natural size yet; crop geometry and
/// rendering treat it as a placeholder.
#[derive(Clone, Debug, Default)]
pub struct ImageStore {
    images: BTreeMap<String, DecodedImage>,
}

impl ImageStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when no image is loaded.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Register an already decoded image, replacing any previous one under `key`.
    pub fn insert(&mut self, key: impl Into<String>, image: DecodedImage) {
        let key = key.into();
        tracing::debug!(%key, width = image.width, height = image.height, "image stored");
        self.images.insert(key, image);
    }

    /// Decode `bytes` and register them under `key`. Returns the natural size.
    pub fn insert_bytes(&mut self, key: impl Into<String>, bytes: &[u8]) -> CarouselResult<Size> {
        let image = decode_image(bytes)?;
        let size = image.size();
        self.insert(key, image);
        Ok(size)
    }

    /// Read and decode a file, keyed by its file name. Returns the key and natural size.
    pub fn load_file(&mut self, path: &Path) -> CarouselResult<(String, Size)> {
        let key = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                let msg = format!("image path has no file name: {}", path.display());
                CarouselError::validation(msg)
            })?
            .to_owned();
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let size = self.insert_bytes(key.clone(), &bytes)?;
        Ok((key, size))
    }

    /// Look up a decoded image.
    pub fn get(&self, key: &str) -> Option<&DecodedImage> {
        self.images.get(key)
    }

    /// Natural size of `key`, if decoded.
    pub fn natural_size(&self, key: &str) -> Option<Size> {
        self.images.get(key).map(DecodedImage::size)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Face requested for a layout. The family falls back to the registered font when the
/// collection does not know it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextFace<'a> {
    pub(crate) family: Option<&'a str>,
    pub(crate) bold: bool,
    pub(crate) italic: bool,
}

/// CSS-style family list: the requested family first, then the registered one.
pub(crate) fn font_stack_source(requested: Option<&str>, registered: &str) -> String {
    let quote = |name: &str| format!("\"{}\"", name.replace('"', ""));
    match requested.map(str::trim).filter(|r| !r.is_empty() && *r != registered) {
        Some(r) => format!("{}, {}", quote(r), quote(registered)),
        None => quote(registered),
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: Option<String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family: None,
        }
    }

    /// Register `font_bytes` as the family every layout uses.
    pub(crate) fn register_font(&mut self, font_bytes: &[u8]) -> CarouselResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CarouselError::validation("no font families registered from font bytes")
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CarouselError::validation("registered font family has no name"))?
            .to_string();
        self.family = Some(name);
        Ok(())
    }

    /// `true` once a font has been registered.
    pub(crate) fn has_font(&self) -> bool {
        self.family.is_some()
    }

    /// Shape and break plain text. Lines are left-aligned; callers offset them for other
    /// alignments using the line advance.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        face: TextFace<'_>,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> CarouselResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CarouselError::validation(
                "text size must be finite and > 0",
            ));
        }
        let registered = self
            .family
            .as_deref()
            .ok_or_else(|| CarouselError::render("no font registered for text layout"))?;
        let stack = font_stack_source(face.family, registered);

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(stack)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let weight = if face.bold {
            parley::style::FontWeight::BOLD
        } else {
            parley::style::FontWeight::NORMAL
        };
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        let slant = if face.italic {
            parley::style::FontStyle::Italic
        } else {
            parley::style::FontStyle::Normal
        };
        builder.push_default(parley::style::StyleProperty::FontStyle(slant));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        layout.align(
            max_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
