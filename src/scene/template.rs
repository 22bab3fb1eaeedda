//! Built-in slide layouts and their expansion into placeholder layers.

use crate::geometry::view::slide_origin;
use crate::scene::layer::{FrameVariant, ImageLayer, Layer, LayerKind};

use FrameVariant::{Default as Plain, Polaroid, Vintage};

/// One empty image frame of a template, in slide-local coordinates (origin at the slide's
/// top-left).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TemplateItem {
    /// Left edge relative to the slide.
    pub x: f64,
    /// Top edge relative to the slide.
    pub y: f64,
    /// Width; may exceed a slide to bleed into the next one.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Frame preset.
    pub variant: FrameVariant,
}

impl TemplateItem {
    const fn image(x: f64, y: f64, width: f64, height: f64, variant: FrameVariant) -> Self {
        Self {
            x,
            y,
            width,
            height,
            variant,
        }
    }
}

/// A named, fixed arrangement of slots.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct LayoutTemplate {
    /// Stable identifier used by [`apply_template`].
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Slots in creation order (later slots stack above earlier ones).
    pub items: &'static [TemplateItem],
}

/// The template catalog.
pub const LAYOUT_TEMPLATES: &[LayoutTemplate] = &[
    LayoutTemplate {
        id: "single-full",
        name: "Full Screen",
        items: &[TemplateItem::image(0.0, 0.0, 1080.0, 1080.0, Plain)],
    },
    LayoutTemplate {
        id: "polaroid-center",
        name: "Polaroid Center",
        items: &[TemplateItem::image(140.0, 140.0, 800.0, 1000.0, Polaroid)],
    },
    LayoutTemplate {
        id: "grid-2x2",
        name: "2x2 Grid",
        items: &[
            TemplateItem::image(50.0, 50.0, 465.0, 465.0, Plain),
            TemplateItem::image(565.0, 50.0, 465.0, 465.0, Plain),
            TemplateItem::image(50.0, 565.0, 465.0, 465.0, Plain),
            TemplateItem::image(565.0, 565.0, 465.0, 465.0, Plain),
        ],
    },
    LayoutTemplate {
        id: "vintage-collage",
        name: "Vintage Split",
        items: &[
            TemplateItem::image(50.0, 50.0, 980.0, 600.0, Vintage),
            TemplateItem::image(50.0, 700.0, 465.0, 330.0, Vintage),
            TemplateItem::image(565.0, 700.0, 465.0, 330.0, Vintage),
        ],
    },
    // One frame 1580 wide: starts on the target slide and runs 500 units into the next.
    LayoutTemplate {
        id: "panoramic-bridge",
        name: "Panoramic Bridge",
        items: &[TemplateItem::image(100.0, 200.0, 1580.0, 800.0, Plain)],
    },
];

/// Look up a catalog entry.
pub fn find_template(id: &str) -> Option<&'static LayoutTemplate> {
    LAYOUT_TEMPLATES.iter().find(|t| t.id == id)
}

/// Expand `template_id` onto slide `slide_index`.
///
/// Each slot becomes a new layer with a fresh id at `x = slide_index * slide_width + item.x`,
/// `y = item.y`, the slot's size copied verbatim, unit scale, no rotation and no image source.
/// Heights are not rescaled for slide heights other than 1080. Unknown ids yield an empty list.
pub fn apply_template(
    template_id: &str,
    slide_index: u32,
    slide_width: f64,
    slide_height: f64,
) -> Vec<Layer> {
    let Some(template) = find_template(template_id) else {
        tracing::debug!(template_id, "unknown layout template");
        return Vec::new();
    };
    if slide_height != 1080.0 {
        tracing::debug!(
            template_id,
            slide_height,
            "template slots keep their 1080-based heights"
        );
    }

    let origin = slide_origin(slide_index, slide_width);
    template
        .items
        .iter()
        .map(|item| {
            let img = ImageLayer::placeholder(item.width, item.height, item.variant);
            Layer::new(origin + item.x, item.y, LayerKind::Image(img))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/template.rs"]
mod tests;
