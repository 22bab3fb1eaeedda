use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::{LayerId, MIN_FRAME_SIZE, Rect, Size, Vec2};
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::foundation::math::is_positive;
use crate::geometry::crop::CropState;

/// Padding used by the polaroid frame when none is set.
pub const POLAROID_DEFAULT_PADDING: f64 = 20.0;
/// Bottom margin of a polaroid frame, as a multiple of its padding.
pub const POLAROID_BOTTOM_FACTOR: f64 = 3.0;

/// One placed element on the canvas.
///
/// The position in the owning [`crate::scene::stack::LayerStack`] is the only z-order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier within the stack.
    pub id: LayerId,
    /// Left edge in canvas units.
    pub x: f64,
    /// Top edge in canvas units.
    pub y: f64,
    /// Clockwise rotation in degrees around the top-left corner.
    #[serde(default)]
    pub rotation: f64,
    /// Horizontal scale from transform handles.
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    /// Vertical scale from transform handles.
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    /// Kind-specific payload.
    #[serde(flatten)]
    pub kind: LayerKind,
}

fn unit_scale() -> f64 {
    1.0
}

/// Closed set of layer payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    /// Framed image (or an empty placeholder frame).
    Image(ImageLayer),
    /// Text run.
    Text(TextLayer),
    /// Filled primitive.
    Shape(ShapeLayer),
}

/// Decorative frame presets for image layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameVariant {
    /// Image fills the frame, optional rounded corners.
    #[default]
    Default,
    /// White card with a wide bottom margin.
    Polaroid,
    /// Faded image with sepia overlay and a brown border.
    Vintage,
}

/// Image layer payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageLayer {
    /// Key of the decoded image in the image store; `None` renders a placeholder.
    #[serde(default)]
    pub source: Option<String>,
    /// Frame width.
    pub width: f64,
    /// Frame height.
    pub height: f64,
    /// Frame preset.
    #[serde(default)]
    pub variant: FrameVariant,
    /// Inner padding; only the polaroid frame uses it.
    #[serde(default)]
    pub padding: Option<f64>,
    /// Corner radius of the image clip.
    #[serde(default)]
    pub corner_radius: f64,
    /// Fill shown behind the image area.
    #[serde(default = "placeholder_fill")]
    pub fill: Color,
    /// Crop zoom and pan.
    #[serde(default)]
    pub crop: CropState,
}

fn placeholder_fill() -> Color {
    Color::PLACEHOLDER
}

impl ImageLayer {
    /// Empty frame of the given size.
    pub fn placeholder(width: f64, height: f64, variant: FrameVariant) -> Self {
        Self {
            source: None,
            width,
            height,
            variant,
            padding: None,
            corner_radius: 0.0,
            fill: Color::PLACEHOLDER,
            crop: CropState::default(),
        }
    }

    /// Padding in effect for the current variant.
    pub fn effective_padding(&self) -> f64 {
        match self.variant {
            FrameVariant::Polaroid => self.padding.unwrap_or(POLAROID_DEFAULT_PADDING),
            FrameVariant::Default | FrameVariant::Vintage => 0.0,
        }
    }

    /// Frame-local rectangle the picture is drawn into. Crop geometry is computed against its
    /// size, not against the outer frame.
    pub fn image_area(&self) -> Rect {
        let p = self.effective_padding();
        match self.variant {
            FrameVariant::Polaroid => Rect::new(
                p,
                p,
                self.width - p,
                self.height - p * POLAROID_BOTTOM_FACTOR,
            ),
            FrameVariant::Default | FrameVariant::Vintage => {
                Rect::new(0.0, 0.0, self.width, self.height)
            }
        }
    }
}

/// Font weight/slant combinations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    /// Regular.
    #[default]
    Normal,
    /// Italic.
    Italic,
    /// Bold.
    Bold,
    /// Bold italic.
    BoldItalic,
}

impl FontStyle {
    /// Heavy weight requested.
    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldItalic)
    }

    /// Slanted face requested.
    pub fn is_italic(self) -> bool {
        matches!(self, Self::Italic | Self::BoldItalic)
    }
}

/// Text decoration line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecoration {
    /// No line.
    #[default]
    None,
    /// Line below the baseline.
    Underline,
    /// Line through the middle.
    LineThrough,
}

/// Horizontal alignment within the wrap width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// Start edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// End edge.
    Right,
}

/// Text layer payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Content.
    pub text: String,
    /// Font size in canvas units.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Text color.
    #[serde(default = "default_text_fill")]
    pub fill: Color,
    /// Family name.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Weight/slant.
    #[serde(default)]
    pub font_style: FontStyle,
    /// Decoration line.
    #[serde(default)]
    pub decoration: TextDecoration,
    /// Alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Wrap width; `None` lays the text out on one line per paragraph.
    #[serde(default)]
    pub width: Option<f64>,
}

fn default_font_size() -> f64 {
    24.0
}

fn default_text_fill() -> Color {
    Color::BLACK
}

fn default_font_family() -> String {
    "Inter".to_owned()
}

impl TextLayer {
    /// Text with default styling.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: default_font_size(),
            fill: default_text_fill(),
            font_family: default_font_family(),
            font_style: FontStyle::Normal,
            decoration: TextDecoration::None,
            align: TextAlign::Left,
            width: None,
        }
    }
}

/// Shape subtypes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    #[default]
    Rect,
    /// Circle whose diameter is the layer width.
    Circle,
}

/// Shape layer payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeLayer {
    /// Subtype.
    pub shape: ShapeKind,
    /// Width (diameter for circles).
    pub width: f64,
    /// Height; ignored by circles.
    pub height: f64,
    /// Fill color.
    #[serde(default = "default_shape_fill")]
    pub fill: Color,
}

fn default_shape_fill() -> Color {
    Color::SHAPE_BLUE
}

impl Layer {
    /// New layer with a fresh identifier, unit scale and no rotation.
    pub fn new(x: f64, y: f64, kind: LayerKind) -> Self {
        Self {
            id: LayerId::generate(),
            x,
            y,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            kind,
        }
    }

    /// Image frame showing `source`, with default variant and cover-fit crop.
    pub fn image(x: f64, y: f64, width: f64, height: f64, source: Option<String>) -> Self {
        let mut img = ImageLayer::placeholder(width, height, FrameVariant::Default);
        img.source = source;
        Self::new(x, y, LayerKind::Image(img))
    }

    /// Text layer with default styling.
    pub fn text(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self::new(x, y, LayerKind::Text(TextLayer::new(text)))
    }

    /// Shape layer with the default fill.
    pub fn shape(x: f64, y: f64, shape: ShapeKind, width: f64, height: f64) -> Self {
        Self::new(
            x,
            y,
            LayerKind::Shape(ShapeLayer {
                shape,
                width,
                height,
                fill: Color::SHAPE_BLUE,
            }),
        )
    }

    /// Stable lowercase name of the layer kind.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            LayerKind::Image(_) => "image",
            LayerKind::Text(_) => "text",
            LayerKind::Shape(_) => "shape",
        }
    }

    /// Unscaled size, when the layer has one. Text only has a size once it wraps.
    pub fn size(&self) -> Option<Size> {
        match &self.kind {
            LayerKind::Image(img) => Some(Size::new(img.width, img.height)),
            LayerKind::Shape(s) => match s.shape {
                ShapeKind::Rect => Some(Size::new(s.width, s.height)),
                ShapeKind::Circle => Some(Size::new(s.width, s.width)),
            },
            LayerKind::Text(_) => None,
        }
    }

    /// Unrotated bounds with scale applied. Circles are centered on `(x, y)`; every other kind
    /// hangs from its top-left corner.
    pub fn bounds(&self) -> Option<Rect> {
        let size = self.size()?;
        let w = size.width * self.scale_x;
        let h = size.height * self.scale_y;
        if let LayerKind::Shape(ShapeLayer {
            shape: ShapeKind::Circle,
            ..
        }) = &self.kind
        {
            return Some(Rect::new(
                self.x - w / 2.0,
                self.y - h / 2.0,
                self.x + w / 2.0,
                self.y + h / 2.0,
            ));
        }
        Some(Rect::new(self.x, self.y, self.x + w, self.y + h))
    }

    /// Fold interactive scale into the frame size of an image layer.
    ///
    /// Each edge is kept at least [`MIN_FRAME_SIZE`] and scale is reset to 1. Other kinds keep
    /// their scale factors.
    pub fn bake_scale(&mut self) {
        if let LayerKind::Image(img) = &mut self.kind {
            img.width = (img.width * self.scale_x).max(MIN_FRAME_SIZE);
            img.height = (img.height * self.scale_y).max(MIN_FRAME_SIZE);
            self.scale_x = 1.0;
            self.scale_y = 1.0;
        }
    }
}

/// Partial update of a layer's attributes.
///
/// A patch is validated in full before anything is written; a field that does not apply to the
/// target layer's kind rejects the whole patch.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerPatch {
    /// New left edge.
    pub x: Option<f64>,
    /// New top edge.
    pub y: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
    /// New horizontal scale.
    pub scale_x: Option<f64>,
    /// New vertical scale.
    pub scale_y: Option<f64>,
    /// New width (wrap width for text).
    pub width: Option<f64>,
    /// New height (image and shape only).
    pub height: Option<f64>,
    /// New fill color.
    pub fill: Option<Color>,
    /// New crop zoom, clamped into the crop zoom range.
    pub crop_zoom: Option<f64>,
    /// New crop pan.
    pub crop_pan: Option<Vec2>,
    /// New image source key.
    pub source: Option<String>,
    /// New frame preset.
    pub variant: Option<FrameVariant>,
    /// New polaroid padding.
    pub padding: Option<f64>,
    /// New corner radius.
    pub corner_radius: Option<f64>,
    /// New text content.
    pub text: Option<String>,
    /// New font size.
    pub font_size: Option<f64>,
    /// New font family.
    pub font_family: Option<String>,
    /// New font style.
    pub font_style: Option<FontStyle>,
    /// New decoration.
    pub decoration: Option<TextDecoration>,
    /// New alignment.
    pub align: Option<TextAlign>,
    /// New shape subtype.
    pub shape: Option<ShapeKind>,
}

impl LayerPatch {
    /// Patch moving a layer to `(x, y)`.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch setting crop pan.
    pub fn crop_pan(pan: Vec2) -> Self {
        Self {
            crop_pan: Some(pan),
            ..Self::default()
        }
    }

    /// Patch setting crop zoom.
    pub fn crop_zoom(zoom: f64) -> Self {
        Self {
            crop_zoom: Some(zoom),
            ..Self::default()
        }
    }

    /// Produce the patched copy of `layer`, leaving `layer` untouched.
    pub fn apply(&self, layer: &Layer) -> CarouselResult<Layer> {
        self.validate_numbers()?;

        let mut out = layer.clone();
        set(&mut out.x, self.x);
        set(&mut out.y, self.y);
        set(&mut out.rotation, self.rotation);
        set(&mut out.scale_x, self.scale_x);
        set(&mut out.scale_y, self.scale_y);

        let kind_name = layer.kind_name();
        match &mut out.kind {
            LayerKind::Image(img) => {
                self.reject_text_fields(kind_name)?;
                reject(self.shape.is_some(), "shape", kind_name)?;
                set(&mut img.width, self.width);
                set(&mut img.height, self.height);
                set(&mut img.fill, self.fill);
                set(&mut img.variant, self.variant);
                set(&mut img.corner_radius, self.corner_radius);
                if let Some(p) = self.padding {
                    img.padding = Some(p);
                }
                if let Some(src) = &self.source {
                    img.source = Some(src.clone());
                }
                if self.crop_zoom.is_some() || self.crop_pan.is_some() {
                    img.crop = CropState::new(
                        self.crop_zoom.unwrap_or(img.crop.zoom),
                        self.crop_pan.unwrap_or(img.crop.pan),
                    );
                }
            }
            LayerKind::Text(t) => {
                self.reject_image_fields(kind_name)?;
                reject(self.height.is_some(), "height", kind_name)?;
                reject(self.shape.is_some(), "shape", kind_name)?;
                if let Some(w) = self.width {
                    t.width = Some(w);
                }
                set(&mut t.fill, self.fill);
                set(&mut t.font_size, self.font_size);
                set(&mut t.font_style, self.font_style);
                set(&mut t.decoration, self.decoration);
                set(&mut t.align, self.align);
                if let Some(text) = &self.text {
                    t.text = text.clone();
                }
                if let Some(family) = &self.font_family {
                    t.font_family = family.clone();
                }
            }
            LayerKind::Shape(s) => {
                self.reject_image_fields(kind_name)?;
                self.reject_text_fields(kind_name)?;
                set(&mut s.width, self.width);
                set(&mut s.height, self.height);
                set(&mut s.fill, self.fill);
                set(&mut s.shape, self.shape);
            }
        }
        Ok(out)
    }

    fn validate_numbers(&self) -> CarouselResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("crop_zoom", self.crop_zoom),
        ] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(CarouselError::validation(format!("{name} must be finite")));
            }
        }
        for (name, v) in [
            ("scale_x", self.scale_x),
            ("scale_y", self.scale_y),
            ("width", self.width),
            ("height", self.height),
            ("font_size", self.font_size),
        ] {
            if let Some(v) = v
                && !is_positive(v)
            {
                return Err(CarouselError::validation(format!(
                    "{name} must be finite and > 0"
                )));
            }
        }
        for (name, v) in [("padding", self.padding), ("corner_radius", self.corner_radius)] {
            if let Some(v) = v
                && !(v.is_finite() && v >= 0.0)
            {
                return Err(CarouselError::validation(format!(
                    "{name} must be finite and >= 0"
                )));
            }
        }
        if let Some(p) = self.crop_pan
            && !(p.x.is_finite() && p.y.is_finite())
        {
            return Err(CarouselError::validation("crop_pan must be finite"));
        }
        Ok(())
    }

    fn reject_image_fields(&self, kind: &str) -> CarouselResult<()> {
        reject(self.crop_zoom.is_some(), "crop_zoom", kind)?;
        reject(self.crop_pan.is_some(), "crop_pan", kind)?;
        reject(self.source.is_some(), "source", kind)?;
        reject(self.variant.is_some(), "variant", kind)?;
        reject(self.padding.is_some(), "padding", kind)?;
        reject(self.corner_radius.is_some(), "corner_radius", kind)
    }

    fn reject_text_fields(&self, kind: &str) -> CarouselResult<()> {
        reject(self.text.is_some(), "text", kind)?;
        reject(self.font_size.is_some(), "font_size", kind)?;
        reject(self.font_family.is_some(), "font_family", kind)?;
        reject(self.font_style.is_some(), "font_style", kind)?;
        reject(self.decoration.is_some(), "decoration", kind)?;
        reject(self.align.is_some(), "align", kind)
    }
}

fn set<T>(slot: &mut T, v: Option<T>) {
    if let Some(v) = v {
        *slot = v;
    }
}

fn reject(present: bool, field: &str, kind: &str) -> CarouselResult<()> {
    if present {
        return Err(CarouselError::validation(format!(
            "field '{field}' does not apply to {kind} layers"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
