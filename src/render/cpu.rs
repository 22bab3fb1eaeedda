use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use vello_cpu::kurbo::Shape as _;
use vello_cpu::peniko::color::PremulRgba8;

use crate::assets::color::Color;
use crate::assets::decode::DecodedImage;
use crate::assets::store::{ImageStore, TextBrushRgba8, TextFace, TextLayoutEngine};
use crate::foundation::core::{Affine, LayerId, Rect, SlideGrid, Vec2};
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::geometry::crop::{CropRect, crop_for_image};
use crate::geometry::view::ViewTransform;
use crate::render::surface::{
    EncodedImage, ImageEncoding, RenderSurface, SnapshotOpts, TRANSFORMER_NODE,
};
use crate::scene::canvas::CanvasState;
use crate::scene::layer::{
    FrameVariant, ImageLayer, Layer, LayerKind, ShapeKind, ShapeLayer, TextAlign, TextDecoration,
    TextLayer,
};

/// Opacity of the picture inside a vintage frame.
pub const VINTAGE_IMAGE_OPACITY: f32 = 0.9;
/// Sepia wash drawn over a vintage frame.
pub const VINTAGE_OVERLAY: Color = Color::rgba(0x70, 0x42, 0x14, 51);
/// Vintage border color.
pub const VINTAGE_BORDER: Color = Color::rgb(0x5c, 0x40, 0x33);
/// Vintage border width, centered on the frame edge.
pub const VINTAGE_BORDER_WIDTH: f64 = 4.0;

const POLAROID_SHADOW: Color = Color::rgba(0, 0, 0, 26);
const POLAROID_SHADOW_OFFSET: (f64, f64) = (2.0, 4.0);
const SELECTION_COLOR: Color = Color::rgb(0, 161, 255);
const SELECTION_WIDTH_PX: f64 = 1.0;
const PATH_TOLERANCE: f64 = 0.1;

/// Options for [`CpuSurface`].
#[derive(Debug, Clone, Default)]
pub struct CpuSurfaceOpts {
    pub(crate) clear_rgba: Option<[u8; 4]>,
    pub(crate) font_bytes: Option<Arc<Vec<u8>>>,
}

impl CpuSurfaceOpts {
    /// Fill the whole snapshot with this straight-alpha color before drawing.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Font used for every text layer. Without one, text layers are skipped.
    pub fn with_font_bytes(mut self, bytes: Option<Vec<u8>>) -> Self {
        self.font_bytes = bytes.map(Arc::new);
        self
    }
}

struct Attached {
    background: Color,
    slides: SlideGrid,
    layers: Vec<Layer>,
    selection: Vec<LayerId>,
    images: ImageStore,
}

/// Reference render surface rasterizing a canvas snapshot with `vello_cpu`.
///
/// The surface owns its own stage view and decoration visibility, like an on-screen stage would.
/// Content is a copy taken by [`CpuSurface::attach`]; later edits to the canvas need another
/// attach.
pub struct CpuSurface {
    opts: CpuSurfaceOpts,
    attached: Option<Attached>,
    view: ViewTransform,
    hidden: BTreeSet<String>,
    text_engine: TextLayoutEngine,
    font: Option<vello_cpu::peniko::FontData>,
    paints: HashMap<String, vello_cpu::Image>,
}

impl CpuSurface {
    /// Create a surface with nothing attached.
    pub fn new(opts: CpuSurfaceOpts) -> CarouselResult<Self> {
        let mut text_engine = TextLayoutEngine::new();
        let font = match &opts.font_bytes {
            Some(bytes) => {
                text_engine.register_font(bytes)?;
                Some(vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                    0,
                ))
            }
            None => None,
        };
        Ok(Self {
            opts,
            attached: None,
            view: ViewTransform::IDENTITY,
            hidden: BTreeSet::new(),
            text_engine,
            font,
            paints: HashMap::new(),
        })
    }

    /// Copy the drawable content and stage view of `state`. Images are looked up in `images`.
    pub fn attach(&mut self, state: &CanvasState, images: &ImageStore) {
        self.attached = Some(Attached {
            background: state.background(),
            slides: state.slides(),
            layers: state.layers().iter().cloned().collect(),
            selection: state.selection().to_vec(),
            images: images.clone(),
        });
        self.view = state.view();
        self.paints.clear();
        tracing::debug!(layers = state.layers().len(), "canvas attached to cpu surface");
    }

    /// Drop attached content; the surface reports not ready afterwards.
    pub fn detach(&mut self) {
        self.attached = None;
        self.paints.clear();
    }

    /// Rasterize `region` (screen space) into premultiplied RGBA8 pixels.
    pub fn render_premul(
        &mut self,
        region: Rect,
        pixel_ratio: f64,
    ) -> CarouselResult<(u32, u32, Vec<u8>)> {
        let opts = SnapshotOpts::default().with_pixel_ratio(pixel_ratio);
        let (w, h) = opts.output_size(region)?;

        let Self {
            opts: surface_opts,
            attached,
            view,
            hidden,
            text_engine,
            font,
            paints,
        } = self;
        let attached = attached
            .as_ref()
            .ok_or_else(|| CarouselError::render("no canvas attached to surface"))?;

        // Bounds were checked by `output_size`.
        let mut ctx = vello_cpu::RenderContext::new(w as u16, h as u16);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        if let Some([r, g, b, a]) = surface_opts.clear_rgba {
            fill(
                &mut ctx,
                Affine::IDENTITY,
                Rect::new(0.0, 0.0, f64::from(w), f64::from(h)),
                0.0,
                Color::rgba(r, g, b, a),
            );
        }

        let base = Affine::scale(pixel_ratio)
            * Affine::translate((-region.x0, -region.y0))
            * view.to_affine();
        fill(
            &mut ctx,
            base,
            Rect::new(
                0.0,
                0.0,
                attached.slides.total_width(),
                attached.slides.slide_height(),
            ),
            0.0,
            attached.background,
        );

        for layer in &attached.layers {
            let tr = base * layer_affine(layer);
            match &layer.kind {
                LayerKind::Image(img) => {
                    draw_image_frame(&mut ctx, tr, img, &attached.images, paints)?
                }
                LayerKind::Shape(shape) => draw_shape(&mut ctx, tr, shape),
                LayerKind::Text(text) => {
                    draw_text(&mut ctx, tr, text, text_engine, font.as_ref())?;
                }
            }
        }

        if !hidden.contains(TRANSFORMER_NODE) {
            let stroke = SELECTION_WIDTH_PX / view.zoom;
            for id in &attached.selection {
                let Some(layer) = attached.layers.iter().find(|l| &l.id == id) else {
                    continue;
                };
                let Some(local) = local_bounds(layer, text_engine) else {
                    continue;
                };
                let tr = base * layer_affine(layer);
                let sx = layer.scale_x.abs().max(f64::EPSILON);
                for strip in outline_strips(local, stroke / sx) {
                    fill(&mut ctx, tr, strip, 0.0, SELECTION_COLOR);
                }
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w as u16, h as u16);
        ctx.render_to_pixmap(&mut pixmap);
        Ok((w, h, pixmap.data_as_u8_slice().to_vec()))
    }
}

impl RenderSurface for CpuSurface {
    fn is_ready(&self) -> bool {
        self.attached.is_some()
    }

    fn view(&self) -> ViewTransform {
        self.view
    }

    fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    fn node_visible(&self, name: &str) -> bool {
        !self.hidden.contains(name)
    }

    fn set_node_visible(&mut self, name: &str, visible: bool) {
        if visible {
            self.hidden.remove(name);
        } else {
            self.hidden.insert(name.to_owned());
        }
    }

    fn snapshot(&mut self, region: Rect, opts: &SnapshotOpts) -> CarouselResult<EncodedImage> {
        opts.validate()?;
        let (width, height, premul) = self.render_premul(region, opts.pixel_ratio)?;
        let bytes = encode_premul(&premul, width, height, opts)?;
        Ok(EncodedImage {
            encoding: opts.encoding,
            width,
            height,
            bytes,
        })
    }
}

/// Encode premultiplied RGBA8. JPEG drops alpha, which composites over black.
fn encode_premul(
    premul: &[u8],
    width: u32,
    height: u32,
    opts: &SnapshotOpts,
) -> CarouselResult<Vec<u8>> {
    let mut buf = Vec::new();
    match opts.encoding {
        ImageEncoding::Jpeg => {
            let rgb: Vec<u8> = premul
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let quality = (opts.quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            encoder
                .encode(&rgb, width, height, image::ExtendedColorType::Rgb8)
                .context("encode jpeg snapshot")?;
        }
        ImageEncoding::Png => {
            let mut rgba = premul.to_vec();
            unpremultiply_rgba8_in_place(&mut rgba);
            let img = image::RgbaImage::from_raw(width, height, rgba)
                .ok_or_else(|| CarouselError::encode("snapshot buffer size mismatch"))?;
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .context("encode png snapshot")?;
        }
    }
    Ok(buf)
}

/// Position, then rotation about the position, then handle scale.
fn layer_affine(layer: &Layer) -> Affine {
    Affine::translate((layer.x, layer.y))
        * Affine::rotate(layer.rotation.to_radians())
        * Affine::scale_non_uniform(layer.scale_x, layer.scale_y)
}

/// Unscaled layer-local bounds used for the selection outline.
fn local_bounds(layer: &Layer, text_engine: &mut TextLayoutEngine) -> Option<Rect> {
    match &layer.kind {
        LayerKind::Image(img) => Some(Rect::new(0.0, 0.0, img.width, img.height)),
        LayerKind::Shape(s) => Some(shape_rect(s)),
        LayerKind::Text(t) => {
            if !text_engine.has_font() {
                return t.width.map(|w| Rect::new(0.0, 0.0, w, t.font_size));
            }
            let layout = layout_text(t, text_engine).ok()?;
            let w = t.width.unwrap_or(f64::from(layout.width()));
            Some(Rect::new(0.0, 0.0, w, f64::from(layout.height())))
        }
    }
}

fn shape_rect(s: &ShapeLayer) -> Rect {
    match s.shape {
        ShapeKind::Rect => Rect::new(0.0, 0.0, s.width, s.height),
        ShapeKind::Circle => {
            let r = s.width / 2.0;
            Rect::new(-r, -r, r, r)
        }
    }
}

fn draw_shape(ctx: &mut vello_cpu::RenderContext, tr: Affine, s: &ShapeLayer) {
    match s.shape {
        ShapeKind::Rect => fill(ctx, tr, shape_rect(s), 0.0, s.fill),
        ShapeKind::Circle => {
            ctx.set_transform(affine_to_cpu(tr));
            ctx.set_paint(cpu_color(s.fill));
            let circle = vello_cpu::kurbo::Circle::new((0.0, 0.0), s.width / 2.0);
            ctx.fill_path(&circle.to_path(PATH_TOLERANCE));
        }
    }
}

fn draw_image_frame(
    ctx: &mut vello_cpu::RenderContext,
    tr: Affine,
    img: &ImageLayer,
    images: &ImageStore,
    paints: &mut HashMap<String, vello_cpu::Image>,
) -> CarouselResult<()> {
    let frame = Rect::new(0.0, 0.0, img.width, img.height);
    let area = img.image_area();
    let radius = match img.variant {
        FrameVariant::Polaroid => 0.0,
        FrameVariant::Default | FrameVariant::Vintage => img.corner_radius,
    };

    if img.variant == FrameVariant::Polaroid {
        let (dx, dy) = POLAROID_SHADOW_OFFSET;
        fill(ctx, tr, frame + Vec2::new(dx, dy), 0.0, POLAROID_SHADOW);
        fill(ctx, tr, frame, 0.0, Color::WHITE);
    }

    if area.width() <= 0.0 || area.height() <= 0.0 {
        tracing::debug!(variant = ?img.variant, "image area collapsed by padding; frame only");
        return Ok(());
    }

    fill(ctx, tr, area, radius, img.fill);

    let decoded = img.source.as_deref().and_then(|src| images.get(src).map(|d| (src, d)));
    if let Some((src, decoded)) = decoded
        && let Some(crop) = crop_for_image(Some(decoded.size()), area.size(), img.crop)?
    {
        let paint = image_paint_for(paints, src, decoded)?;
        let opacity = match img.variant {
            FrameVariant::Vintage => VINTAGE_IMAGE_OPACITY,
            FrameVariant::Default | FrameVariant::Polaroid => 1.0,
        };
        draw_cropped(ctx, tr, area, &crop, radius, paint, opacity);
    } else if let Some(src) = &img.source {
        tracing::debug!(source = %src, "image not decoded yet; drawing placeholder");
    }

    if img.variant == FrameVariant::Vintage {
        fill(ctx, tr, area, radius, VINTAGE_OVERLAY);
        for strip in outline_strips(frame, VINTAGE_BORDER_WIDTH) {
            fill(ctx, tr, strip, 0.0, VINTAGE_BORDER);
        }
    }
    Ok(())
}

/// Map the crop window of the source image onto `area`. The paint lives in image pixel space, so
/// the geometry is expressed there too.
fn draw_cropped(
    ctx: &mut vello_cpu::RenderContext,
    tr: Affine,
    area: Rect,
    crop: &CropRect,
    radius: f64,
    paint: vello_cpu::Image,
    opacity: f32,
) {
    let sx = area.width() / crop.width;
    let sy = area.height() / crop.height;
    let to_area = tr
        * Affine::translate((area.x0, area.y0))
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate((-crop.x, -crop.y));

    ctx.set_transform(affine_to_cpu(to_area));
    ctx.set_paint(paint);
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    let window = rect_to_cpu(crop.to_rect());
    if radius > 0.0 {
        let rounded = vello_cpu::kurbo::RoundedRect::from_rect(window, radius / sx);
        ctx.fill_path(&rounded.to_path(PATH_TOLERANCE));
    } else {
        ctx.fill_rect(&window);
    }
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn layout_text(
    t: &TextLayer,
    text_engine: &mut TextLayoutEngine,
) -> CarouselResult<parley::Layout<TextBrushRgba8>> {
    let brush = TextBrushRgba8 {
        r: t.fill.r,
        g: t.fill.g,
        b: t.fill.b,
        a: t.fill.a,
    };
    let face = TextFace {
        family: Some(t.font_family.as_str()),
        bold: t.font_style.is_bold(),
        italic: t.font_style.is_italic(),
    };
    text_engine.layout_plain(
        &t.text,
        t.font_size as f32,
        face,
        brush,
        t.width.map(|w| w as f32),
    )
}

fn draw_text(
    ctx: &mut vello_cpu::RenderContext,
    tr: Affine,
    t: &TextLayer,
    text_engine: &mut TextLayoutEngine,
    font: Option<&vello_cpu::peniko::FontData>,
) -> CarouselResult<()> {
    let Some(font) = font else {
        tracing::debug!("no font registered; text layer skipped");
        return Ok(());
    };
    let layout = layout_text(t, text_engine)?;
    let box_width = t.width.map(|w| w as f32).unwrap_or(layout.width());
    let size = t.font_size;

    for line in layout.lines() {
        let metrics = line.metrics();
        let offset = match t.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (box_width - metrics.advance) / 2.0,
            TextAlign::Right => box_width - metrics.advance,
        };
        let offset = f64::from(offset.max(0.0));
        let line_tr = tr * Affine::translate((offset, 0.0));

        ctx.set_transform(affine_to_cpu(line_tr));
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }

        let baseline = f64::from(metrics.baseline);
        let thickness = (size / 16.0).max(1.0);
        let advance = f64::from(metrics.advance);
        let deco_y = match t.decoration {
            TextDecoration::None => None,
            TextDecoration::Underline => Some(baseline + size * 0.1),
            TextDecoration::LineThrough => Some(baseline - size * 0.3),
        };
        if let Some(y) = deco_y {
            fill(
                ctx,
                line_tr,
                Rect::new(0.0, y, advance, y + thickness),
                0.0,
                t.fill,
            );
        }
    }
    Ok(())
}

fn image_paint_for(
    paints: &mut HashMap<String, vello_cpu::Image>,
    key: &str,
    decoded: &DecodedImage,
) -> CarouselResult<vello_cpu::Image> {
    if let Some(p) = paints.get(key) {
        return Ok(p.clone());
    }
    let pixmap = pixmap_from_premul_bytes(&decoded.rgba8_premul, decoded.width, decoded.height)?;
    let paint = vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    };
    paints.insert(key.to_owned(), paint.clone());
    Ok(paint)
}

/// Four strips of `width` centered on the edges of `rect`.
fn outline_strips(rect: Rect, width: f64) -> [Rect; 4] {
    let h = width / 2.0;
    [
        Rect::new(rect.x0 - h, rect.y0 - h, rect.x1 + h, rect.y0 + h),
        Rect::new(rect.x0 - h, rect.y1 - h, rect.x1 + h, rect.y1 + h),
        Rect::new(rect.x0 - h, rect.y0 + h, rect.x0 + h, rect.y1 - h),
        Rect::new(rect.x1 - h, rect.y0 + h, rect.x1 + h, rect.y1 - h),
    ]
}

fn fill(ctx: &mut vello_cpu::RenderContext, tr: Affine, rect: Rect, radius: f64, color: Color) {
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(cpu_color(color));
    let r = rect_to_cpu(rect);
    if radius > 0.0 {
        let rounded = vello_cpu::kurbo::RoundedRect::from_rect(r, radius);
        ctx.fill_path(&rounded.to_path(PATH_TOLERANCE));
    } else {
        ctx.fill_rect(&r);
    }
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CarouselResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CarouselError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CarouselError::render("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CarouselError::render("image byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
