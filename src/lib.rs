//! Carousel is the editing and export core of a multi-slide image carousel designer.
//!
//! A carousel is a horizontal strip of equally sized slides sharing one canvas. Layers (image
//! frames, text and shapes) may straddle slide boundaries; export cuts the strip back into
//! per-slide images.
//!
//! - Edit a [`CanvasState`]: layers, z-order, selection, templates and the stage view
//! - Attach it to a [`RenderSurface`] such as [`CpuSurface`]
//! - Rasterize with [`render_slides`] and package into an [`ArchiveSink`] via [`export_carousel`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

/// Encoding sinks for exported slides.
pub mod encode;
/// Crop math and stage view transforms.
pub mod geometry;
/// Slide rasterization and render surfaces.
pub mod render;
/// Canvas document model.
pub mod scene;
/// Export and preview entry points.
pub mod session;

pub use crate::foundation::core::{
    Affine, CROP_WHEEL_STEP, CROP_ZOOM_MAX, CROP_ZOOM_MIN, DROP_MAX_SIZE, EXPORT_JPEG_QUALITY,
    EXPORT_PIXEL_RATIO, LayerId, MIN_FRAME_SIZE, Point, Rect, SLIDE_WIDTH, STAGE_WHEEL_STEP,
    STAGE_ZOOM_MAX, STAGE_ZOOM_MIN, Size, SlideAspect, SlideGrid, Vec2,
};
pub use crate::foundation::error::{CarouselError, CarouselResult};

pub use crate::assets::color::Color;
pub use crate::assets::decode::{DecodedImage, decode_image, fit_within};
pub use crate::assets::store::ImageStore;
pub use crate::encode::archive::{ArchiveSink, DirArchive, InMemoryArchive};
pub use crate::geometry::crop::{CropRect, CropState, compute_crop};
pub use crate::geometry::view::ViewTransform;
pub use crate::render::cpu::{CpuSurface, CpuSurfaceOpts};
pub use crate::render::rasterize::render_slides;
pub use crate::render::surface::{EncodedImage, ImageEncoding, RenderSurface, SnapshotOpts};
pub use crate::scene::canvas::CanvasState;
pub use crate::scene::layer::{
    FrameVariant, ImageLayer, Layer, LayerKind, LayerPatch, ShapeKind, ShapeLayer, TextLayer,
};
pub use crate::scene::stack::{LayerStack, ZMove};
pub use crate::scene::template::{LAYOUT_TEMPLATES, LayoutTemplate, find_template};
pub use crate::session::export::{ExportOpts, ExportStats, export_carousel, preview_carousel};
