use super::*;
use crate::encode::archive::InMemoryArchive;
use crate::foundation::core::{Rect, SlideAspect};
use crate::foundation::error::CarouselError;
use crate::geometry::view::ViewTransform;
use crate::render::surface::{ImageEncoding, TRANSFORMER_NODE};

struct Fake {
    ready: bool,
    fonts_fail: bool,
    fonts_waited: bool,
    view: ViewTransform,
    transformer: bool,
    shots: usize,
}

impl Fake {
    fn new() -> Self {
        Self {
            ready: true,
            fonts_fail: false,
            fonts_waited: false,
            view: ViewTransform::new((40.0, -10.0).into(), 0.75).unwrap(),
            transformer: true,
            shots: 0,
        }
    }
}

impl RenderSurface for Fake {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn view(&self) -> ViewTransform {
        self.view
    }

    fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    fn node_visible(&self, name: &str) -> bool {
        name != TRANSFORMER_NODE || self.transformer
    }

    fn set_node_visible(&mut self, name: &str, visible: bool) {
        if name == TRANSFORMER_NODE {
            self.transformer = visible;
        }
    }

    fn snapshot(&mut self, region: Rect, opts: &SnapshotOpts) -> CarouselResult<EncodedImage> {
        self.shots += 1;
        Ok(EncodedImage {
            encoding: opts.encoding,
            width: region.width() as u32,
            height: region.height() as u32,
            bytes: vec![0; 10],
        })
    }

    fn fonts_ready(&mut self) -> CarouselResult<()> {
        self.fonts_waited = true;
        if self.fonts_fail {
            return Err(CarouselError::render("fonts unavailable"));
        }
        Ok(())
    }
}

#[test]
fn default_opts() {
    let opts = ExportOpts::default();
    assert_eq!(opts.archive_name, "carousel-export");
    assert_eq!(opts.snapshot, SnapshotOpts::default());
}

#[test]
fn export_packages_every_slide() {
    let mut surface = Fake::new();
    let before = surface.view;
    let mut sink = InMemoryArchive::new();

    let stats =
        export_carousel(&mut surface, SlideGrid::default(), &mut sink, &ExportOpts::default())
            .unwrap();

    assert_eq!(stats.entries, ["slide-1.jpg", "slide-2.jpg", "slide-3.jpg"]);
    assert_eq!(stats.bytes, 30);
    assert!(surface.fonts_waited);
    assert_eq!(sink.name(), Some("carousel-export"));
    assert!(sink.is_finished());
    assert_eq!(surface.view, before);
    assert!(surface.transformer);
}

#[test]
fn export_skips_unready_surface_without_opening_sink() {
    let mut surface = Fake::new();
    surface.ready = false;
    let mut sink = InMemoryArchive::new();

    let stats =
        export_carousel(&mut surface, SlideGrid::default(), &mut sink, &ExportOpts::default())
            .unwrap();

    assert!(stats.entries.is_empty());
    assert_eq!(surface.shots, 0);
    assert!(!surface.fonts_waited);
    assert_eq!(sink.name(), None);
}

#[test]
fn font_failure_aborts_before_capture() {
    let mut surface = Fake::new();
    surface.fonts_fail = true;
    let mut sink = InMemoryArchive::new();

    let err = export_carousel(&mut surface, SlideGrid::default(), &mut sink, &ExportOpts::default())
        .unwrap_err();
    assert!(err.to_string().contains("fonts unavailable"));
    assert_eq!(surface.shots, 0);
    assert_eq!(sink.name(), None);
}

#[test]
fn preview_returns_raw_images_without_font_wait() {
    let mut surface = Fake::new();
    let grid = SlideGrid::new(2, SlideAspect::Portrait).unwrap();
    let opts = SnapshotOpts::default().with_encoding(ImageEncoding::Png);

    let images = preview_carousel(&mut surface, grid, &opts).unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.iter().all(|i| i.encoding == ImageEncoding::Png));
    assert!(images.iter().all(|i| i.height == 1350));
    assert!(!surface.fonts_waited);
}
