use crate::encode::archive::{ArchiveSink, DEFAULT_ARCHIVE_NAME, package_slides};
use crate::foundation::core::SlideGrid;
use crate::foundation::error::CarouselResult;
use crate::render::rasterize::render_slides;
use crate::render::surface::{EncodedImage, RenderSurface, SnapshotOpts};

/// Options for [`export_carousel`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOpts {
    /// Capture settings shared with preview.
    pub snapshot: SnapshotOpts,
    /// Name handed to the archive sink.
    pub archive_name: String,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            snapshot: SnapshotOpts::default(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_owned(),
        }
    }
}

/// Outcome of an export.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Entry names in slide order; empty when the surface was not ready.
    pub entries: Vec<String>,
    /// Total encoded bytes across entries.
    pub bytes: u64,
}

/// Rasterize every slide and package the result into `sink`.
///
/// Fonts are confirmed loaded before any pixel is captured. A surface that is not ready is
/// skipped: nothing is captured and the sink is never opened.
#[tracing::instrument(
    skip(surface, sink, opts),
    fields(slides = grid.count, archive = %opts.archive_name)
)]
pub fn export_carousel(
    surface: &mut dyn RenderSurface,
    grid: SlideGrid,
    sink: &mut dyn ArchiveSink,
    opts: &ExportOpts,
) -> CarouselResult<ExportStats> {
    if !surface.is_ready() {
        tracing::debug!("render surface not ready; export skipped");
        return Ok(ExportStats::default());
    }
    surface.fonts_ready()?;

    let slides = render_slides(surface, grid, &opts.snapshot)?;
    if slides.is_empty() {
        return Ok(ExportStats::default());
    }
    let entries = package_slides(sink, &opts.archive_name, &slides)?;
    let bytes = slides.iter().map(|s| s.bytes.len() as u64).sum();
    tracing::info!(entries = entries.len(), bytes, "carousel exported");
    Ok(ExportStats { entries, bytes })
}

/// Rasterize every slide and hand back the encoded images unpackaged.
///
/// Shares the capture procedure with [`export_carousel`] but does not wait on fonts.
#[tracing::instrument(skip(surface, opts), fields(slides = grid.count))]
pub fn preview_carousel(
    surface: &mut dyn RenderSurface,
    grid: SlideGrid,
    opts: &SnapshotOpts,
) -> CarouselResult<Vec<EncodedImage>> {
    render_slides(surface, grid, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
