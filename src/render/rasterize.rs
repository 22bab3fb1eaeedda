use crate::foundation::core::SlideGrid;
use crate::foundation::error::CarouselResult;
use crate::geometry::view::ViewTransform;
use crate::render::surface::{EncodedImage, RenderSurface, SnapshotOpts, TRANSFORMER_NODE};

/// Capture every slide of `grid` from `surface`, in slide order.
///
/// The surface's view and transformer visibility are saved, the transformer is hidden and the
/// view reset to identity so that slide `i` occupies `[i * 1080, (i + 1) * 1080) x [0, height)`
/// in screen space. Both are restored before returning, whether capture succeeded, failed or was
/// skipped. A surface that is not ready yields an empty list.
#[tracing::instrument(skip(surface, opts), fields(slides = grid.count))]
pub fn render_slides<S: RenderSurface + ?Sized>(
    surface: &mut S,
    grid: SlideGrid,
    opts: &SnapshotOpts,
) -> CarouselResult<Vec<EncodedImage>> {
    let saved_view = surface.view();
    let saved_transformer = surface.node_visible(TRANSFORMER_NODE);

    surface.set_node_visible(TRANSFORMER_NODE, false);
    surface.set_view(ViewTransform::IDENTITY);

    let out = capture_all(surface, grid, opts);

    surface.set_view(saved_view);
    surface.set_node_visible(TRANSFORMER_NODE, saved_transformer);

    if let Err(e) = &out {
        tracing::warn!(error = %e, "slide capture failed; view restored");
    }
    out
}

fn capture_all<S: RenderSurface + ?Sized>(
    surface: &mut S,
    grid: SlideGrid,
    opts: &SnapshotOpts,
) -> CarouselResult<Vec<EncodedImage>> {
    if !surface.is_ready() {
        tracing::debug!("render surface not ready; nothing captured");
        return Ok(Vec::new());
    }
    opts.validate()?;

    let mut out = Vec::with_capacity(grid.count as usize);
    for i in 0..grid.count {
        let region = grid.slide_bounds(i);
        let image = surface.snapshot(region, opts)?;
        tracing::debug!(
            slide = i,
            width = image.width,
            height = image.height,
            bytes = image.bytes.len(),
            "slide captured"
        );
        out.push(image);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/rasterize.rs"]
mod tests;
