//! Rendering: the surface boundary, the CPU reference surface and the slide rasterizer.

/// CPU raster surface powered by `vello_cpu`.
pub mod cpu;
/// Slide-by-slide capture with view save/restore.
pub mod rasterize;
/// Render surface trait and snapshot options.
pub mod surface;
