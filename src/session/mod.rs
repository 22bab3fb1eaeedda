//! Export and preview of a carousel through an explicit render surface.

/// Export (packaged) and preview (raw) entry points.
pub mod export;
