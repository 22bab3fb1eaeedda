//! Archive sinks.
//!
//! Sinks receive encoded slides in slide order and package them under sequential names.

/// Archive sink trait and built-in sinks.
pub mod archive;
