//! Editable scene: layers, their z-order, layout templates and the session store.

/// Editing session state and its operations.
pub mod canvas;
/// Layer model and attribute patches.
pub mod layer;
/// Ordered layer sequence.
pub mod stack;
/// Built-in slide layouts.
pub mod template;
