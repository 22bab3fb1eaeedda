/// Straight-alpha colors and hex parsing.
pub mod color;
/// Image decoding and size fitting.
pub mod decode;
/// Decoded image store and text layout.
pub mod store;
