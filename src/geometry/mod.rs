/// Crop rectangle computation for framed images.
pub mod crop;
/// Screen, stage and slide coordinate transforms.
pub mod view;
