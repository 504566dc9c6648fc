//! Still-image encoders for composites, captures and crop intermediates.

/// JPEG/PNG encoding from premultiplied or straight RGBA8.
pub mod raster;
