//! Asset loading: base garment images, uploaded rasters and fonts.

/// Raster/SVG decoding into premultiplied pixels.
pub mod decode;
/// Font lookup and text shaping.
pub mod fonts;
/// Asset sources for base garment images.
pub mod loader;
/// SVG rasterization helpers.
pub mod svg_raster;
