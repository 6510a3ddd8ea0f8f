use crate::foundation::error::{StudioError, StudioResult};

/// Rasterize `tree` stretched to exactly `width x height`, returning premultiplied RGBA8.
///
/// Base garment artwork always fills the whole canvas, so the SVG is scaled non-uniformly to
/// the target size rather than drawn at its intrinsic size.
pub fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> StudioResult<Vec<u8>> {
    let size = tree.size();
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if !valid(size.width()) || !valid(size.height()) {
        return Err(StudioError::layer_decode("svg has invalid width/height"));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StudioError::layer_decode("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
