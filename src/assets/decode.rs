use std::sync::Arc;

use crate::foundation::core::Canvas;
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Parsed SVG document.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    /// Parsed SVG tree.
    pub tree: Arc<usvg::Tree>,
}

/// Decode encoded image bytes (PNG/JPEG/...) and convert to premultiplied RGBA8.
///
/// Every failure is reported as [`StudioError::LayerDecode`].
pub fn decode_image(bytes: &[u8]) -> StudioResult<PreparedImage> {
    if bytes.is_empty() {
        return Err(StudioError::layer_decode("image payload is empty"));
    }
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| StudioError::layer_decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StudioError::layer_decode("image has zero width or height"));
    }
    if width > Canvas::MAX_DIM || height > Canvas::MAX_DIM {
        return Err(StudioError::layer_decode(format!(
            "image {width}x{height} exceeds {max}x{max}",
            max = Canvas::MAX_DIM
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes into a prepared `usvg` tree, using `fontdb` for any `<text>` nodes.
pub fn parse_svg(
    bytes: &[u8],
    fontdb: Option<Arc<usvg::fontdb::Database>>,
) -> StudioResult<PreparedSvg> {
    let mut opts = usvg::Options::default();
    if let Some(db) = fontdb {
        opts.fontdb = db;
    }
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| StudioError::layer_decode(format!("parse svg tree: {e}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// `true` when `bytes` look like an SVG document rather than a binary raster.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
