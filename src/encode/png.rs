use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{StudioError, StudioResult};
use crate::render::raster::RasterImage;

/// Flatten a rendered design into a lossless PNG with straight alpha.
pub fn flatten(raster: &RasterImage) -> StudioResult<Vec<u8>> {
    let expected = (raster.width as usize)
        .saturating_mul(raster.height as usize)
        .saturating_mul(4);
    if raster.width == 0 || raster.height == 0 || raster.data.len() != expected {
        return Err(StudioError::validation(format!(
            "raster {}x{} has {} bytes, expected {expected}",
            raster.width,
            raster.height,
            raster.data.len()
        )));
    }

    let img = image::RgbaImage::from_raw(raster.width, raster.height, raster.to_straight_rgba())
        .ok_or_else(|| StudioError::validation("raster buffer does not match its size"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
