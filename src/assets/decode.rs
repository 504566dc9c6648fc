use std::sync::Arc;

use anyhow::Context;

use crate::assets::source::looks_like_svg;
use crate::foundation::core::PixelSize;
use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded raster ready for drawing: premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn from_rgba_image(rgba: image::RgbaImage) -> Self {
        let (width, height) = rgba.dimensions();
        let mut rgba8_premul = rgba.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> BoothResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(PreparedImage::from_rgba_image(dyn_img.to_rgba8()))
}

/// Parse SVG bytes into a `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> BoothResult<Arc<usvg::Tree>> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(Arc::new(tree))
}

/// Decode raster bytes, or rasterize SVG bytes at `svg_size` (natural size when `None`).
pub fn decode_any(bytes: &[u8], svg_hint: bool, svg_size: Option<PixelSize>) -> BoothResult<PreparedImage> {
    if !(svg_hint || looks_like_svg(bytes)) {
        return decode_image(bytes);
    }
    let tree = parse_svg(bytes)?;
    let size = match svg_size {
        Some(s) => s,
        None => {
            let s = tree.size();
            let w = s.width().ceil();
            let h = s.height().ceil();
            if !w.is_finite() || !h.is_finite() || w < 1.0 || h < 1.0 {
                return Err(BoothError::validation("svg has invalid width/height"));
            }
            PixelSize::new(w as u32, h as u32)?
        }
    };
    crate::assets::svg_raster::rasterize_svg(&tree, size)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
