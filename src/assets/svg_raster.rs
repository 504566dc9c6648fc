use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::foundation::core::PixelSize;
use crate::foundation::error::{BoothError, BoothResult};

const MAX_DIM: u32 = 16_384;

/// Rasterize `tree` stretched to exactly `size` (frame art covers the whole composite).
pub fn rasterize_svg(tree: &usvg::Tree, size: PixelSize) -> BoothResult<PreparedImage> {
    if size.width > MAX_DIM || size.height > MAX_DIM {
        return Err(BoothError::validation(format!(
            "svg raster size too large: {}x{} (max {MAX_DIM}x{MAX_DIM})",
            size.width, size.height
        )));
    }
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width, size.height)
        .ok_or_else(|| BoothError::validation("failed to allocate svg pixmap"))?;

    let tree_size = tree.size();
    let sx = (size.width as f32) / tree_size.width();
    let sy = (size.height as f32) / tree_size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width: size.width,
        height: size.height,
        rgba8_premul: Arc::new(pixmap.take()),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
