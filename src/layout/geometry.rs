use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{BoothError, BoothResult};
use crate::layout::registry::{Arrangement, LayoutConfig, StripAxis};

/// Pixel rectangle occupied by frame `index` on an `out_w`×`out_h` surface.
pub fn frame_rect(layout: &LayoutConfig, index: usize, out_w: f64, out_h: f64) -> BoothResult<Rect> {
    let n = layout.frame_count;
    if index >= n {
        return Err(BoothError::IndexOutOfRange { index, len: n });
    }
    if !out_w.is_finite() || !out_h.is_finite() || out_w <= 0.0 || out_h <= 0.0 {
        return Err(BoothError::validation("output size must be finite and > 0"));
    }

    match layout.arrangement {
        Arrangement::Strip => {
            let i = index as f64;
            let n = n as f64;
            Ok(match layout.strip_axis {
                StripAxis::Vertical => {
                    let band = out_h / n;
                    Rect::new(0.0, i * band, out_w, (i + 1.0) * band)
                }
                StripAxis::Horizontal => {
                    let band = out_w / n;
                    Rect::new(i * band, 0.0, (i + 1.0) * band, out_h)
                }
            })
        }
        Arrangement::Grid => {
            let (cols, rows) = grid_dims(n);
            let row = (index / cols) as f64;
            let col = (index % cols) as f64;
            let cw = out_w / cols as f64;
            let ch = out_h / rows as f64;
            Ok(Rect::new(
                col * cw,
                row * ch,
                (col + 1.0) * cw,
                (row + 1.0) * ch,
            ))
        }
        Arrangement::Absolute => {
            let slot = layout
                .slots
                .get(index)
                .ok_or_else(|| BoothError::configuration(format!(
                    "layout '{}' has no slot {index}",
                    layout.id
                )))?;
            let paper_w = layout.output_width.value();
            let paper_h = layout.output_height.value();
            let sx = out_w / paper_w;
            let sy = out_h / paper_h;
            Ok(Rect::new(
                slot.x * sx,
                slot.y * sy,
                (slot.x + slot.width) * sx,
                (slot.y + slot.height) * sy,
            ))
        }
    }
}

/// `(cols, rows)` for an `n`-frame grid.
pub fn grid_dims(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (cols, rows)
}

/// Source crop and destination rectangle for a fill-and-crop fit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverCrop {
    /// Region of the source image, in source pixels.
    pub source: Rect,
    /// Destination rectangle, in output pixels.
    pub dest: Rect,
}

impl CoverCrop {
    /// Maps source-image coordinates so that `source` lands exactly on `dest`.
    pub fn transform(&self) -> Affine {
        let sx = self.dest.width() / self.source.width();
        let sy = self.dest.height() / self.source.height();
        Affine::translate((self.dest.x0, self.dest.y0))
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate((-self.source.x0, -self.source.y0))
    }
}

pub fn cover_crop(src_w: f64, src_h: f64, dest: Rect) -> BoothResult<CoverCrop> {
    let dw = dest.width();
    let dh = dest.height();
    let ok = |v: f64| v.is_finite() && v > 0.0;
    if !ok(src_w) || !ok(src_h) || !ok(dw) || !ok(dh) {
        return Err(BoothError::validation(format!(
            "cover_crop needs positive sizes: src {src_w}x{src_h}, dest {dw}x{dh}"
        )));
    }

    let src_aspect = src_w / src_h;
    let dst_aspect = dw / dh;
    let source = if src_aspect > dst_aspect {
        let cw = src_h * dst_aspect;
        let x0 = (src_w - cw) / 2.0;
        Rect::new(x0, 0.0, x0 + cw, src_h)
    } else {
        let ch = src_w / dst_aspect;
        let y0 = (src_h - ch) / 2.0;
        Rect::new(0.0, y0, src_w, y0 + ch)
    };

    Ok(CoverCrop { source, dest })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
