use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::math::{luminance, unpremultiply};

/// Preview height the overlay sizes were tuned against.
pub const DEFAULT_PREVIEW_HEIGHT: f64 = 830.0;

/// Brightness reported when nothing could be sampled.
pub const NEUTRAL_BRIGHTNESS: f64 = 128.0;

const SAMPLE_MAX_WIDTH: f64 = 200.0;
const SAMPLE_WIDTH_FRACTION: f64 = 0.3;
const SAMPLE_HEIGHT: f64 = 50.0;
const SAMPLE_BOTTOM_GAP: f64 = 10.0;

/// Bottom-center band behind the logo and timestamp.
pub fn sample_region(width: f64, height: f64) -> Rect {
    let w = SAMPLE_MAX_WIDTH.min(SAMPLE_WIDTH_FRACTION * width).max(0.0);
    let x0 = (width - w) / 2.0;
    let y0 = (height - SAMPLE_HEIGHT - SAMPLE_BOTTOM_GAP).max(0.0);
    let y1 = (y0 + SAMPLE_HEIGHT).min(height.max(0.0));
    Rect::new(x0, y0, x0 + w, y1)
}

/// Mean luminance over the non-transparent pixels of `region`.
///
/// Falls back to [`NEUTRAL_BRIGHTNESS`] for empty regions, fully transparent regions or a
/// malformed buffer.
pub fn sample_brightness(rgba_premul: &[u8], width: u32, height: u32, region: Rect) -> f64 {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba_premul.len() != expected {
        return NEUTRAL_BRIGHTNESS;
    }
    let clamp = |v: f64, max: u32| -> u32 {
        if v.is_nan() {
            return 0;
        }
        v.clamp(0.0, f64::from(max)) as u32
    };
    let x0 = clamp(region.x0.floor(), width);
    let y0 = clamp(region.y0.floor(), height);
    let x1 = clamp(region.x1.floor(), width);
    let y1 = clamp(region.y1.floor(), height);

    let mut sum = 0.0;
    let mut count = 0u64;
    for y in y0..y1 {
        let row = (y as usize) * (width as usize) * 4;
        for x in x0..x1 {
            let i = row + (x as usize) * 4;
            let px = [
                rgba_premul[i],
                rgba_premul[i + 1],
                rgba_premul[i + 2],
                rgba_premul[i + 3],
            ];
            if px[3] == 0 {
                continue;
            }
            let [r, g, b, _] = unpremultiply(px);
            sum += luminance(r, g, b);
            count += 1;
        }
    }

    if count == 0 {
        return NEUTRAL_BRIGHTNESS;
    }
    sum / count as f64
}

/// Fill and outline colors for overlay text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextPalette {
    pub fill: Rgba8,
    pub outline: Rgba8,
}

impl TextPalette {
    pub const LIGHT_ON_DARK: Self = Self {
        fill: Rgba8::WHITE,
        outline: Rgba8::BLACK,
    };
    pub const DARK_ON_LIGHT: Self = Self {
        fill: Rgba8::BLACK,
        outline: Rgba8::WHITE,
    };
}

pub fn text_color_for(brightness: f64) -> TextPalette {
    if brightness < 128.0 {
        TextPalette::LIGHT_ON_DARK
    } else {
        TextPalette::DARK_ON_LIGHT
    }
}

/// Per-glyph pen positions for a letter-spaced run, relative to the run start.
#[derive(Clone, Debug, PartialEq)]
pub struct LetterSpacedRun {
    pub offsets: Vec<f64>,
    pub total_width: f64,
}

/// Spacing is inserted between glyphs only, never after the last one.
pub fn layout_letter_spaced(advances: &[f64], spacing: f64) -> LetterSpacedRun {
    let mut offsets = Vec::with_capacity(advances.len());
    let mut pen = 0.0;
    for (i, adv) in advances.iter().enumerate() {
        if i > 0 {
            pen += spacing;
        }
        offsets.push(pen);
        pen += adv;
    }
    LetterSpacedRun {
        offsets,
        total_width: pen,
    }
}

/// Overlay sizes and anchors for one output surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayMetrics {
    /// Output height over preview height.
    pub scale: f64,
    pub logo_font_px: f64,
    pub logo_letter_spacing: f64,
    pub logo_baseline: f64,
    pub timestamp_font_px: f64,
}

impl OverlayMetrics {
    pub fn for_output(height: f64, preview_height: f64) -> Self {
        let preview = if preview_height.is_finite() && preview_height > 0.0 {
            preview_height
        } else {
            DEFAULT_PREVIEW_HEIGHT
        };
        let scale = height / preview;
        let logo_font_px = 12.0 * scale;
        Self {
            scale,
            logo_font_px,
            logo_letter_spacing: 0.0625 * logo_font_px,
            logo_baseline: height - 15.0 * scale,
            timestamp_font_px: 8.8 * scale,
        }
    }

    pub fn logo_outline_width(&self) -> f64 {
        outline_width(self.logo_font_px)
    }

    pub fn timestamp_outline_width(&self) -> f64 {
        outline_width(self.timestamp_font_px)
    }

    /// The timestamp sits one line below the logo when both are shown.
    pub fn timestamp_baseline(&self, logo_shown: bool) -> f64 {
        if logo_shown {
            self.logo_baseline + 1.2 * self.timestamp_font_px
        } else {
            self.logo_baseline
        }
    }
}

pub fn outline_width(font_px: f64) -> f64 {
    (0.05 * font_px).max(1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/metrics.rs"]
mod tests;
