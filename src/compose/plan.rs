use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::assets::loader::DEFAULT_LOAD_TIMEOUT;
use crate::assets::source::ImageSource;
use crate::compose::customize::CustomizationState;
use crate::compose::filter::Filter;
use crate::encode::raster::COMPOSITE_JPEG_QUALITY;
use crate::foundation::core::{PixelSize, Rect, Rgba8};
use crate::foundation::error::{BoothError, BoothResult};
use crate::layout::geometry::frame_rect;
use crate::layout::registry::LayoutConfig;
use crate::overlay::metrics::{DEFAULT_PREVIEW_HEIGHT, OverlayMetrics, outline_width};
use crate::overlay::render::{OverlayKind, OverlaySpec};

/// Knobs for one composite.
#[derive(Clone, Debug)]
pub struct ComposeOpts {
    /// Output multiplier over the layout's print size.
    pub scale: f64,
    /// Preview height the overlay sizes are relative to.
    pub preview_height: f64,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// Per-image load deadline.
    pub load_timeout: Duration,
    /// Border width at scale 1.
    pub border_width: f64,
    pub border_color: Rgba8,
    /// Surface fill behind the photos.
    pub background: Rgba8,
    /// Font used for logo and timestamp; overlays are skipped without one.
    pub font: Option<Arc<Vec<u8>>>,
    /// Zone used to print the timestamp; local time when unset.
    pub utc_offset: Option<FixedOffset>,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            scale: 1.0,
            preview_height: DEFAULT_PREVIEW_HEIGHT,
            jpeg_quality: COMPOSITE_JPEG_QUALITY,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            border_width: 7.0,
            border_color: Rgba8::BLACK,
            background: Rgba8::WHITE,
            font: None,
            utc_offset: None,
        }
    }
}

/// What goes on top of the photos.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoration {
    /// Stretched over the whole surface.
    FrameArt(ImageSource),
    /// Stroked rectangle inset by half its width.
    Border {
        /// Stroke centerline, in output pixels.
        rect: Rect,
        /// Stroke width, in output pixels.
        width: f64,
        color: Rgba8,
    },
}

/// Backend-agnostic description of one composite.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePlan {
    /// Layout the plan was built from.
    pub layout_id: String,
    /// Output surface size, already scaled.
    pub size: PixelSize,
    /// Surface fill, drawn first.
    pub background: Rgba8,
    /// Destination rectangle per slot, in slot order.
    pub slots: Vec<Rect>,
    pub decoration: Decoration,
    /// Logo first, then timestamp.
    pub overlays: Vec<OverlaySpec>,
    /// Applied to the whole raster before encoding.
    pub filter: Filter,
    /// Quality for the final JPEG.
    pub jpeg_quality: u8,
}

/// Resolve slot rectangles, decoration and overlays for one composite.
///
/// Fails on an invalid layout, a bad scale or border width, or a scaled size out of range.
pub fn plan_composite(
    layout: &LayoutConfig,
    custom: &CustomizationState,
    captured_at: Option<DateTime<Utc>>,
    opts: &ComposeOpts,
) -> BoothResult<CompositePlan> {
    layout.validate()?;
    let size = layout.output_pixels()?.scaled(opts.scale)?;
    let (w, h) = (f64::from(size.width), f64::from(size.height));

    let slots = (0..layout.frame_count)
        .map(|i| frame_rect(layout, i, w, h))
        .collect::<BoothResult<Vec<_>>>()?;

    let decoration = match &custom.frame_art {
        Some(src) => Decoration::FrameArt(src.clone()),
        None => {
            let width = opts.border_width * opts.scale;
            if !width.is_finite() || width < 0.0 {
                return Err(BoothError::validation("border width must be finite and >= 0"));
            }
            let half = width / 2.0;
            Decoration::Border {
                rect: Rect::new(half, half, w - half, h - half),
                width,
                color: opts.border_color,
            }
        }
    };

    let metrics = OverlayMetrics::for_output(h, opts.preview_height);
    let mut overlays = Vec::new();
    if custom.show_logo {
        overlays.push(OverlaySpec {
            kind: OverlayKind::Logo,
            text: custom.logo_language.logo_text(),
            font_px: metrics.logo_font_px,
            letter_spacing: metrics.logo_letter_spacing,
            baseline: metrics.logo_baseline,
            outline_width: metrics.logo_outline_width(),
        });
    }
    if custom.show_timestamp {
        let at = captured_at.unwrap_or_else(Utc::now);
        let text = match opts.utc_offset {
            Some(offset) => custom.timestamp_format.format(&at.with_timezone(&offset)),
            None => custom.timestamp_format.format(&at.with_timezone(&Local)),
        };
        overlays.push(OverlaySpec {
            kind: OverlayKind::Timestamp,
            text,
            font_px: metrics.timestamp_font_px,
            letter_spacing: 0.0,
            baseline: metrics.timestamp_baseline(custom.show_logo),
            outline_width: outline_width(metrics.timestamp_font_px),
        });
    }

    Ok(CompositePlan {
        layout_id: layout.id.clone(),
        size,
        background: opts.background,
        slots,
        decoration,
        overlays,
        filter: custom.filter,
        jpeg_quality: opts.jpeg_quality,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
