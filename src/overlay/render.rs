use std::sync::Arc;

use crate::foundation::error::{BoothError, BoothResult};
use crate::overlay::metrics::{TextPalette, layout_letter_spaced};
use crate::overlay::text::TextLayoutEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Logo,
    Timestamp,
}

/// A text element to place on the composite, in output pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySpec {
    pub kind: OverlayKind,
    pub text: String,
    pub font_px: f64,
    /// Extra space between glyphs; zero for plain runs.
    pub letter_spacing: f64,
    pub baseline: f64,
    pub outline_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

/// Glyphs ready to paint, stroke first then fill.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedText {
    pub kind: OverlayKind,
    pub font_px: f64,
    pub outline_width: f64,
    pub palette: TextPalette,
    pub glyphs: Vec<PositionedGlyph>,
    pub width: f64,
}

/// What happened to one overlay element during a composite.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OverlayOutcome {
    Drawn {
        kind: OverlayKind,
        palette: TextPalette,
    },
    Skipped {
        kind: OverlayKind,
        reason: String,
    },
}

impl OverlayOutcome {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::Drawn { kind, .. } | Self::Skipped { kind, .. } => *kind,
        }
    }

    pub fn palette(&self) -> Option<TextPalette> {
        match self {
            Self::Drawn { palette, .. } => Some(*palette),
            Self::Skipped { .. } => None,
        }
    }
}

/// Shapes overlay strings and centers them on the surface.
pub struct OverlayRenderer {
    engine: TextLayoutEngine,
    font: Option<Arc<Vec<u8>>>,
}

impl OverlayRenderer {
    pub fn new(font: Option<Arc<Vec<u8>>>) -> Self {
        Self {
            engine: TextLayoutEngine::new(),
            font,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn position(
        &mut self,
        spec: &OverlaySpec,
        palette: TextPalette,
        surface_width: f64,
    ) -> BoothResult<PositionedText> {
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| BoothError::overlay("no overlay font configured"))?;
        if !spec.font_px.is_finite() || spec.font_px <= 0.0 {
            return Err(BoothError::overlay(format!(
                "invalid overlay font size {}",
                spec.font_px
            )));
        }

        // Letter-spaced runs are measured glyph by glyph.
        let shaped = if spec.letter_spacing != 0.0 {
            self.engine
                .shape_chars(&spec.text, font.as_slice(), spec.font_px as f32)?
        } else {
            self.engine
                .shape_line(&spec.text, font.as_slice(), spec.font_px as f32)?
        };
        let advances: Vec<f64> = shaped.iter().map(|g| g.advance).collect();
        let run = layout_letter_spaced(&advances, spec.letter_spacing);
        let x0 = (surface_width - run.total_width) / 2.0;

        let glyphs = shaped
            .iter()
            .zip(&run.offsets)
            .map(|(g, off)| PositionedGlyph {
                id: g.id,
                x: x0 + off,
                y: spec.baseline,
            })
            .collect();

        Ok(PositionedText {
            kind: spec.kind,
            font_px: spec.font_px,
            outline_width: spec.outline_width,
            palette,
            glyphs,
            width: run.total_width,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/render.rs"]
mod tests;
