use crate::foundation::error::{BoothError, BoothResult};

/// One shaped glyph: font glyph id and horizontal advance in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    pub id: u32,
    pub advance: f64,
}

/// Stateful helper for shaping overlay strings from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    /// Font blobs already registered with `font_ctx`, keyed by their bytes.
    families: Vec<(Vec<u8>, String)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: Vec::new(),
        }
    }

    /// Shape `text` on a single unbroken line, returning glyphs in visual order.
    pub(crate) fn shape_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
    ) -> BoothResult<Vec<ShapedGlyph>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(BoothError::overlay("font size must be finite and > 0"));
        }

        let family_name = self.family_for(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let mut out = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                out.extend(run.glyphs().map(|g| ShapedGlyph {
                    id: g.id,
                    advance: f64::from(g.advance),
                }));
            }
        }

        if out.is_empty() && !text.trim().is_empty() {
            return Err(BoothError::overlay(format!("no glyphs shaped for '{text}'")));
        }
        Ok(out)
    }

    /// Shape each character on its own, so no kerning or ligatures apply between them.
    pub(crate) fn shape_chars(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
    ) -> BoothResult<Vec<ShapedGlyph>> {
        let mut out = Vec::with_capacity(text.len());
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            out.extend(self.shape_line(ch.encode_utf8(&mut buf), font_bytes, size_px)?);
        }
        Ok(out)
    }

    fn family_for(&mut self, font_bytes: &[u8]) -> BoothResult<String> {
        if let Some((_, name)) = self.families.iter().find(|(b, _)| b.as_slice() == font_bytes) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| BoothError::overlay("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BoothError::overlay("registered font family has no name"))?
            .to_string();
        tracing::debug!(family = %family_name, "registered overlay font");

        self.families.push((font_bytes.to_vec(), family_name.clone()));
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/text.rs"]
mod tests;
