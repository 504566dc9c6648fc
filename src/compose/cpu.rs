use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::loader::SlotLoad;
use crate::compose::backend::{
    CompositeBackend, CompositeInputs, CompositeStage, DecorationOutcome, DrawReport, Raster,
    SkipReason, SkippedSlot,
};
use crate::compose::plan::{CompositePlan, Decoration};
use crate::foundation::core::{Affine, PixelSize, Rect, Rgba8};
use crate::foundation::error::{BoothError, BoothResult};
use crate::foundation::math::premul_over_in_place;
use crate::layout::geometry::cover_crop;
use crate::overlay::metrics::{sample_brightness, sample_region, text_color_for};
use crate::overlay::render::{OverlayOutcome, OverlayRenderer, PositionedText};

/// CPU raster backend powered by `vello_cpu`.
pub struct CpuBackend {
    overlays: OverlayRenderer,
    font: Option<vello_cpu::peniko::FontData>,
}

impl CpuBackend {
    pub fn new(font: Option<Arc<Vec<u8>>>) -> Self {
        let font_data = font.as_ref().map(|bytes| {
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.as_ref().clone()), 0)
        });
        Self {
            overlays: OverlayRenderer::new(font),
            font: font_data,
        }
    }
}

impl CompositeBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(layout = %plan.layout_id, width = plan.size.width, height = plan.size.height))]
    fn render(&mut self, plan: &CompositePlan, inputs: &CompositeInputs<'_>) -> BoothResult<(Raster, DrawReport)> {
        let mut stages = vec![CompositeStage::Init];
        let (w16, h16) = surface_dims(plan.size)?;
        if inputs.frames.len() != plan.slots.len() {
            return Err(BoothError::validation(format!(
                "{} frame loads for {} slots",
                inputs.frames.len(),
                plan.slots.len()
            )));
        }
        let (w, h) = (f64::from(plan.size.width), f64::from(plan.size.height));

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(plan.background));
        ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, w, h)));
        stages.push(CompositeStage::BackgroundFilled);
        tracing::debug!("background filled");

        let mut skipped_slots = Vec::new();
        for (index, (dest, load)) in plan.slots.iter().zip(inputs.frames).enumerate() {
            let reason = match load {
                SlotLoad::Empty => SkipReason::Empty,
                SlotLoad::Failed(msg) => SkipReason::Failed(msg.clone()),
                SlotLoad::Loaded(img) => match draw_cover(&mut ctx, img, *dest) {
                    Ok(()) => continue,
                    Err(e) => {
                        tracing::warn!(slot = index, error = %e, "frame draw failed");
                        SkipReason::Failed(e.to_string())
                    }
                },
            };
            skipped_slots.push(SkippedSlot { index, reason });
        }
        stages.push(CompositeStage::FramesDrawn);
        tracing::debug!(skipped = skipped_slots.len(), "frames drawn");

        let decoration = match &plan.decoration {
            Decoration::FrameArt(_) => match inputs.frame_art {
                Some(SlotLoad::Loaded(img)) => match draw_stretched(&mut ctx, img, w, h) {
                    Ok(()) => DecorationOutcome::FrameArtDrawn,
                    Err(e) => DecorationOutcome::FrameArtFailed(e.to_string()),
                },
                Some(SlotLoad::Failed(msg)) => DecorationOutcome::FrameArtFailed(msg.clone()),
                Some(SlotLoad::Empty) | None => {
                    DecorationOutcome::FrameArtFailed("frame art was not loaded".to_owned())
                }
            },
            Decoration::Border { rect, width, color } => {
                if *width > 0.0 {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(color_to_cpu(*color));
                    ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                    ctx.stroke_rect(&rect_to_cpu(*rect));
                }
                DecorationOutcome::BorderDrawn
            }
        };
        if let DecorationOutcome::FrameArtFailed(reason) = &decoration {
            tracing::warn!(%reason, "frame art skipped");
        }
        stages.push(CompositeStage::FrameArtOrBorderDrawn);

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);
        let mut data = pixmap.data_as_u8_slice().to_vec();

        let mut brightness = None;
        let mut overlays = Vec::with_capacity(plan.overlays.len());
        if !plan.overlays.is_empty() {
            let b = sample_brightness(&data, plan.size.width, plan.size.height, sample_region(w, h));
            let palette = text_color_for(b);
            brightness = Some(b);

            let mut placed = Vec::new();
            for spec in &plan.overlays {
                match self.overlays.position(spec, palette, w) {
                    Ok(text) => {
                        placed.push(text);
                        overlays.push(OverlayOutcome::Drawn {
                            kind: spec.kind,
                            palette,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(kind = ?spec.kind, error = %e, "overlay skipped");
                        overlays.push(OverlayOutcome::Skipped {
                            kind: spec.kind,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            if let (Some(font), false) = (&self.font, placed.is_empty()) {
                draw_overlay_layer(&mut data, w16, h16, font, &placed)?;
            }
        }
        stages.push(CompositeStage::OverlaysDrawn);

        let raster = Raster {
            width: plan.size.width,
            height: plan.size.height,
            data,
        };
        let report = DrawReport {
            stages,
            skipped_slots,
            decoration,
            brightness,
            overlays,
        };
        Ok((raster, report))
    }
}

/// Draw `img` cover-cropped into `dest`; nothing lands outside `dest`.
fn draw_cover(ctx: &mut vello_cpu::RenderContext, img: &PreparedImage, dest: Rect) -> BoothResult<()> {
    let crop = cover_crop(f64::from(img.width), f64::from(img.height), dest)?;
    ctx.set_transform(affine_to_cpu(crop.transform()));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(image_paint(img)?);
    ctx.fill_rect(&rect_to_cpu(crop.source));
    Ok(())
}

fn draw_stretched(ctx: &mut vello_cpu::RenderContext, img: &PreparedImage, w: f64, h: f64) -> BoothResult<()> {
    let (iw, ih) = (f64::from(img.width), f64::from(img.height));
    ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(w / iw, h / ih)));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(image_paint(img)?);
    ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, iw, ih)));
    Ok(())
}

/// Overlays go on a transparent layer composited over the surface.
fn draw_overlay_layer(
    dst: &mut [u8],
    w16: u16,
    h16: u16,
    font: &vello_cpu::peniko::FontData,
    texts: &[PositionedText],
) -> BoothResult<()> {
    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    for text in texts {
        let size = text.font_px as f32;
        let outline = color_to_cpu(text.palette.outline);
        let fill = color_to_cpu(text.palette.fill);
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(text.outline_width));
        for g in &text.glyphs {
            let glyph = vello_cpu::Glyph {
                id: g.id,
                x: g.x as f32,
                y: g.y as f32,
            };
            ctx.set_paint(outline);
            ctx.glyph_run(font)
                .font_size(size)
                .stroke_glyphs(std::iter::once(glyph));
            ctx.set_paint(fill);
            ctx.glyph_run(font)
                .font_size(size)
                .fill_glyphs(std::iter::once(glyph));
        }
    }
    ctx.flush();

    let mut tmp = vello_cpu::Pixmap::new(w16, h16);
    tmp.data_as_u8_slice_mut().fill(0);
    ctx.render_to_pixmap(&mut tmp);
    premul_over_in_place(dst, tmp.data_as_u8_slice())
}

fn surface_dims(size: PixelSize) -> BoothResult<(u16, u16)> {
    let w: u16 = size
        .width
        .try_into()
        .map_err(|_| BoothError::validation("surface width exceeds u16"))?;
    let h: u16 = size
        .height
        .try_into()
        .map_err(|_| BoothError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

fn image_paint(img: &PreparedImage) -> BoothResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> BoothResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| BoothError::frame_load("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| BoothError::frame_load("image height exceeds u16"))?;
    if bytes.len() != width as usize * height as usize * 4 {
        return Err(BoothError::frame_load("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in bytes.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities))
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/cpu.rs"]
mod tests;
