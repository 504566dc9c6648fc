use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::assets::loader::{SlotLoad, load_all, load_one};
use crate::assets::source::ImageSource;
use crate::assets::store::AssetFetcher;
use crate::capture::session::CaptureSession;
use crate::compose::backend::{
    BackendKind, CompositeInputs, CompositeStage, DrawReport, Raster, create_backend,
};
use crate::compose::customize::CustomizationState;
use crate::compose::filter::{Filter, apply_color_matrix_in_place, is_identity};
use crate::compose::plan::{ComposeOpts, CompositePlan, Decoration, plan_composite};
use crate::encode::raster::{ImageFormat, encode_jpeg, rgba_image_from_premul};
use crate::foundation::error::{BoothError, BoothResult};
use crate::layout::registry::LayoutRegistry;

/// Which session a composite was made from.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SessionRef {
    pub layout_id: String,
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CompositeReport {
    #[serde(flatten)]
    pub draw: DrawReport,
    pub filter: Filter,
}

impl CompositeReport {
    pub fn reached(&self, stage: CompositeStage) -> bool {
        self.draw.stages.contains(&stage)
    }
}

/// The encoded photo strip plus what happened while making it.
#[derive(Clone, Debug)]
pub struct CompositeResult {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub encoded: Vec<u8>,
    pub format: ImageFormat,
    pub session: SessionRef,
    pub report: CompositeReport,
}

/// Orchestrates plan, load, draw, filter and encode for one layout registry.
///
/// Only one composite may run at a time; an overlapping call fails with [`BoothError::Busy`].
pub struct CompositeEngine {
    registry: LayoutRegistry,
    fetcher: Arc<dyn AssetFetcher>,
    backend: BackendKind,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CompositeEngine {
    pub fn new(registry: LayoutRegistry, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            registry,
            fetcher,
            backend: BackendKind::default(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_backend(mut self, kind: BackendKind) -> Self {
        self.backend = kind;
        self
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self) -> BoothResult<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| BoothError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    /// Composite a capture session.
    pub async fn compose(
        &self,
        session: &CaptureSession,
        custom: &CustomizationState,
        opts: &ComposeOpts,
    ) -> BoothResult<CompositeResult> {
        self.compose_frames(
            &session.layout_id,
            session.buffer.frames(),
            session.captured_at,
            custom,
            opts,
        )
        .await
    }

    /// Composite explicit frame sources for `layout_id`; `None` slots stay blank.
    #[tracing::instrument(skip(self, frames, custom, opts), fields(frames = frames.len()))]
    pub async fn compose_frames(
        &self,
        layout_id: &str,
        frames: &[Option<ImageSource>],
        captured_at: Option<DateTime<Utc>>,
        custom: &CustomizationState,
        opts: &ComposeOpts,
    ) -> BoothResult<CompositeResult> {
        let _guard = self.begin()?;

        let layout = self.registry.resolve(layout_id)?;
        if frames.len() != layout.frame_count {
            return Err(BoothError::validation(format!(
                "layout '{}' takes {} frames, got {}",
                layout.id,
                layout.frame_count,
                frames.len()
            )));
        }
        let plan = plan_composite(layout, custom, captured_at, opts)?;
        tracing::debug!(width = plan.size.width, height = plan.size.height, "planned");

        let art_source = match &plan.decoration {
            Decoration::FrameArt(src) => Some(src),
            Decoration::Border { .. } => None,
        };
        let (loads, art) = tokio::join!(
            load_all(frames, Arc::clone(&self.fetcher), opts.load_timeout),
            async {
                match art_source {
                    Some(src) => Some(
                        load_one(
                            src,
                            Arc::clone(&self.fetcher),
                            Some(plan.size),
                            opts.load_timeout,
                        )
                        .await,
                    ),
                    None => None,
                }
            }
        );

        let (raster, mut draw) = self.draw(&plan, &loads, art.as_ref(), opts)?;
        let encoded = finish(raster, &plan)?;
        draw.stages.push(CompositeStage::Encoded);
        tracing::debug!(bytes = encoded.len(), "encoded");

        Ok(CompositeResult {
            pixel_width: plan.size.width,
            pixel_height: plan.size.height,
            encoded,
            format: ImageFormat::Jpeg,
            session: SessionRef {
                layout_id: plan.layout_id.clone(),
                captured_at,
            },
            report: CompositeReport {
                draw,
                filter: plan.filter,
            },
        })
    }

    fn draw(
        &self,
        plan: &CompositePlan,
        frames: &[SlotLoad],
        frame_art: Option<&SlotLoad>,
        opts: &ComposeOpts,
    ) -> BoothResult<(Raster, DrawReport)> {
        let mut backend = create_backend(self.backend, opts.font.clone());
        backend.render(plan, &CompositeInputs { frames, frame_art })
    }
}

/// Filter the drawn surface and encode it.
fn finish(mut raster: Raster, plan: &CompositePlan) -> BoothResult<Vec<u8>> {
    let m = plan.filter.matrix();
    if !is_identity(&m) {
        apply_color_matrix_in_place(&mut raster.data, raster.width, &m);
    }
    let img = rgba_image_from_premul(raster.width, raster.height, &raster.data)?;
    encode_jpeg(&img, plan.jpeg_quality)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/engine.rs"]
mod tests;
