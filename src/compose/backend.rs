use std::sync::Arc;

use crate::assets::loader::SlotLoad;
use crate::compose::plan::CompositePlan;
use crate::foundation::error::BoothResult;
use crate::overlay::render::OverlayOutcome;

/// A rendered composite as RGBA8 pixels.
///
/// Pixels are **premultiplied alpha**, tightly packed, row-major.
#[derive(Clone, Debug)]
pub struct Raster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes of premultiplied RGBA8.
    pub data: Vec<u8>,
}

/// Progress marker for one composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeStage {
    /// Surface allocated.
    Init,
    /// Surface cleared to the plan background.
    BackgroundFilled,
    /// Every slot visited, drawn or skipped.
    FramesDrawn,
    /// Frame art or border applied (or frame art recorded as failed).
    FrameArtOrBorderDrawn,
    /// Logo and timestamp visited.
    OverlaysDrawn,
    /// Output bytes produced by the engine.
    Encoded,
}

/// Why a slot shows background.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// No photo was captured for the slot.
    Empty,
    /// The photo could not be loaded, decoded or drawn.
    Failed(String),
}

/// A slot left showing background.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SkippedSlot {
    /// Zero-based slot index.
    pub index: usize,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// What was drawn over the photos.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "decoration", content = "detail", rename_all = "snake_case")]
pub enum DecorationOutcome {
    /// Frame art stretched over the whole surface.
    FrameArtDrawn,
    /// Frame art could not be loaded or drawn; nothing was drawn in its place.
    FrameArtFailed(String),
    /// Border stroked around the surface edge.
    BorderDrawn,
}

/// What the backend did, stage by stage.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DrawReport {
    /// Stages reached, in order.
    pub stages: Vec<CompositeStage>,
    /// Slots that show background, in slot order.
    pub skipped_slots: Vec<SkippedSlot>,
    pub decoration: DecorationOutcome,
    /// Luminance sampled behind the overlays, if any overlay was requested.
    pub brightness: Option<f64>,
    /// One outcome per requested overlay, logo first.
    pub overlays: Vec<OverlayOutcome>,
}

/// Loaded images handed to a backend, in slot order.
pub struct CompositeInputs<'a> {
    /// One load result per slot of the plan.
    pub frames: &'a [SlotLoad],
    /// `None` when the plan draws a border.
    pub frame_art: Option<&'a SlotLoad>,
}

/// A drawing strategy for a [`CompositePlan`].
///
/// Backends only draw: loading, filtering and encoding belong to the engine.
pub trait CompositeBackend {
    /// Draw `plan` and report what was drawn or skipped.
    ///
    /// Per-slot and decoration failures are recorded in the report; an `Err` means the
    /// surface itself could not be produced.
    fn render(&mut self, plan: &CompositePlan, inputs: &CompositeInputs<'_>) -> BoothResult<(Raster, DrawReport)>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Construct a backend; `font` is used for the logo and timestamp.
pub fn create_backend(kind: BackendKind, font: Option<Arc<Vec<u8>>>) -> Box<dyn CompositeBackend> {
    match kind {
        BackendKind::Cpu => Box::new(crate::compose::cpu::CpuBackend::new(font)),
    }
}
