//! blubooth is a photobooth photo-strip compositing engine.
//!
//! A session picks a layout from a [`LayoutRegistry`], fills a [`CaptureBuffer`] from a camera
//! or uploads, and hands the frames to a [`CompositeEngine`] which draws the strip, applies the
//! chosen [`Filter`] and encodes a JPEG. An [`ExportAdapter`] then saves and persists it.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod assets;
pub(crate) mod capture;
pub(crate) mod compose;
pub mod encode;
pub(crate) mod export;
pub(crate) mod layout;
pub(crate) mod overlay;

pub use crate::foundation::core::{Affine, Dimension, PRINT_DPI, PixelSize, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{BoothError, BoothResult, PersistenceErrorKind};

pub use crate::assets::decode::{PreparedImage, decode_any, decode_image};
pub use crate::assets::loader::{DEFAULT_LOAD_TIMEOUT, SlotLoad, load_all, load_one};
pub use crate::assets::source::{ImageSource, decode_data_uri, encode_data_uri};
pub use crate::assets::store::{AssetFetcher, FsFetcher};
pub use crate::capture::buffer::CaptureBuffer;
pub use crate::capture::device::{CaptureDevice, CaptureOpts, capture_into};
pub use crate::capture::session::{
    CaptureSession, LAYOUT_KEY, MemoryStore, PHOTOS_KEY, SessionSnapshot, SessionStore,
    clear_session, restore_session, save_session, select_layout,
};
pub use crate::capture::upload::{
    AspectCheck, AspectRatio, MismatchPolicy, UploadOutcome, UploadPolicy, crop_image,
    crop_review_png, fill_from_uploads, finish_upload, pad_to_fit, prepare_upload,
    validate_aspect_ratio,
};
pub use crate::compose::backend::{
    BackendKind, CompositeBackend, CompositeInputs, CompositeStage, DecorationOutcome, DrawReport,
    Raster, SkipReason, SkippedSlot, create_backend,
};
pub use crate::compose::customize::{CustomizationState, LogoLanguage, TimestampFormat};
pub use crate::compose::engine::{CompositeEngine, CompositeReport, CompositeResult, SessionRef};
pub use crate::compose::filter::Filter;
pub use crate::compose::plan::{ComposeOpts, CompositePlan, Decoration, plan_composite};
pub use crate::encode::raster::ImageFormat;
pub use crate::export::adapter::{
    DirSaver, ExportAdapter, ExportMode, ExportPayload, ExportReport, LocalSaver,
    PersistResponse, PersistenceClient, RecordingClient, classify_status, export_file_name,
};
pub use crate::layout::geometry::{CoverCrop, cover_crop, frame_rect, grid_dims};
pub use crate::layout::registry::{
    Arrangement, FrameArtEntry, LayoutConfig, LayoutRegistry, Slot, StripAxis,
};
pub use crate::overlay::metrics::{
    OverlayMetrics, TextPalette, sample_brightness, sample_region, text_color_for,
};
pub use crate::overlay::render::{OverlayKind, OverlayOutcome, OverlaySpec};
