use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::assets::decode::{PreparedImage, decode_any};
use crate::assets::source::ImageSource;
use crate::assets::store::{AssetFetcher, source_bytes};
use crate::foundation::core::PixelSize;
use crate::foundation::error::{BoothError, BoothResult};

/// Default per-load deadline.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// How a single slot's load settled.
#[derive(Clone, Debug)]
pub enum SlotLoad {
    /// No source was assigned.
    Empty,
    Loaded(PreparedImage),
    /// Fetch, decode, timeout or join failure; the message is for reports.
    Failed(String),
}

impl SlotLoad {
    pub fn image(&self) -> Option<&PreparedImage> {
        match self {
            Self::Loaded(img) => Some(img),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Fetch and decode one source on the calling thread.
pub fn load_blocking(
    source: &ImageSource,
    fetcher: &dyn AssetFetcher,
    svg_size: Option<PixelSize>,
) -> BoothResult<PreparedImage> {
    let bytes = source_bytes(source, fetcher)?;
    decode_any(&bytes, source.hints_svg(), svg_size)
}

fn spawn_load(
    source: ImageSource,
    fetcher: Arc<dyn AssetFetcher>,
    svg_size: Option<PixelSize>,
) -> JoinHandle<BoothResult<PreparedImage>> {
    tokio::task::spawn_blocking(move || load_blocking(&source, fetcher.as_ref(), svg_size))
}

async fn settle(
    index: usize,
    handle: JoinHandle<BoothResult<PreparedImage>>,
    deadline: Instant,
) -> SlotLoad {
    match tokio::time::timeout_at(deadline, handle).await {
        Ok(Ok(Ok(img))) => SlotLoad::Loaded(img),
        Ok(Ok(Err(e))) => {
            let e = BoothError::frame_load(format!("slot {index}: {e}"));
            tracing::warn!(error = %e, "image load failed");
            SlotLoad::Failed(e.to_string())
        }
        Ok(Err(join)) => {
            tracing::warn!(slot = index, error = %join, "image load task failed");
            SlotLoad::Failed(format!("slot {index}: load task failed: {join}"))
        }
        Err(_) => {
            tracing::warn!(slot = index, "image load timed out");
            SlotLoad::Failed(format!("slot {index}: load timed out"))
        }
    }
}

/// Load every slot concurrently and wait for all of them to settle.
///
/// All loads start before any is awaited and share one deadline, so each slot gets the full
/// `timeout`. Results come back in slot order; a failed slot never affects the others.
#[tracing::instrument(skip(sources, fetcher), fields(slots = sources.len()))]
pub async fn load_all(
    sources: &[Option<ImageSource>],
    fetcher: Arc<dyn AssetFetcher>,
    timeout: Duration,
) -> Vec<SlotLoad> {
    let deadline = Instant::now() + timeout;
    let handles: Vec<Option<JoinHandle<BoothResult<PreparedImage>>>> = sources
        .iter()
        .map(|s| {
            s.as_ref()
                .map(|src| spawn_load(src.clone(), Arc::clone(&fetcher), None))
        })
        .collect();

    let mut out = Vec::with_capacity(handles.len());
    for (i, handle) in handles.into_iter().enumerate() {
        out.push(match handle {
            None => SlotLoad::Empty,
            Some(h) => settle(i, h, deadline).await,
        });
    }
    out
}

/// Load a single source (frame art), rasterizing SVG at `svg_size`.
pub async fn load_one(
    source: &ImageSource,
    fetcher: Arc<dyn AssetFetcher>,
    svg_size: Option<PixelSize>,
    timeout: Duration,
) -> SlotLoad {
    let deadline = Instant::now() + timeout;
    settle(0, spawn_load(source.clone(), fetcher, svg_size), deadline).await
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
