use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::assets::source::ImageSource;
use crate::capture::buffer::CaptureBuffer;
use crate::foundation::error::{BoothError, BoothResult};
use crate::layout::registry::{LayoutConfig, LayoutRegistry};

/// Store key holding the selected layout.
pub const LAYOUT_KEY: &str = "blu_layout_config";
/// Store key holding the captured frames.
pub const PHOTOS_KEY: &str = "blu_captured_photos";

/// Key/value persistence scoped to one user session.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// One user's in-progress strip.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureSession {
    pub layout_id: String,
    pub buffer: CaptureBuffer,
    pub captured_at: Option<DateTime<Utc>>,
}

impl CaptureSession {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            layout_id: layout.id.clone(),
            buffer: CaptureBuffer::new(layout.frame_count),
            captured_at: None,
        }
    }

    /// Fill `index` and refresh the capture time.
    pub fn set_frame(&mut self, index: usize, source: ImageSource, at: DateTime<Utc>) -> BoothResult<()> {
        self.buffer.set_frame(index, source)?;
        self.captured_at = Some(at);
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            layout_id: self.layout_id.clone(),
            frame_count: self.buffer.len(),
            frames: self
                .buffer
                .frames()
                .iter()
                .map(|s| s.as_ref().map(ImageSource::to_reference))
                .collect(),
            captured_at: self.captured_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutSelection {
    layout_id: String,
    frame_count: usize,
}

/// Serialized form of a [`CaptureSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub layout_id: String,
    pub frame_count: usize,
    pub frames: Vec<Option<String>>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Record a layout choice; any previously captured frames are discarded.
pub fn select_layout(store: &mut dyn SessionStore, layout: &LayoutConfig) -> BoothResult<CaptureSession> {
    let sel = LayoutSelection {
        layout_id: layout.id.clone(),
        frame_count: layout.frame_count,
    };
    let json = serde_json::to_string(&sel)
        .map_err(|e| BoothError::configuration(format!("serialize layout selection: {e}")))?;
    store.set(LAYOUT_KEY, json);
    store.remove(PHOTOS_KEY);
    Ok(CaptureSession::new(layout))
}

pub fn save_session(store: &mut dyn SessionStore, session: &CaptureSession) -> BoothResult<()> {
    let json = serde_json::to_string(&session.snapshot())
        .map_err(|e| BoothError::configuration(format!("serialize session: {e}")))?;
    store.set(PHOTOS_KEY, json);
    Ok(())
}

/// Drop all session state (after export, or to restart from layout selection).
pub fn clear_session(store: &mut dyn SessionStore) {
    store.remove(LAYOUT_KEY);
    store.remove(PHOTOS_KEY);
}

/// Rebuild the session from the store.
///
/// `Ok(None)` when no layout was selected. Malformed or inconsistent data clears the store and
/// returns a configuration error so the caller restarts from layout selection.
pub fn restore_session(
    store: &mut dyn SessionStore,
    registry: &LayoutRegistry,
) -> BoothResult<Option<CaptureSession>> {
    match restore_inner(store, registry) {
        Ok(session) => Ok(session),
        Err(e) => {
            tracing::warn!(error = %e, "discarding stored session");
            clear_session(store);
            Err(e)
        }
    }
}

fn restore_inner(
    store: &dyn SessionStore,
    registry: &LayoutRegistry,
) -> BoothResult<Option<CaptureSession>> {
    let Some(raw) = store.get(LAYOUT_KEY) else {
        return Ok(None);
    };
    let sel: LayoutSelection = serde_json::from_str(&raw)
        .map_err(|e| BoothError::configuration(format!("malformed layout selection: {e}")))?;
    let layout = registry.resolve(&sel.layout_id)?;
    if sel.frame_count != layout.frame_count {
        return Err(BoothError::configuration(format!(
            "stored frame count {} does not match layout '{}' ({})",
            sel.frame_count, layout.id, layout.frame_count
        )));
    }

    let mut session = CaptureSession::new(layout);
    let Some(raw) = store.get(PHOTOS_KEY) else {
        return Ok(Some(session));
    };
    let snap: SessionSnapshot = serde_json::from_str(&raw)
        .map_err(|e| BoothError::configuration(format!("malformed captured photos: {e}")))?;
    if snap.layout_id != layout.id || snap.frames.len() != layout.frame_count {
        return Err(BoothError::configuration(format!(
            "captured photos do not match layout '{}'",
            layout.id
        )));
    }

    session.buffer = CaptureBuffer::from_slots(
        snap.frames
            .iter()
            .map(|f| f.as_deref().map(ImageSource::from_reference))
            .collect(),
    );
    session.captured_at = snap.captured_at;
    Ok(Some(session))
}

#[cfg(test)]
#[path = "../../tests/unit/capture/session.rs"]
mod tests;
