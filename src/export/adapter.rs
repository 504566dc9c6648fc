use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, TimeZone};

use crate::assets::source::encode_data_uri;
use crate::compose::engine::CompositeResult;
use crate::encode::raster::ImageFormat;
use crate::foundation::error::{BoothError, BoothResult, PersistenceErrorKind};

/// How the user ended the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportMode {
    /// Save a local copy, then persist.
    Download,
    /// Persist only.
    Finish,
}

/// Body sent to the persistence endpoint.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportPayload {
    /// `data:image/jpeg;base64,...`
    pub image: String,
}

impl ExportPayload {
    pub fn from_result(result: &CompositeResult) -> Self {
        Self {
            image: encode_data_uri(result.format.mime(), &result.encoded),
        }
    }
}

/// Status line of a persistence response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistResponse {
    pub status: u16,
    /// Server-provided message, if the body carried one.
    pub message: Option<String>,
}

/// Writes the encoded composite somewhere the user can reach it.
pub trait LocalSaver: Send {
    fn save(&mut self, bytes: &[u8], format: ImageFormat) -> BoothResult<PathBuf>;
}

/// Hands the composite to the external photo store.
///
/// `Err` means the request produced no status at all and is reported as a network failure.
pub trait PersistenceClient: Send {
    fn submit(&mut self, payload: &ExportPayload) -> BoothResult<PersistResponse>;
}

/// `None` for success, otherwise the failure class of `status`.
pub fn classify_status(status: u16) -> Option<PersistenceErrorKind> {
    match status {
        200..=299 | 302 | 303 => None,
        401 | 403 | 419 => Some(PersistenceErrorKind::Session),
        422 => Some(PersistenceErrorKind::Validation),
        _ => Some(PersistenceErrorKind::Server),
    }
}

/// `blubooth-DD-MM-YYYY-HHMMSS.<ext>`
pub fn export_file_name<Tz>(at: &DateTime<Tz>, format: ImageFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "blubooth-{}.{}",
        at.format("%d-%m-%Y-%H%M%S"),
        format.extension()
    )
}

/// Saves composites into a directory, never overwriting an earlier file.
#[derive(Clone, Debug)]
pub struct DirSaver {
    dir: PathBuf,
}

impl DirSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn free_path(&self, name: &str) -> PathBuf {
        let first = self.dir.join(name);
        if !first.exists() {
            return first;
        }
        let (stem, ext) = name.rsplit_once('.').unwrap_or((name, ""));
        (1u32..)
            .map(|n| self.dir.join(format!("{stem}-{n}.{ext}")))
            .find(|p| !p.exists())
            .unwrap_or(first)
    }
}

impl LocalSaver for DirSaver {
    fn save(&mut self, bytes: &[u8], format: ImageFormat) -> BoothResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir '{}'", self.dir.display()))?;
        let path = self.free_path(&export_file_name(&Local::now(), format));
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        Ok(path)
    }
}

/// Records payloads and answers with a fixed status, for tests and offline use.
#[derive(Debug, Default)]
pub struct RecordingClient {
    status: u16,
    message: Option<String>,
    offline: bool,
    payloads: Vec<ExportPayload>,
}

impl RecordingClient {
    /// Accept every submission with `201 Created`.
    pub fn new() -> Self {
        Self::with_status(201)
    }

    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Answer `422` with a validation message.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            status: 422,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Fail every submission before a status is received.
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn payloads(&self) -> &[ExportPayload] {
        &self.payloads
    }
}

impl PersistenceClient for RecordingClient {
    fn submit(&mut self, payload: &ExportPayload) -> BoothResult<PersistResponse> {
        self.payloads.push(payload.clone());
        if self.offline {
            return Err(BoothError::Other(anyhow::anyhow!("connection refused")));
        }
        Ok(PersistResponse {
            status: self.status,
            message: self.message.clone(),
        })
    }
}

/// Outcome of one export; the local save and persistence are reported independently.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub local_save_triggered: bool,
    pub local_path: Option<PathBuf>,
    pub local_error: Option<String>,
    pub persisted: bool,
    /// Persistence failure, always [`BoothError::Persistence`].
    pub error: Option<BoothError>,
}

impl ExportReport {
    pub fn persistence_kind(&self) -> Option<PersistenceErrorKind> {
        match &self.error {
            Some(BoothError::Persistence { kind, .. }) => Some(*kind),
            _ => None,
        }
    }
}

pub struct ExportAdapter {
    saver: Box<dyn LocalSaver>,
    client: Box<dyn PersistenceClient>,
}

impl ExportAdapter {
    pub fn new(saver: Box<dyn LocalSaver>, client: Box<dyn PersistenceClient>) -> Self {
        Self { saver, client }
    }

    #[tracing::instrument(skip(self, result), fields(layout = %result.session.layout_id, bytes = result.encoded.len()))]
    pub fn finalize(&mut self, result: &CompositeResult, mode: ExportMode) -> ExportReport {
        let mut report = ExportReport::default();

        if mode == ExportMode::Download {
            report.local_save_triggered = true;
            match self.saver.save(&result.encoded, result.format) {
                Ok(path) => {
                    tracing::debug!(path = %path.display(), "local copy saved");
                    report.local_path = Some(path);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "local save failed");
                    report.local_error = Some(e.to_string());
                }
            }
        }

        match self.persist(result) {
            Ok(()) => report.persisted = true,
            Err(e) => {
                tracing::warn!(error = %e, "persistence failed");
                report.error = Some(e);
            }
        }
        report
    }

    fn persist(&mut self, result: &CompositeResult) -> BoothResult<()> {
        let payload = ExportPayload::from_result(result);
        let response = self
            .client
            .submit(&payload)
            .map_err(|e| BoothError::persistence(PersistenceErrorKind::Network, e.to_string()))?;
        match classify_status(response.status) {
            None => Ok(()),
            Some(kind) => {
                let message = match (kind, response.message) {
                    (PersistenceErrorKind::Validation, Some(m)) => m,
                    (PersistenceErrorKind::Validation, None) => "validation failed".to_owned(),
                    (PersistenceErrorKind::Session, _) => {
                        "session expired, please sign in again".to_owned()
                    }
                    (_, _) => format!("server error: {}", response.status),
                };
                Err(BoothError::persistence(kind, message))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/adapter.rs"]
mod tests;
