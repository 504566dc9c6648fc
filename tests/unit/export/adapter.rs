use chrono::{FixedOffset, TimeZone};

use super::*;
use crate::assets::source::decode_data_uri;
use crate::compose::backend::{CompositeStage, DecorationOutcome, DrawReport};
use crate::compose::engine::{CompositeReport, SessionRef};
use crate::compose::filter::Filter;

fn result() -> CompositeResult {
    CompositeResult {
        pixel_width: 2,
        pixel_height: 2,
        encoded: vec![0xFF, 0xD8, 0xFF, 0xD9],
        format: ImageFormat::Jpeg,
        session: SessionRef {
            layout_id: "strip_2".to_owned(),
            captured_at: None,
        },
        report: CompositeReport {
            draw: DrawReport {
                stages: vec![CompositeStage::Init, CompositeStage::Encoded],
                skipped_slots: Vec::new(),
                decoration: DecorationOutcome::BorderDrawn,
                brightness: None,
                overlays: Vec::new(),
            },
            filter: Filter::None,
        },
    }
}

struct BrokenSaver;

impl LocalSaver for BrokenSaver {
    fn save(&mut self, _bytes: &[u8], _format: ImageFormat) -> BoothResult<PathBuf> {
        Err(BoothError::Other(anyhow::anyhow!("disk full")))
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("blubooth-export-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn status_classes() {
    assert_eq!(classify_status(200), None);
    assert_eq!(classify_status(201), None);
    assert_eq!(classify_status(302), None);
    assert_eq!(classify_status(303), None);
    assert_eq!(classify_status(419), Some(PersistenceErrorKind::Session));
    assert_eq!(classify_status(401), Some(PersistenceErrorKind::Session));
    assert_eq!(classify_status(422), Some(PersistenceErrorKind::Validation));
    assert_eq!(classify_status(500), Some(PersistenceErrorKind::Server));
    assert_eq!(classify_status(301), Some(PersistenceErrorKind::Server));
}

#[test]
fn file_name_uses_day_month_year_and_time() {
    let at = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 3, 7, 9, 5, 2)
        .unwrap();
    assert_eq!(
        export_file_name(&at, ImageFormat::Jpeg),
        "blubooth-07-03-2025-090502.jpg"
    );
}

#[test]
fn payload_is_a_jpeg_data_uri() {
    let payload = ExportPayload::from_result(&result());
    let (mime, bytes) = decode_data_uri(&payload.image).unwrap();
    assert_eq!(mime, "image/jpeg");
    assert_eq!(bytes, result().encoded);
}

#[test]
fn download_saves_locally_then_persists() {
    let dir = temp_dir("download");
    let mut adapter = ExportAdapter::new(
        Box::new(DirSaver::new(&dir)),
        Box::new(RecordingClient::new()),
    );
    let report = adapter.finalize(&result(), ExportMode::Download);

    assert!(report.local_save_triggered);
    assert!(report.persisted);
    assert!(report.error.is_none());
    let path = report.local_path.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), result().encoded);
    assert!(path.file_name().unwrap().to_string_lossy().starts_with("blubooth-"));

    let second = adapter.finalize(&result(), ExportMode::Download);
    assert_ne!(second.local_path.unwrap(), path);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn persistence_failure_does_not_mask_local_save() {
    let dir = temp_dir("offline");
    let mut adapter = ExportAdapter::new(
        Box::new(DirSaver::new(&dir)),
        Box::new(RecordingClient::offline()),
    );
    let report = adapter.finalize(&result(), ExportMode::Download);

    assert!(report.local_path.is_some());
    assert!(!report.persisted);
    assert_eq!(report.persistence_kind(), Some(PersistenceErrorKind::Network));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn finish_skips_the_local_save() {
    let mut adapter = ExportAdapter::new(Box::new(BrokenSaver), Box::new(RecordingClient::new()));
    let report = adapter.finalize(&result(), ExportMode::Finish);
    assert!(!report.local_save_triggered);
    assert!(report.local_error.is_none());
    assert!(report.persisted);
}

#[test]
fn local_failure_still_persists() {
    let mut adapter = ExportAdapter::new(Box::new(BrokenSaver), Box::new(RecordingClient::new()));
    let report = adapter.finalize(&result(), ExportMode::Download);
    assert!(report.local_save_triggered);
    assert!(report.local_error.unwrap().contains("disk full"));
    assert!(report.persisted);
}

#[test]
fn rejected_payload_reports_the_server_message() {
    let mut adapter = ExportAdapter::new(
        Box::new(BrokenSaver),
        Box::new(RecordingClient::rejecting("image too large")),
    );
    let report = adapter.finalize(&result(), ExportMode::Finish);
    match report.error {
        Some(BoothError::Persistence { kind, message }) => {
            assert_eq!(kind, PersistenceErrorKind::Validation);
            assert_eq!(message, "image too large");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn expired_session_is_classified() {
    let mut adapter = ExportAdapter::new(
        Box::new(BrokenSaver),
        Box::new(RecordingClient::with_status(419)),
    );
    let report = adapter.finalize(&result(), ExportMode::Finish);
    assert_eq!(report.persistence_kind(), Some(PersistenceErrorKind::Session));
}
