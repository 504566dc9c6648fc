use super::*;
use crate::layout::registry::LayoutRegistry;

struct HalfRedCamera;

impl CaptureDevice for HalfRedCamera {
    fn grab_frame(&mut self) -> BoothResult<image::RgbaImage> {
        Ok(image::RgbaImage::from_fn(64, 32, |x, _| {
            if x < 32 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 255])
            }
        }))
    }
}

struct DeniedCamera;

impl CaptureDevice for DeniedCamera {
    fn grab_frame(&mut self) -> BoothResult<image::RgbaImage> {
        Err(BoothError::capture_device("permission denied"))
    }
}

fn decoded(session: &CaptureSession, index: usize) -> image::RgbaImage {
    let Some(ImageSource::Encoded(bytes)) = session.buffer.frame(index) else {
        panic!("slot {index} should hold encoded bytes");
    };
    image::load_from_memory(bytes).unwrap().to_rgba8()
}

#[test]
fn capture_advances_to_first_empty_slot() {
    let reg = LayoutRegistry::builtin();
    let mut session = CaptureSession::new(reg.resolve("strip_3").unwrap());
    let mut cam = HalfRedCamera;

    assert_eq!(capture_into(&mut session, &mut cam, 0, CaptureOpts::default()).unwrap(), Some(1));
    assert_eq!(capture_into(&mut session, &mut cam, 2, CaptureOpts::default()).unwrap(), Some(1));
    assert_eq!(capture_into(&mut session, &mut cam, 1, CaptureOpts::default()).unwrap(), None);
    assert!(session.buffer.is_complete());
    assert!(session.captured_at.is_some());
}

#[test]
fn mirrored_capture_flips_horizontally() {
    let reg = LayoutRegistry::builtin();
    let mut session = CaptureSession::new(reg.resolve("strip_2").unwrap());
    let mut cam = HalfRedCamera;
    let opts = CaptureOpts {
        mirrored: true,
        ..CaptureOpts::default()
    };
    capture_into(&mut session, &mut cam, 0, opts).unwrap();
    capture_into(&mut session, &mut cam, 1, CaptureOpts::default()).unwrap();

    let flipped = decoded(&session, 0);
    let plain = decoded(&session, 1);
    assert!(flipped.get_pixel(4, 16)[2] > 200, "left side should be blue after mirroring");
    assert!(plain.get_pixel(4, 16)[0] > 200, "left side stays red without mirroring");
}

#[test]
fn device_failure_leaves_buffer_untouched() {
    let reg = LayoutRegistry::builtin();
    let mut session = CaptureSession::new(reg.resolve("strip_2").unwrap());
    let err = capture_into(&mut session, &mut DeniedCamera, 0, CaptureOpts::default()).unwrap_err();
    assert!(matches!(err, BoothError::CaptureDevice(_)));
    assert_eq!(session.buffer.filled_count(), 0);
    assert!(session.captured_at.is_none());
}

#[test]
fn out_of_range_capture_is_rejected_before_grabbing() {
    let reg = LayoutRegistry::builtin();
    let mut session = CaptureSession::new(reg.resolve("strip_2").unwrap());
    let err = capture_into(&mut session, &mut DeniedCamera, 5, CaptureOpts::default()).unwrap_err();
    assert!(matches!(err, BoothError::IndexOutOfRange { .. }));
}
