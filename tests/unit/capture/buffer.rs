use super::*;

fn src(tag: u8) -> ImageSource {
    ImageSource::encoded(vec![tag])
}

#[test]
fn new_buffer_is_empty_with_fixed_length() {
    let buf = CaptureBuffer::new(4);
    assert_eq!(buf.len(), 4);
    assert_eq!(buf.filled_count(), 0);
    assert_eq!(buf.first_empty_index(), Some(0));
    assert!(!buf.is_complete());
}

#[test]
fn complete_iff_every_slot_filled() {
    let mut buf = CaptureBuffer::new(3);
    for i in 0..3 {
        assert!(!buf.is_complete());
        buf.set_frame(i, src(i as u8)).unwrap();
    }
    assert!(buf.is_complete());
    assert_eq!(buf.first_empty_index(), None);

    buf.clear_frame(1).unwrap();
    assert!(!buf.is_complete());
    assert_eq!(buf.first_empty_index(), Some(1));
}

#[test]
fn retake_overwrites_only_that_slot() {
    let mut buf = CaptureBuffer::new(3);
    buf.set_frame(0, src(1)).unwrap();
    buf.set_frame(1, src(2)).unwrap();
    buf.set_frame(2, src(3)).unwrap();
    let before = buf.clone();

    buf.set_frame(1, src(9)).unwrap();
    assert_eq!(buf.frame(1), Some(&src(9)));
    assert_eq!(buf.frame(0), before.frame(0));
    assert_eq!(buf.frame(2), before.frame(2));
    assert_eq!(buf.len(), 3);
}

#[test]
fn out_of_range_slots_are_rejected() {
    let mut buf = CaptureBuffer::new(2);
    let err = buf.set_frame(2, src(0)).unwrap_err();
    assert!(matches!(err, BoothError::IndexOutOfRange { index: 2, len: 2 }));
    assert!(buf.clear_frame(5).is_err());
    assert!(buf.frame(7).is_none());
    assert_eq!(buf.filled_count(), 0);
}

#[test]
fn auto_advance_picks_lowest_empty_slot() {
    let mut buf = CaptureBuffer::new(4);
    buf.set_frame(0, src(0)).unwrap();
    buf.set_frame(2, src(2)).unwrap();
    assert_eq!(buf.first_empty_index(), Some(1));
    assert_eq!(buf.filled_count(), 2);

    buf.clear();
    assert_eq!(buf.filled_count(), 0);
}
