use super::*;

fn filtered(filter: Filter, px: [u8; 4]) -> [u8; 4] {
    let mut buf = px.to_vec();
    apply_color_matrix_in_place(&mut buf, 1, &filter.matrix());
    [buf[0], buf[1], buf[2], buf[3]]
}

#[test]
fn none_is_identity_and_skipped() {
    assert!(is_identity(&Filter::None.matrix()));
    assert_eq!(filtered(Filter::None, [12, 34, 56, 255]), [12, 34, 56, 255]);
}

#[test]
fn bw_makes_channels_equal() {
    let out = filtered(Filter::Bw, [200, 40, 90, 255]);
    assert_eq!(out[0], out[1]);
    assert_eq!(out[1], out[2]);
    assert_eq!(out[3], 255);
    // 0.2126*200 + 0.7152*40 + 0.0722*90 ~= 77.6
    assert!((i32::from(out[0]) - 78).abs() <= 1);
}

#[test]
fn sepia_warms_neutral_gray() {
    let out = filtered(Filter::Sepia, [128, 128, 128, 255]);
    assert!(out[0] > out[1] && out[1] > out[2], "{out:?}");
}

#[test]
fn vivid_pushes_away_from_gray_and_fade_pulls_in() {
    let vivid = filtered(Filter::Vivid, [200, 100, 100, 255]);
    assert!(vivid[0] > 200 && vivid[1] < 100);

    let fade = filtered(Filter::Fade, [0, 0, 0, 255]);
    // contrast(0.9) lifts black to 0.05, brightness(1.1) to 0.055.
    assert!((i32::from(fade[0]) - 14).abs() <= 1, "{fade:?}");
}

#[test]
fn filters_preserve_alpha_and_transparent_pixels() {
    for f in [Filter::Bw, Filter::Sepia, Filter::Vivid, Filter::Fade] {
        assert_eq!(filtered(f, [0, 0, 0, 0])[3], 0);
        assert_eq!(filtered(f, [60, 30, 10, 128])[3], 128);
    }
}

#[test]
fn chain_applies_in_order() {
    let a = contrast(1.2);
    let b = saturate(1.3);
    let composed = chain(&[a, b]);
    assert_eq!(composed, mul_color_matrix(b, a));
    assert!(is_identity(&chain(&[])));
}

#[test]
fn rows_are_processed_independently() {
    let mut buf = vec![200u8, 40, 90, 255].repeat(6);
    apply_color_matrix_in_place(&mut buf, 3, &Filter::Bw.matrix());
    let first = buf[0..4].to_vec();
    for px in buf.chunks_exact(4) {
        assert_eq!(px, first.as_slice());
    }
}

#[test]
fn parse_names() {
    assert_eq!(Filter::parse("BW"), Some(Filter::Bw));
    assert_eq!(Filter::parse("vivid"), Some(Filter::Vivid));
    assert_eq!(Filter::parse("noir"), None);
}
