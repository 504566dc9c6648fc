use super::*;

#[test]
fn dimension_parses_units() {
    assert_eq!(Dimension::parse("2in").unwrap(), Dimension::Inches(2.0));
    assert_eq!(Dimension::parse("600px").unwrap(), Dimension::Pixels(600.0));
    assert_eq!(Dimension::parse(" 1.5 ").unwrap(), Dimension::Inches(1.5));
    assert!(Dimension::parse("wide").is_err());
    assert!(Dimension::parse("-3px").is_err());
}

#[test]
fn dimension_converts_inches_at_print_dpi() {
    assert_eq!(Dimension::Inches(2.0).to_pixels(), 600.0);
    assert_eq!(Dimension::Pixels(1800.0).to_pixels(), 1800.0);
}

#[test]
fn dimension_serde_accepts_strings_and_numbers() {
    let d: Dimension = serde_json::from_value(serde_json::json!("6in")).unwrap();
    assert_eq!(d, Dimension::Inches(6.0));
    let d: Dimension = serde_json::from_value(serde_json::json!(4)).unwrap();
    assert_eq!(d, Dimension::Inches(4.0));
    let d: Dimension = serde_json::from_value(serde_json::json!("1200px")).unwrap();
    assert_eq!(serde_json::to_value(d).unwrap(), serde_json::json!("1200px"));
}

#[test]
fn pixel_size_scaling_rounds() {
    let s = PixelSize::new(600, 1800).unwrap();
    assert_eq!(s.scaled(2.0).unwrap(), PixelSize::new(1200, 3600).unwrap());
    assert_eq!(s.scaled(0.5).unwrap(), PixelSize::new(300, 900).unwrap());
    assert!(s.scaled(0.0).is_err());
    assert!(PixelSize::new(0, 10).is_err());
}

#[test]
fn rgba_premul_bytes() {
    assert_eq!(Rgba8::WHITE.to_premul_bytes(), [255, 255, 255, 255]);
    let half = Rgba8 {
        r: 200,
        g: 100,
        b: 0,
        a: 128,
    };
    assert_eq!(half.to_premul_bytes(), [100, 50, 0, 128]);
}
