use super::*;

#[test]
fn builtin_layouts_validate_and_keep_slot_invariant() {
    let reg = LayoutRegistry::builtin();
    for layout in reg.layouts() {
        layout.validate().unwrap();
        match layout.arrangement {
            Arrangement::Absolute => assert_eq!(layout.slots.len(), layout.frame_count),
            Arrangement::Strip | Arrangement::Grid => assert!(layout.slots.is_empty()),
        }
    }
    let ids: Vec<&str> = reg.ids().collect();
    assert_eq!(
        ids,
        ["strip_2", "strip_3", "strip_4", "grid_6", "postcard_2", "polaroid_4"]
    );
}

#[test]
fn resolve_unknown_layout_fails() {
    let reg = LayoutRegistry::builtin();
    let err = reg.resolve("nope").unwrap_err();
    assert!(matches!(err, BoothError::UnknownLayout(ref id) if id == "nope"));
    assert!(err.is_configuration());
}

#[test]
fn strip_4_is_600_by_1800() {
    let reg = LayoutRegistry::builtin();
    let size = reg.resolve("strip_4").unwrap().output_pixels().unwrap();
    assert_eq!(size, PixelSize::new(600, 1800).unwrap());
}

#[test]
fn from_json_parses_and_defaults_strip_axis() {
    let json = r#"{
        "layouts": [
            {"id": "s", "name": "S", "frame_count": 2, "arrangement": "strip",
             "output_width": "600px", "output_height": 1200},
            {"id": "a", "name": "A", "frame_count": 1, "arrangement": "absolute",
             "output_width": "4in", "output_height": "6in",
             "slots": [{"x": 0.5, "y": 0.5, "width": 3, "height": 5}]}
        ]
    }"#;
    let err = LayoutRegistry::from_json(json).unwrap_err();
    assert!(err.is_configuration(), "mixed units must be rejected: {err}");

    let json = json.replace("\"600px\"", "2");
    let reg = LayoutRegistry::from_json(&json).unwrap();
    let s = reg.resolve("s").unwrap();
    assert_eq!(s.strip_axis, StripAxis::Vertical);
    assert_eq!(s.output_pixels().unwrap(), PixelSize::new(600, 360_000).unwrap());
}

#[test]
fn absolute_slot_count_mismatch_is_rejected() {
    let mut layout = LayoutRegistry::builtin()
        .resolve("postcard_2")
        .unwrap()
        .clone();
    layout.slots.pop();
    assert!(layout.validate().is_err());
    assert!(LayoutRegistry::new(vec![layout]).is_err());
}

#[test]
fn duplicate_ids_are_rejected() {
    let reg = LayoutRegistry::builtin();
    let strip = reg.resolve("strip_2").unwrap().clone();
    let err = LayoutRegistry::new(vec![strip.clone(), strip]).unwrap_err();
    assert!(err.to_string().contains("duplicate layout id"));
}

#[test]
fn grid_must_not_carry_slots() {
    let mut layout = LayoutRegistry::builtin().resolve("grid_6").unwrap().clone();
    layout.slots.push(Slot {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    });
    assert!(layout.validate().is_err());
}

#[test]
fn frame_art_lookup() {
    let reg = LayoutRegistry::builtin();
    let strip = reg.resolve("strip_3").unwrap();
    assert_eq!(
        strip.frame_art("floral").map(|a| a.source.as_str()),
        Some("frames/strip-3/floral.svg")
    );
    assert!(strip.frame_art("missing").is_none());
}
