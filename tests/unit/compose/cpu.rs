use super::*;
use crate::assets::source::ImageSource;
use crate::compose::customize::CustomizationState;
use crate::compose::plan::{ComposeOpts, plan_composite};
use crate::layout::registry::LayoutRegistry;
use crate::overlay::metrics::TextPalette;

fn test_font() -> Option<Arc<Vec<u8>>> {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/DejaVuSerif.ttf");
    std::fs::read(path).ok().map(Arc::new)
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> PreparedImage {
    PreparedImage::from_rgba_image(image::RgbaImage::from_pixel(w, h, image::Rgba(px)))
}

fn pixel(r: &Raster, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * r.width + x) * 4) as usize;
    [r.data[i], r.data[i + 1], r.data[i + 2], r.data[i + 3]]
}

fn strip2_plan(custom: &CustomizationState) -> CompositePlan {
    let reg = LayoutRegistry::builtin();
    plan_composite(reg.resolve("strip_2").unwrap(), custom, None, &ComposeOpts::default()).unwrap()
}

fn no_overlays() -> CustomizationState {
    CustomizationState {
        show_logo: false,
        ..CustomizationState::default()
    }
}

#[test]
fn frames_fill_their_slots_and_empty_slots_show_background() {
    let plan = strip2_plan(&no_overlays());
    let frames = vec![SlotLoad::Loaded(solid(40, 30, [255, 0, 0, 255])), SlotLoad::Empty];
    let mut backend = CpuBackend::new(None);
    let (raster, report) = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: None,
            },
        )
        .unwrap();

    assert_eq!((raster.width, raster.height), (600, 1800));
    assert_eq!(pixel(&raster, 300, 450), [255, 0, 0, 255]);
    assert_eq!(pixel(&raster, 300, 1350), [255, 255, 255, 255]);
    assert_eq!(pixel(&raster, 1, 1350), [0, 0, 0, 255]);
    assert_eq!(
        report.skipped_slots,
        vec![SkippedSlot {
            index: 1,
            reason: SkipReason::Empty
        }]
    );
    assert_eq!(report.decoration, DecorationOutcome::BorderDrawn);
    assert_eq!(report.brightness, None);
    assert_eq!(
        report.stages,
        vec![
            CompositeStage::Init,
            CompositeStage::BackgroundFilled,
            CompositeStage::FramesDrawn,
            CompositeStage::FrameArtOrBorderDrawn,
            CompositeStage::OverlaysDrawn,
        ]
    );
}

#[test]
fn cover_crop_never_bleeds_into_the_next_slot() {
    let plan = strip2_plan(&no_overlays());
    // A very tall source must be cropped, not stretched over slot 1.
    let frames = vec![
        SlotLoad::Loaded(solid(10, 400, [0, 0, 255, 255])),
        SlotLoad::Failed("slot 1: boom".to_owned()),
    ];
    let mut backend = CpuBackend::new(None);
    let (raster, report) = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: None,
            },
        )
        .unwrap();

    assert_eq!(pixel(&raster, 300, 890), [0, 0, 255, 255]);
    assert_eq!(pixel(&raster, 300, 910), [255, 255, 255, 255]);
    assert_eq!(
        report.skipped_slots[0].reason,
        SkipReason::Failed("slot 1: boom".to_owned())
    );
}

#[test]
fn failed_frame_art_leaves_the_composite_usable() {
    let custom = CustomizationState {
        frame_art: Some(ImageSource::Asset("frames/strip-2/missing.png".to_owned())),
        show_logo: false,
        ..CustomizationState::default()
    };
    let plan = strip2_plan(&custom);
    let frames = vec![SlotLoad::Empty, SlotLoad::Empty];
    let art = SlotLoad::Failed("not found".to_owned());
    let mut backend = CpuBackend::new(None);
    let (raster, report) = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: Some(&art),
            },
        )
        .unwrap();

    assert_eq!(
        report.decoration,
        DecorationOutcome::FrameArtFailed("not found".to_owned())
    );
    // No border either: frame art replaces it.
    assert_eq!(pixel(&raster, 1, 900), [255, 255, 255, 255]);
}

#[test]
fn frame_art_is_stretched_over_the_surface() {
    let custom = CustomizationState {
        frame_art: Some(ImageSource::Asset("frames/strip-2/classic.png".to_owned())),
        show_logo: false,
        ..CustomizationState::default()
    };
    let plan = strip2_plan(&custom);
    let frames = vec![SlotLoad::Empty, SlotLoad::Empty];
    let art = SlotLoad::Loaded(solid(4, 4, [0, 128, 0, 255]));
    let mut backend = CpuBackend::new(None);
    let (raster, report) = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: Some(&art),
            },
        )
        .unwrap();

    assert_eq!(report.decoration, DecorationOutcome::FrameArtDrawn);
    assert_eq!(pixel(&raster, 5, 5), [0, 128, 0, 255]);
    assert_eq!(pixel(&raster, 595, 1795), [0, 128, 0, 255]);
}

#[test]
fn overlays_without_a_font_are_skipped_but_brightness_is_sampled() {
    let plan = strip2_plan(&CustomizationState::default());
    let frames = vec![SlotLoad::Empty, SlotLoad::Empty];
    let mut backend = CpuBackend::new(None);
    let (_, report) = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: None,
            },
        )
        .unwrap();

    assert!(report.brightness.unwrap() > 200.0);
    assert_eq!(report.overlays.len(), 1);
    assert!(matches!(report.overlays[0], OverlayOutcome::Skipped { .. }));
}

#[test]
fn logo_is_drawn_dark_on_a_light_background() {
    let Some(font) = test_font() else {
        return;
    };
    let plan = strip2_plan(&CustomizationState::default());
    let frames = vec![SlotLoad::Empty, SlotLoad::Empty];
    let mut backend = CpuBackend::new(Some(font));
    let (raster, report) = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: None,
            },
        )
        .unwrap();

    assert_eq!(report.overlays[0].palette(), Some(TextPalette::DARK_ON_LIGHT));
    let spec = &plan.overlays[0];
    let top = (spec.baseline - spec.font_px) as u32;
    let bottom = spec.baseline as u32;
    let inked = (top..bottom)
        .flat_map(|y| (150..450).map(move |x| (x, y)))
        .any(|(x, y)| pixel(&raster, x, y)[0] < 128);
    assert!(inked, "expected dark logo pixels near the bottom");
}

#[test]
fn slot_and_load_counts_must_match() {
    let plan = strip2_plan(&no_overlays());
    let frames = vec![SlotLoad::Empty];
    let mut backend = CpuBackend::new(None);
    let err = backend
        .render(
            &plan,
            &CompositeInputs {
                frames: &frames,
                frame_art: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, BoothError::Validation(_)));
}
