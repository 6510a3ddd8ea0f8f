use super::*;
use crate::scene::layer::Anchor;

fn cx() -> EditContext<'static> {
    EditContext::default()
}

fn with_image() -> DesignState {
    DesignState::default().apply(DesignPatch::SetImage(ImageSource::new(vec![1, 2, 3])), &cx())
}

#[test]
fn default_state_is_blank_black_tshirt_front() {
    let s = DesignState::default();
    assert!(s.is_blank());
    assert_eq!(s.garment, GarmentSelection::default());
}

#[test]
fn garment_patches_touch_one_axis() {
    let s = DesignState::default();
    let red = s.apply(DesignPatch::SetColor(GarmentColor::Red), &cx());
    assert_eq!(red.garment.color, GarmentColor::Red);
    assert_eq!(red.garment.view, ViewAngle::Front);
    assert_eq!(s.garment.color, GarmentColor::Black);

    let back = red.apply(DesignPatch::SetView(ViewAngle::Back), &cx());
    assert_eq!(back.garment.color, GarmentColor::Red);
    assert_eq!(back.garment.view, ViewAngle::Back);

    let hoodie = back.apply(DesignPatch::SetProduct(ProductType::Hoodie), &cx());
    assert_eq!(hoodie.garment.product, ProductType::Hoodie);
    assert!(DesignPatch::SetView(ViewAngle::Left).is_garment_change());
    assert!(!DesignPatch::ClearImage.is_garment_change());
}

#[test]
fn set_and_clear_image() {
    let s = with_image();
    assert!(s.image.is_some());
    let cleared = s.apply(DesignPatch::ClearImage, &cx());
    assert!(cleared.image.is_none());
    assert!(s.image.is_some(), "previous snapshot must not change");
}

#[test]
fn transform_on_absent_layer_is_a_noop() {
    let s = DesignState::default();
    let t = s.apply(
        DesignPatch::TransformImage(LayerTransform::default().opacity(0.3)),
        &cx(),
    );
    assert_eq!(t, s);
    let t = s.apply(
        DesignPatch::TransformText(LayerTransform::default().rotation(10.0)),
        &cx(),
    );
    assert_eq!(t, s);
    assert_eq!(s.apply(DesignPatch::ToggleBold, &cx()), s);
}

#[test]
fn transform_image_flows_through_clamps() {
    let s = with_image().apply(
        DesignPatch::TransformImage(LayerTransform::default().rotation(370.0).opacity(2.0)),
        &cx(),
    );
    let img = s.image.as_ref().unwrap();
    assert_eq!(img.placement.effective_rotation_deg(), 10.0);
    assert_eq!(img.placement.opacity, 1.0);
}

#[test]
fn set_text_creates_then_keeps_placement() {
    let s = DesignState::default().apply(
        DesignPatch::SetText {
            content: "HELLO".into(),
            style: TextStyle::default(),
        },
        &cx(),
    );
    let moved = s.apply(
        DesignPatch::TransformText(LayerTransform::default().anchor(20.0, 30.0)),
        &cx(),
    );
    let renamed = moved.apply(
        DesignPatch::SetText {
            content: "WORLD".into(),
            style: TextStyle {
                bold: true,
                ..TextStyle::default()
            },
        },
        &cx(),
    );
    let text = renamed.text.as_ref().unwrap();
    assert_eq!(text.content, "WORLD");
    assert!(text.style.bold);
    assert_eq!(text.placement.anchor, Anchor { x: 20.0, y: 30.0 });

    let blank = renamed.apply(
        DesignPatch::SetText {
            content: " ".into(),
            style: TextStyle::default(),
        },
        &cx(),
    );
    assert!(blank.text.is_none());
}

#[test]
fn style_toggles_flip_flags() {
    let s = DesignState::default().apply(
        DesignPatch::SetText {
            content: "A".into(),
            style: TextStyle::default(),
        },
        &cx(),
    );
    let s = s
        .apply(DesignPatch::ToggleBold, &cx())
        .apply(DesignPatch::ToggleItalic, &cx())
        .apply(DesignPatch::ToggleUnderline, &cx())
        .apply(DesignPatch::SetTextAlign(TextAlign::Right), &cx());
    let style = &s.text.as_ref().unwrap().style;
    assert!(style.bold && style.italic && style.underline);
    assert_eq!(style.align, TextAlign::Right);

    let s = s.apply(DesignPatch::ToggleBold, &cx());
    assert!(!s.text.as_ref().unwrap().style.bold);
}

#[test]
fn clear_design_keeps_garment() {
    let s = with_image()
        .apply(DesignPatch::SetColor(GarmentColor::Blue), &cx())
        .apply(
            DesignPatch::SetText {
                content: "X".into(),
                style: TextStyle::default(),
            },
            &cx(),
        );
    let cleared = s.apply(DesignPatch::ClearDesign, &cx());
    assert!(cleared.is_blank());
    assert_eq!(cleared.garment.color, GarmentColor::Blue);
}

#[test]
fn sanitized_reapplies_layer_invariants() {
    let mut raw = with_image();
    if let Some(img) = raw.image.as_mut() {
        img.placement.opacity = 4.0;
        img.size.width = 0.0;
        img.placement.anchor = Anchor { x: 500.0, y: 50.0 };
    }
    let clean = raw.sanitized(&cx());
    let img = clean.image.unwrap();
    assert_eq!(img.placement.opacity, 1.0);
    assert_eq!(img.size.width, 10.0);
    assert_eq!(img.placement.anchor.x, 100.0);
}

#[test]
fn design_document_json_roundtrip() {
    let s = with_image().apply(
        DesignPatch::SetText {
            content: "HELLO".into(),
            style: TextStyle::default(),
        },
        &cx(),
    );
    let json = serde_json::to_string(&s).unwrap();
    assert!(json.contains("data:"));
    let back: DesignState = serde_json::from_str(&json).unwrap();
    assert_eq!(back.garment, s.garment);
    assert_eq!(back.image, s.image);

    let (a, b) = (back.text.unwrap(), s.text.unwrap());
    assert_eq!(a.content, b.content);
    assert_eq!(a.style, b.style);
    assert_eq!(a.placement, b.placement);
    assert!((a.extent.height - b.extent.height).abs() < 1e-9);
}
