use std::io::Cursor;

use super::*;
use crate::assets::loader::MemoryAssetSource;
use crate::catalog::garment::{GarmentColor, ViewAngle};
use crate::scene::design::{DesignPatch, EditContext};
use crate::scene::layer::{LayerTransform, TextStyle};

const DEFAULT_REF: &str = "images/black t-shirts/black-front.jpg";
const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn canvas() -> Canvas {
    Canvas::new(40, 50).unwrap()
}

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn compositor_with(assets: MemoryAssetSource) -> Compositor {
    Compositor::new(GarmentCatalog::builtin(), assets, FontBook::empty())
}

fn red_base() -> Compositor {
    compositor_with(MemoryAssetSource::new().with(DEFAULT_REF, png(4, 4, RED)).unwrap())
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(x, y)| (i32::from(*x) - i32::from(*y)).abs() <= 2)
}

fn with_image(bytes: Vec<u8>, t: LayerTransform) -> DesignState {
    let cx = EditContext::default();
    DesignState::default()
        .apply(DesignPatch::SetImage(ImageSource::new(bytes)), &cx)
        .apply(DesignPatch::TransformImage(t), &cx)
}

#[test]
fn base_image_fills_canvas() {
    let mut c = red_base();
    let (raster, report) = c
        .render_with_report(&DesignState::default(), canvas())
        .unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!((raster.width, raster.height), (40, 50));
    assert!(raster.premultiplied);
    for (x, y) in [(1, 1), (20, 25), (38, 48)] {
        assert!(close(raster.pixel(x, y).unwrap(), RED), "pixel ({x},{y})");
    }
}

#[test]
fn missing_base_renders_transparent_with_warning() {
    let mut c = compositor_with(MemoryAssetSource::new());
    let (raster, report) = c
        .render_with_report(&DesignState::default(), canvas())
        .unwrap();
    assert!(raster.data.iter().all(|&b| b == 0));
    assert!(matches!(
        report.warnings.as_slice(),
        [RenderWarning::BaseImageMissing { .. }]
    ));
}

#[test]
fn unloadable_garment_image_falls_back_to_default() {
    let mut c = red_base();
    let state = DesignState::default()
        .apply(DesignPatch::SetColor(GarmentColor::Blue), &EditContext::default())
        .apply(DesignPatch::SetView(ViewAngle::Back), &EditContext::default());
    let (raster, report) = c.render_with_report(&state, canvas()).unwrap();
    assert!(close(raster.pixel(20, 25).unwrap(), RED));
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        RenderWarning::BaseImageFallback { .. }
    ));
}

#[test]
fn svg_base_is_rasterized_to_canvas() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#0000ff"/></svg>"##;
    let mut c = compositor_with(MemoryAssetSource::new().with(DEFAULT_REF, svg.to_vec()).unwrap());
    let (raster, report) = c
        .render_with_report(&DesignState::default(), canvas())
        .unwrap();
    assert!(report.is_clean());
    assert!(close(raster.pixel(20, 25).unwrap(), BLUE));
}

#[test]
fn image_layer_is_drawn_at_anchor_with_size() {
    let mut c = red_base();
    let state = with_image(png(2, 2, BLUE), LayerTransform::default().size(10.0, 10.0));
    let raster = c.render(&state, canvas()).unwrap();
    assert!(close(raster.pixel(20, 25).unwrap(), BLUE));
    assert!(close(raster.pixel(2, 2).unwrap(), RED));
    assert!(close(raster.pixel(20, 35).unwrap(), RED));

    let moved = with_image(
        png(2, 2, BLUE),
        LayerTransform::default().size(10.0, 10.0).anchor(25.0, 20.0),
    );
    let raster = c.render(&moved, canvas()).unwrap();
    assert!(close(raster.pixel(10, 10).unwrap(), BLUE));
    assert!(close(raster.pixel(20, 25).unwrap(), RED));
}

#[test]
fn zero_opacity_image_leaves_base_untouched() {
    let mut c = red_base();
    let state = with_image(
        png(2, 2, BLUE),
        LayerTransform::default().size(10.0, 10.0).opacity(0.0),
    );
    let raster = c.render(&state, canvas()).unwrap();
    assert!(close(raster.pixel(20, 25).unwrap(), RED));
}

#[test]
fn undecodable_image_is_skipped_and_reported() {
    let mut c = red_base();
    let state = with_image(b"not an image".to_vec(), LayerTransform::default());
    let (raster, report) = c.render_with_report(&state, canvas()).unwrap();
    assert!(matches!(
        report.warnings.as_slice(),
        [RenderWarning::ImageLayerSkipped { .. }]
    ));
    let plain = c.render(&DesignState::default(), canvas()).unwrap();
    assert_eq!(raster, plain);
}

#[test]
fn rotation_uses_effective_angle() {
    let mut c = red_base();
    let t = LayerTransform::default().size(20.0, 6.0);
    let a = c
        .render(&with_image(png(2, 2, BLUE), t.rotation(370.0)), canvas())
        .unwrap();
    let b = c
        .render(&with_image(png(2, 2, BLUE), t.rotation(10.0)), canvas())
        .unwrap();
    assert_eq!(a, b);

    // A quarter turn swaps the layer's extent.
    let upright = c
        .render(&with_image(png(2, 2, BLUE), t.rotation(90.0)), canvas())
        .unwrap();
    assert!(close(upright.pixel(20, 33).unwrap(), BLUE));
    assert!(close(upright.pixel(28, 25).unwrap(), RED));
}

#[test]
fn render_is_idempotent_and_cache_neutral() {
    let mut c = red_base();
    let state = with_image(png(3, 3, BLUE), LayerTransform::default().rotation(33.0));
    let first = c.render(&state, canvas()).unwrap();
    let second = c.render(&state, canvas()).unwrap();
    assert_eq!(first, second);
    c.clear_caches();
    assert_eq!(c.render(&state, canvas()).unwrap(), first);
}

#[test]
fn text_without_fonts_is_skipped() {
    let mut c = red_base();
    let state = DesignState::default().apply(
        DesignPatch::SetText {
            content: "HELLO".into(),
            style: TextStyle::default(),
        },
        &EditContext::default(),
    );
    let (_, report) = c.render_with_report(&state, canvas()).unwrap();
    assert!(matches!(
        report.warnings.as_slice(),
        [RenderWarning::TextLayerSkipped { .. }]
    ));
}

#[test]
fn invalid_canvas_is_rejected() {
    let mut c = red_base();
    let err = c
        .render(
            &DesignState::default(),
            Canvas {
                width: 0,
                height: 10,
            },
        )
        .unwrap_err();
    assert!(matches!(err, StudioError::Validation(_)));
}
