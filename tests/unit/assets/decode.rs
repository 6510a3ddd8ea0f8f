use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decode_png_premultiplies() {
    let prepared = decode_image(&png_bytes(3, 2, [200, 100, 50, 128])).unwrap();
    assert_eq!((prepared.width, prepared.height), (3, 2));
    assert_eq!(prepared.rgba8_premul.len(), 3 * 2 * 4);
    assert_eq!(&prepared.rgba8_premul[..4], &[100, 50, 25, 128]);
}

#[test]
fn decode_rejects_empty_and_garbage() {
    let err = decode_image(&[]).unwrap_err();
    assert!(matches!(err, StudioError::LayerDecode(_)));
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, StudioError::LayerDecode(_)));
    assert!(err.is_recoverable());
}

#[test]
fn svg_sniffing() {
    assert!(looks_like_svg(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"));
    assert!(looks_like_svg(b"\n  <?xml version=\"1.0\"?>\n<svg></svg>"));
    assert!(!looks_like_svg(&png_bytes(1, 1, [0, 0, 0, 255])));
    assert!(!looks_like_svg(b"<html></html>"));
}

#[test]
fn parse_svg_reports_decode_errors() {
    let ok = parse_svg(
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4"><rect width="8" height="4" fill="red"/></svg>"##,
        None,
    )
    .unwrap();
    assert_eq!(ok.tree.size().width(), 8.0);

    let err = parse_svg(b"<svg", None).unwrap_err();
    assert!(matches!(err, StudioError::LayerDecode(_)));
}
