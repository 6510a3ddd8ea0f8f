use super::*;
use crate::assets::decode::parse_svg;

#[test]
fn svg_is_stretched_to_target_size() {
    let svg = parse_svg(
        br##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="#0000ff"/></svg>"##,
        None,
    )
    .unwrap();
    let rgba = rasterize_svg_to_premul_rgba8(&svg.tree, 20, 40).unwrap();
    assert_eq!(rgba.len(), 20 * 40 * 4);

    // Center and far corner are both covered by the stretched rect.
    let px = |x: usize, y: usize| &rgba[(y * 20 + x) * 4..(y * 20 + x) * 4 + 4];
    assert_eq!(px(10, 20), &[0, 0, 255, 255]);
    assert_eq!(px(18, 38), &[0, 0, 255, 255]);
}

#[test]
fn zero_target_size_fails() {
    let svg = parse_svg(
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#,
        None,
    )
    .unwrap();
    assert!(rasterize_svg_to_premul_rgba8(&svg.tree, 0, 10).is_err());
}
