use super::*;

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    assert_eq!(
        Canvas::new(800, 1000).unwrap(),
        Canvas {
            width: 800,
            height: 1000
        }
    );
}

#[test]
fn default_canvas_matches_storefront() {
    let c = Canvas::default();
    assert_eq!((c.width, c.height), (800, 1000));
    assert_eq!(c.max_side(), 1000);
    assert_eq!(c.rgba8_len(), 800 * 1000 * 4);
}

#[test]
fn percent_to_px_scales_each_axis() {
    let c = Canvas::new(800, 1000).unwrap();
    assert_eq!(c.percent_to_px(50.0, 50.0), Point::new(400.0, 500.0));
    assert_eq!(c.percent_to_px(0.0, 100.0), Point::new(0.0, 1000.0));
    assert_eq!(c.percent_to_px(25.0, 10.0), Point::new(200.0, 100.0));
}

