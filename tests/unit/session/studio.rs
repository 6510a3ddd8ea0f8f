use std::io::Cursor;

use super::*;
use crate::assets::fonts::FontBook;
use crate::assets::loader::MemoryAssetSource;
use crate::catalog::garment::GarmentColor;
use crate::catalog::table::GarmentCatalog;
use crate::export::store::InMemoryDesignStore;
use crate::foundation::error::StudioError;
use crate::scene::layer::{ApproxTextMeasure, ImageSource, LayerTransform, TextStyle};

fn png(px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(px));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn compositor() -> Compositor {
    let assets = MemoryAssetSource::new()
        .with("images/black t-shirts/black-front.jpg", png([0, 0, 0, 255]))
        .unwrap();
    Compositor::new(GarmentCatalog::builtin(), assets, FontBook::empty())
}

fn small() -> Canvas {
    Canvas::new(16, 20).unwrap()
}

fn set_text(content: &str) -> DesignPatch {
    DesignPatch::SetText {
        content: content.into(),
        style: TextStyle::default(),
    }
}

#[test]
fn image_text_undo_redo_scenario() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    let s0 = s.current().clone();

    s.edit(DesignPatch::SetImage(ImageSource::new(png([255, 0, 0, 255]))), &m);
    let s1 = s.current().clone();
    s.edit(set_text("HELLO"), &m);
    let s2 = s.current().clone();
    assert_eq!(s.history().len(), 3);
    assert_eq!(s.history().cursor(), 2);

    assert_eq!(s.undo(), &s1);
    assert_eq!(s.undo(), &s0);
    assert_eq!(s.redo(), &s1);
    assert_eq!(s.redo(), &s2);
    assert_eq!(s.history().cursor(), 2);
}

#[test]
fn noop_edits_do_not_grow_history() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    s.edit(DesignPatch::TransformImage(LayerTransform::default().opacity(0.5)), &m);
    s.edit(DesignPatch::ClearText, &m);
    assert_eq!(s.history().len(), 1);
    assert_eq!(s.revision(), 0);
}

#[test]
fn draft_gesture_is_one_undo_step() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    s.edit(DesignPatch::SetImage(ImageSource::new(vec![1])), &m);
    let before = s.current().clone();

    s.begin_draft();
    for x in [10.0, 20.0, 30.0] {
        s.update_draft(
            DesignPatch::TransformImage(LayerTransform::default().anchor(x, 50.0)),
            &m,
        );
    }
    assert!(s.has_draft());
    assert_eq!(s.current(), &before, "drafts never touch history");
    let shown = s.display_state().image.as_ref().unwrap().placement.anchor.x;
    assert_eq!(shown, 30.0);

    assert!(s.commit_draft());
    assert!(!s.has_draft());
    assert_eq!(s.history().len(), 3);
    assert_eq!(s.undo(), &before);
}

#[test]
fn cancel_draft_restores_committed_state() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    s.update_draft(DesignPatch::SetColor(GarmentColor::Red), &m);
    assert_eq!(s.display_state().garment.color, GarmentColor::Red);
    s.cancel_draft();
    assert_eq!(s.display_state().garment.color, GarmentColor::Black);
    assert!(!s.commit_draft());
    assert_eq!(s.history().len(), 1);
}

#[test]
fn undo_drops_open_draft() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    s.edit(DesignPatch::SetColor(GarmentColor::Blue), &m);
    s.update_draft(DesignPatch::SetColor(GarmentColor::Red), &m);
    assert_eq!(s.undo().garment.color, GarmentColor::Black);
    assert!(!s.has_draft());
}

#[test]
fn stale_render_completions_are_discarded() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    let mut c = compositor();

    let first = s.request_render();
    let second = s.request_render();
    let raster = c.render(&second.state, small()).unwrap();
    assert!(!s.complete(first.ticket, raster.clone()));
    assert!(s.complete(second.ticket, raster.clone()));
    assert!(s.displayed().is_some());
    assert!(!s.complete(second.ticket, raster.clone()), "completes only once");

    // A color change while a render is in flight supersedes it.
    let pending = s.request_render();
    s.edit(DesignPatch::SetColor(GarmentColor::Red), &m);
    assert!(!s.complete(pending.ticket, raster));
}

#[test]
fn render_now_updates_displayed() {
    let mut s = DesignSession::default();
    let mut c = compositor();
    let report = s.render_now(&mut c, small()).unwrap();
    assert!(report.is_clean());
    let shown = s.displayed().unwrap();
    assert_eq!((shown.width, shown.height), (16, 20));
}

#[test]
fn failed_save_keeps_session_state() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::default();
    s.edit(set_text("SAVE ME"), &m);
    let before = s.current().clone();
    let cursor = s.history().cursor();

    let mut c = compositor();
    let mut store = InMemoryDesignStore::rejecting("network down");
    let err = s.save(&mut c, &mut store, small()).unwrap_err();
    assert!(matches!(err, StudioError::Persistence(_)));
    assert_eq!(s.current(), &before);
    assert_eq!(s.history().cursor(), cursor);

    store.set_rejecting(None);
    let id = s.save(&mut c, &mut store, small()).unwrap();
    let (stored, sub) = &store.records()[0];
    assert_eq!(stored, &id);
    assert_eq!(sub.garment, before.garment);
    let decoded = image::load_from_memory(&sub.png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 20));
}

#[test]
fn history_limit_is_applied() {
    let m = ApproxTextMeasure;
    let mut s = DesignSession::new(LayerLimits::default(), Some(2));
    s.edit(DesignPatch::SetColor(GarmentColor::Red), &m);
    s.edit(DesignPatch::SetColor(GarmentColor::Blue), &m);
    assert_eq!(s.history().len(), 2);
    assert_eq!(s.undo().garment.color, GarmentColor::Red);
    assert_eq!(s.undo().garment.color, GarmentColor::Red);
}
