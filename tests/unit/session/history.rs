use super::*;
use crate::catalog::garment::{GarmentColor, ViewAngle};
use crate::scene::design::{DesignPatch, EditContext};

fn colored(c: GarmentColor) -> DesignState {
    DesignState::default().apply(DesignPatch::SetColor(c), &EditContext::default())
}

#[test]
fn starts_with_single_default_entry() {
    let h = HistoryStack::default();
    assert_eq!(h.len(), 1);
    assert_eq!(h.cursor(), 0);
    assert_eq!(h.current(), &DesignState::default());
    assert!(!h.can_undo());
    assert!(!h.can_redo());
    assert!(!h.is_empty());
}

#[test]
fn undo_redo_are_noops_at_the_ends() {
    let mut h = HistoryStack::default();
    assert_eq!(h.undo(), &DesignState::default());
    assert_eq!(h.redo(), &DesignState::default());
    assert_eq!(h.cursor(), 0);

    h.push(colored(GarmentColor::Red));
    assert_eq!(h.redo().garment.color, GarmentColor::Red);
    assert_eq!(h.cursor(), 1);
}

#[test]
fn push_after_undo_discards_redo_tail() {
    let colors = [
        GarmentColor::Red,
        GarmentColor::Blue,
        GarmentColor::Green,
        GarmentColor::Yellow,
    ];
    for k in 0..=colors.len() {
        let mut h = HistoryStack::default();
        for c in colors {
            h.push(colored(c));
        }
        for _ in 0..k {
            h.undo();
        }
        let insertion = h.cursor();
        h.push(colored(GarmentColor::Pink));

        assert_eq!(h.len(), insertion + 2, "k = {k}");
        assert_eq!(h.cursor(), insertion + 1);
        assert!(!h.can_redo());
        assert_eq!(h.current().garment.color, GarmentColor::Pink);
        // Redo after a fresh edit has nowhere to go.
        assert_eq!(h.redo().garment.color, GarmentColor::Pink);
        // Entries before the insertion point survive untouched.
        for (i, c) in colors.iter().take(insertion).enumerate() {
            assert_eq!(h.entries()[i + 1].garment.color, *c);
        }
    }
}

#[test]
fn undo_then_redo_is_identity() {
    let mut h = HistoryStack::default();
    h.push(colored(GarmentColor::Red));
    let s = DesignState::default()
        .apply(DesignPatch::SetView(ViewAngle::Left), &EditContext::default());
    h.push(s.clone());

    let before = h.current().clone();
    h.undo();
    assert_ne!(h.current(), &before);
    assert_eq!(h.redo(), &before);
    assert_eq!(h.current(), &s);
}

#[test]
fn limit_evicts_oldest_and_keeps_cursor_on_newest() {
    let mut h = HistoryStack::with_limit(DesignState::default(), 3);
    h.push(colored(GarmentColor::Red));
    h.push(colored(GarmentColor::Blue));
    h.push(colored(GarmentColor::Green));
    assert_eq!(h.len(), 3);
    assert_eq!(h.cursor(), 2);
    assert_eq!(h.entries()[0].garment.color, GarmentColor::Red);
    assert_eq!(h.current().garment.color, GarmentColor::Green);

    h.undo();
    h.undo();
    assert!(!h.can_undo());
    assert_eq!(h.current().garment.color, GarmentColor::Red);
    assert_eq!(HistoryStack::with_limit(DesignState::default(), 0).limit(), Some(1));
}
