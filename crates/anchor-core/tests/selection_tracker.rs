mod support;

use anchor_core::{
    AnchorTarget, ContentTracker, ContentTrackerOptions, Coords, DomRange, EditorView,
    FallbackAnchor, MenuPresenter, Rect, SelectionState, SelectionTracker,
    SelectionTrackerOptions, TrackerMode,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use support::{Event, Fixture, fixture};

fn attach(fx: &Fixture, enabled: bool, anchor_to_selection: bool) -> SelectionTracker {
    SelectionTracker::attach(
        fx.session.clone(),
        fx.presenter.clone(),
        SelectionTrackerOptions {
            enabled,
            anchor_to_selection,
            prevent: false,
        },
    )
}

fn select(fx: &Fixture, from: (usize, Coords), to: (usize, Coords)) {
    fx.host.set_coords(from.0, from.1);
    fx.host.set_coords(to.0, to.1);
    fx.host.set_selection(SelectionState::new(from.0, to.0));
}

#[test]
fn test_default_path_anchors_to_selected_element() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = attach(&fx, true, false);
    let image = fx
        .host
        .append_node(fx.host.root(), Rect::new(40.0, 120.0, 200.0, 150.0));
    fx.host.set_selected_element(Some(image));
    fx.host.set_selection(SelectionState::new(10, 11));
    fx.host.emit_transaction();

    let target = AnchorTarget::Element(image);
    assert_eq!(
        fx.presenter.events(),
        vec![
            Event::Visible(true),
            Event::SelectionChanged(target.clone(), Rect::new(40.0, 120.0, 200.0, 150.0)),
            Event::Anchor(target),
        ]
    );
    assert_eq!(tracker.mode(), Some(TrackerMode::SelectionDefault));
    assert_eq!(fx.host.live_marker_count(), 0);
    assert!(!fx.session.state().is_open);
}

#[test]
fn test_default_path_without_selected_element_hides_menu() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let _tracker = attach(&fx, true, false);
    fx.host.set_selection(SelectionState::new(3, 9));
    fx.host.emit_transaction();

    assert_eq!(fx.presenter.events(), vec![Event::Visible(false)]);
}

#[test]
fn test_disabled_tracker_hides_menu_even_with_selected_element() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = attach(&fx, false, true);
    let block = fx
        .host
        .append_node(fx.host.root(), Rect::new(0.0, 40.0, 600.0, 20.0));
    fx.host.set_selected_element(Some(block));
    select(&fx, (0, Coords::new(0.0, 40.0)), (4, Coords::new(30.0, 60.0)));
    fx.host.emit_transaction();

    assert_eq!(fx.presenter.events(), vec![Event::Visible(false)]);
    assert!(tracker.anchor().is_none());
}

#[test]
fn test_anchored_path_opens_session_with_fallback() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = attach(&fx, true, true);
    select(&fx, (5, Coords::new(80.0, 300.0)), (9, Coords::new(140.0, 318.0)));
    fx.host.emit_transaction();

    let anchor = tracker.anchor().unwrap();
    let target = AnchorTarget::Virtual(anchor.clone());
    let rect = Rect::new(0.0, 300.0, 640.0, 18.0);
    assert_eq!(anchor.rect(), Some(rect));
    assert_eq!(tracker.mode(), Some(TrackerMode::SelectionAnchored));

    assert_eq!(
        fx.presenter.events(),
        vec![
            Event::Visible(true),
            Event::SelectionChanged(target.clone(), rect),
            Event::Anchor(target.clone()),
        ]
    );

    let state = fx.session.state();
    assert!(state.is_open);
    assert_eq!(
        state.fallback_anchor,
        FallbackAnchor {
            element: Some(target),
            rect: Some(rect),
        }
    );
}

#[test]
fn test_dom_range_inside_editor_is_preferred() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = attach(&fx, true, true);
    let paragraph = fx
        .host
        .append_node(fx.host.root(), Rect::new(0.0, 400.0, 600.0, 40.0));
    select(&fx, (1, Coords::new(0.0, 0.0)), (2, Coords::new(5.0, 5.0)));
    fx.host.set_dom_selection(Some(DomRange {
        rect: Rect::new(60.0, 410.0, 120.0, 16.0),
        common_ancestor: paragraph,
    }));
    fx.host.emit_transaction();

    assert_eq!(
        tracker.anchor().and_then(|a| a.rect()),
        Some(Rect::new(0.0, 410.0, 640.0, 16.0))
    );
}

#[test]
fn test_missing_coordinates_fall_through_to_default_path() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = attach(&fx, true, true);
    let block = fx
        .host
        .append_node(fx.host.root(), Rect::new(0.0, 40.0, 600.0, 20.0));
    fx.host.set_selected_element(Some(block));
    fx.host.set_selection(SelectionState::new(3, 8));
    fx.host.emit_transaction();

    assert_eq!(tracker.mode(), Some(TrackerMode::SelectionDefault));
    assert!(tracker.anchor().is_none());
    assert_eq!(fx.host.live_marker_count(), 0);
    assert_eq!(
        fx.presenter.last_anchor(),
        Some(AnchorTarget::Element(block))
    );
    assert!(!fx.session.state().is_open);
}

#[test]
fn test_selection_anchor_is_frozen_across_scroll() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = attach(&fx, true, true);
    select(&fx, (0, Coords::new(10.0, 100.0)), (6, Coords::new(90.0, 120.0)));
    fx.host.emit_transaction();
    let anchor = tracker.anchor().unwrap();
    let before = anchor.rect();

    fx.host.scroll_by(0.0, -80.0);
    assert_eq!(anchor.rect(), before);
    assert_eq!(before, Some(Rect::new(0.0, 100.0, 640.0, 20.0)));
}

#[test]
fn test_teardown_destroys_anchor_and_unsubscribes() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let mut tracker = attach(&fx, true, true);
    select(&fx, (0, Coords::new(10.0, 100.0)), (6, Coords::new(90.0, 120.0)));
    fx.host.emit_transaction();
    let anchor = tracker.anchor().unwrap();

    tracker.teardown();
    assert!(!tracker.is_attached());
    assert_eq!(anchor.rect(), None);
    assert_eq!(fx.host.live_marker_count(), 0);
    assert_eq!(fx.host.subscriber_count(), 0);

    fx.presenter.clear();
    fx.host.emit_transaction();
    assert!(fx.presenter.events().is_empty());

    tracker.teardown();
    assert_eq!(tracker.mode(), None);
}

/// Unmounts the selection tracker as soon as another tracker publishes an anchor.
#[derive(Default)]
struct UnmountingPresenter {
    selection: RefCell<Option<SelectionTracker>>,
}

impl MenuPresenter for UnmountingPresenter {
    fn set_anchor(&self, _target: AnchorTarget) {
        if let Some(tracker) = self.selection.borrow_mut().as_mut() {
            tracker.teardown();
        }
    }

    fn set_visible(&self, _visible: bool) {}
}

#[test]
fn test_teardown_during_signal_delivery_ignores_that_signal() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let block = fx
        .host
        .append_node(fx.host.root(), Rect::new(0.0, 200.0, 600.0, 40.0));
    fx.host.set_selected_element(Some(block));

    let unmounting = Rc::new(UnmountingPresenter::default());
    let content = ContentTracker::attach(
        fx.session.clone(),
        unmounting.clone(),
        ContentTrackerOptions {
            enabled: true,
            anchor_to_content: false,
        },
    );
    let selection = attach(&fx, true, true);
    *unmounting.selection.borrow_mut() = Some(selection);
    select(&fx, (0, Coords::new(10.0, 100.0)), (6, Coords::new(90.0, 120.0)));
    assert_eq!(fx.host.subscriber_count(), 2);

    fx.host.emit_transaction();

    assert!(content.static_anchor().is_some());
    assert_eq!(fx.host.live_marker_count(), 1);
    assert_eq!(fx.host.subscriber_count(), 1);
    assert!(fx.presenter.events().is_empty());
    let selection = unmounting.selection.borrow();
    let selection = selection.as_ref().unwrap();
    assert!(!selection.is_attached());
    assert_eq!(selection.anchor(), None);
    assert_eq!(selection.mode(), None);
}
