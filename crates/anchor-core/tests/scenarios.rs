mod support;

use anchor_core::{
    AiStatus, AnchorTarget, BoxEdges, ContentTracker, ContentTrackerOptions, Coords, EditorView,
    Rect, SelectionState, SelectionTracker, SelectionTrackerOptions, TrackerMode, selection_rect,
};
use support::{Event, anchor_rect, fixture};

#[test]
fn test_streaming_anchor_spans_editor_content_width() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    fx.host.set_box_edges(fx.host.root(), BoxEdges::uniform(10.0, 10.0));
    let tracker = ContentTracker::attach(
        fx.session.clone(),
        fx.presenter.clone(),
        ContentTrackerOptions {
            enabled: true,
            anchor_to_content: true,
        },
    );

    let node = fx
        .host
        .append_node(fx.host.root(), Rect::new(0.0, 100.0, 500.0, 40.0));
    fx.host.mark_ai(node);
    fx.host.set_ai_status(AiStatus::Loading);
    fx.host.emit_transaction();
    assert_eq!(tracker.mode(), Some(TrackerMode::Streaming));
    assert!(fx.presenter.events().is_empty());

    assert_eq!(fx.host.run_frame(), 1);
    let target = fx.presenter.last_anchor().unwrap();
    assert_eq!(
        anchor_rect(&fx, &target),
        Some(Rect::new(20.0, 100.0, 600.0, 40.0))
    );
    assert_eq!(tracker.streaming_anchor().map(AnchorTarget::Virtual), Some(target));
}

#[test]
fn test_reversed_selection_falls_back_to_offset_coordinates() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    fx.host.set_selection(SelectionState::new(12, 4));
    fx.host.set_coords(12, Coords::new(50.0, 10.0));
    fx.host.set_coords(4, Coords::new(30.0, 40.0));

    assert_eq!(
        selection_rect(&*fx.host),
        Some(Rect::new(30.0, 10.0, 20.0, 30.0))
    );

    let _tracker = SelectionTracker::attach(
        fx.session.clone(),
        fx.presenter.clone(),
        SelectionTrackerOptions {
            enabled: true,
            anchor_to_selection: true,
            prevent: false,
        },
    );
    fx.host.emit_transaction();

    let target = fx.presenter.last_anchor().unwrap();
    assert_eq!(
        anchor_rect(&fx, &target),
        Some(Rect::new(0.0, 10.0, 640.0, 30.0))
    );
}

#[test]
fn test_back_to_back_selection_signals_keep_one_anchor() {
    let fx = fixture(Rect::new(0.0, 0.0, 640.0, 1000.0));
    let tracker = SelectionTracker::attach(
        fx.session.clone(),
        fx.presenter.clone(),
        SelectionTrackerOptions {
            enabled: true,
            anchor_to_selection: true,
            prevent: false,
        },
    );

    fx.host.set_selection(SelectionState::new(1, 5));
    fx.host.set_coords(1, Coords::new(10.0, 20.0));
    fx.host.set_coords(5, Coords::new(60.0, 38.0));
    fx.host.emit_transaction();
    let first = tracker.anchor().unwrap();

    fx.host.set_selection(SelectionState::new(7, 9));
    fx.host.set_coords(7, Coords::new(10.0, 200.0));
    fx.host.set_coords(9, Coords::new(40.0, 218.0));
    fx.host.emit_transaction();
    let second = tracker.anchor().unwrap();

    assert_eq!(fx.host.live_marker_count(), 1);
    assert!(!fx.host.has_marker(first.marker()));
    assert!(fx.host.has_marker(second.marker()));
    assert_eq!(first.rect(), None);
    assert_eq!(second.rect(), Some(Rect::new(0.0, 200.0, 640.0, 18.0)));

    let anchors: Vec<_> = fx
        .presenter
        .events()
        .into_iter()
        .filter(|event| matches!(event, Event::Anchor(_)))
        .collect();
    assert_eq!(
        anchors,
        vec![
            Event::Anchor(AnchorTarget::Virtual(first)),
            Event::Anchor(AnchorTarget::Virtual(second)),
        ]
    );
}
