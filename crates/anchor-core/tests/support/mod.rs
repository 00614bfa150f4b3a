#![allow(dead_code)]

use anchor_core::{AnchorConfig, AnchorTarget, HeadlessHost, MenuPresenter, MenuSession, Rect};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Anchor(AnchorTarget),
    Visible(bool),
    SelectionChanged(AnchorTarget, Rect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostSnapshot {
    pub pending_frames: usize,
    pub live_markers: usize,
    pub observers: usize,
}

/// Records every presenter call together with the host's resource counts at that moment.
pub struct RecordingPresenter {
    host: Rc<HeadlessHost>,
    events: RefCell<Vec<(Event, HostSnapshot)>>,
}

impl RecordingPresenter {
    pub fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            host,
            events: RefCell::new(Vec::new()),
        }
    }

    fn record(&self, event: Event) {
        let snapshot = HostSnapshot {
            pending_frames: self.host.pending_frame_count(),
            live_markers: self.host.live_marker_count(),
            observers: self.host.observed_nodes().len(),
        };
        self.events.borrow_mut().push((event, snapshot));
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn snapshots(&self) -> Vec<(Event, HostSnapshot)> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn last_anchor(&self) -> Option<AnchorTarget> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find_map(|(event, _)| match event {
                Event::Anchor(target) => Some(target.clone()),
                _ => None,
            })
    }

    pub fn last_visible(&self) -> Option<bool> {
        self.events
            .borrow()
            .iter()
            .rev()
            .find_map(|(event, _)| match event {
                Event::Visible(visible) => Some(*visible),
                _ => None,
            })
    }
}

impl MenuPresenter for RecordingPresenter {
    fn set_anchor(&self, target: AnchorTarget) {
        self.record(Event::Anchor(target));
    }

    fn set_visible(&self, visible: bool) {
        self.record(Event::Visible(visible));
    }

    fn selection_changed(&self, target: &AnchorTarget, rect: Rect) {
        self.record(Event::SelectionChanged(target.clone(), rect));
    }
}

pub struct Fixture {
    pub host: Rc<HeadlessHost>,
    pub session: Rc<MenuSession>,
    pub presenter: Rc<RecordingPresenter>,
}

pub fn fixture(editor_rect: Rect) -> Fixture {
    fixture_with_config(editor_rect, &AnchorConfig::default())
}

pub fn fixture_with_config(editor_rect: Rect, config: &AnchorConfig) -> Fixture {
    let host = Rc::new(HeadlessHost::new(editor_rect));
    let session = Rc::new(MenuSession::new(host.clone(), config));
    let presenter = Rc::new(RecordingPresenter::new(host.clone()));
    Fixture {
        host,
        session,
        presenter,
    }
}

pub fn anchor_rect(fixture: &Fixture, target: &AnchorTarget) -> Option<Rect> {
    target.rect(&*fixture.host)
}
