//! Selection-anchored tracking.
//!
//! [`SelectionTracker`] shows the menu next to the current selection. With
//! `anchor_to_selection`, it builds a frozen, editor-width anchor at the selection's bounding
//! rect; otherwise (or when no selection rect is available) it anchors to the element the
//! editor reports as node-selected. Signals with an empty selection are ignored: closing the
//! menu is an explicit action, not a side effect of moving the caret.

use crate::anchor::{AnchorHandle, AnchorTarget, VirtualAnchor};
use crate::geometry::{editor_width_rect, selection_rect};
use crate::host::{MenuPresenter, MutationSignal, SubscriptionId};
use crate::session::MenuSession;
use crate::tracker::{Effect, TrackerMode, apply_effects};
use std::cell::RefCell;
use std::rc::Rc;

/// Options for [`SelectionTracker::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionTrackerOptions {
    /// Whether AI generation is active for this menu; a disabled tracker keeps the menu hidden.
    pub enabled: bool,
    /// Anchor to the text selection's rect instead of the selected element.
    pub anchor_to_selection: bool,
    /// Suppress tracking entirely (no subscription).
    pub prevent: bool,
}

struct SelectionTrackerState {
    session: Rc<MenuSession>,
    presenter: Rc<dyn MenuPresenter>,
    options: SelectionTrackerOptions,
    mode: Option<TrackerMode>,
    anchor: Option<VirtualAnchor>,
    detached: bool,
}

impl SelectionTrackerState {
    fn handle_signal(this: &RefCell<Self>, signal: &MutationSignal) {
        if signal.selection_empty {
            tracing::trace!("Ignoring empty selection (v{})", signal.version);
            return;
        }
        let Ok(mut state) = this.try_borrow_mut() else {
            tracing::debug!("Selection tracker busy, dropping signal v{}", signal.version);
            return;
        };
        if state.detached {
            return;
        }

        let anchored = if state.options.enabled && state.options.anchor_to_selection {
            state.handle_anchored()
        } else {
            None
        };
        let effects = match anchored {
            Some(effects) => effects,
            None => state.handle_default(),
        };

        let session = Rc::clone(&state.session);
        let presenter = Rc::clone(&state.presenter);
        drop(state);
        apply_effects(&session, &*presenter, effects);
    }

    fn handle_anchored(&mut self) -> Option<Vec<Effect>> {
        let host = Rc::clone(self.session.host());
        let rect = selection_rect(&*host)
            .and_then(|selection| editor_width_rect(&*host, host.root(), selection))?;

        if let Some(previous) = self.anchor.take() {
            previous.destroy();
        }
        let anchor = match self.session.factory().create(rect, None) {
            Ok(anchor) => anchor,
            Err(err) => {
                tracing::debug!("Failed to create selection anchor: {}", err);
                return None;
            }
        };
        let target = AnchorTarget::Virtual(anchor.handle());
        self.anchor = Some(anchor);
        self.mode = Some(TrackerMode::SelectionAnchored);
        tracing::trace!("Selection anchor at {:?}", rect);

        Some(vec![
            Effect::MarkOpen(target.clone(), rect),
            Effect::Visible(true),
            Effect::SelectionChanged(target.clone(), rect),
            Effect::Anchor(target),
        ])
    }

    fn handle_default(&mut self) -> Vec<Effect> {
        self.mode = Some(TrackerMode::SelectionDefault);

        let host = Rc::clone(self.session.host());
        let selected = host.selected_element();
        let visible = selected.is_some() && self.options.enabled;

        let mut effects = vec![Effect::Visible(visible)];
        if visible
            && let Some(element) = selected
            && let Some(rect) = host.bounding_rect(element)
        {
            let target = AnchorTarget::Element(element);
            effects.push(Effect::SelectionChanged(target.clone(), rect));
            effects.push(Effect::Anchor(target));
        }
        effects
    }
}

/// Tracks the selection and publishes where the menu should appear.
///
/// Dropping the tracker tears it down.
pub struct SelectionTracker {
    state: Rc<RefCell<SelectionTrackerState>>,
    subscription: Option<SubscriptionId>,
}

impl SelectionTracker {
    /// Attach a tracker to `session`'s host. Inert when `options.prevent` is set.
    pub fn attach(
        session: Rc<MenuSession>,
        presenter: Rc<dyn MenuPresenter>,
        options: SelectionTrackerOptions,
    ) -> Self {
        let host = Rc::clone(session.host());
        let state = Rc::new(RefCell::new(SelectionTrackerState {
            session,
            presenter,
            options,
            mode: None,
            anchor: None,
            detached: false,
        }));

        let subscription = (!options.prevent).then(|| {
            let weak = Rc::downgrade(&state);
            host.subscribe(Rc::new(move |signal: &MutationSignal| {
                if let Some(state) = weak.upgrade() {
                    SelectionTrackerState::handle_signal(&state, signal);
                }
            }))
        });

        Self {
            state,
            subscription,
        }
    }

    /// Whether the tracker is still subscribed to mutation signals.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// The path taken for the last non-empty selection signal.
    pub fn mode(&self) -> Option<TrackerMode> {
        self.state.borrow().mode
    }

    /// The live selection anchor, if any.
    pub fn anchor(&self) -> Option<AnchorHandle> {
        self.state.borrow().anchor.as_ref().map(VirtualAnchor::handle)
    }

    /// Unsubscribe and destroy the selection anchor. Calling it again does nothing.
    pub fn teardown(&mut self) {
        let mut state = self.state.borrow_mut();
        let host = Rc::clone(state.session.host());

        state.detached = true;
        if let Some(id) = self.subscription.take() {
            host.unsubscribe(id);
        }
        if let Some(anchor) = state.anchor.take() {
            anchor.destroy();
        }
        state.mode = None;
    }
}

impl Drop for SelectionTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnchorConfig;
    use crate::geometry::Rect;
    use crate::headless::HeadlessHost;
    use crate::host::SelectionState;

    #[derive(Default)]
    struct VisibilityLog(RefCell<Vec<bool>>);

    impl MenuPresenter for VisibilityLog {
        fn set_anchor(&self, _target: AnchorTarget) {}

        fn set_visible(&self, visible: bool) {
            self.0.borrow_mut().push(visible);
        }
    }

    #[test]
    fn test_prevent_skips_subscription() {
        let host = Rc::new(HeadlessHost::new(Rect::new(0.0, 0.0, 600.0, 800.0)));
        let session = Rc::new(MenuSession::new(host.clone(), &AnchorConfig::default()));
        let tracker = SelectionTracker::attach(
            session,
            Rc::new(VisibilityLog::default()),
            SelectionTrackerOptions {
                enabled: true,
                anchor_to_selection: true,
                prevent: true,
            },
        );
        assert!(!tracker.is_attached());
        assert_eq!(host.subscriber_count(), 0);
    }

    #[test]
    fn test_disabled_feature_hides_menu() {
        let host = Rc::new(HeadlessHost::new(Rect::new(0.0, 0.0, 600.0, 800.0)));
        let session = Rc::new(MenuSession::new(host.clone(), &AnchorConfig::default()));
        let presenter = Rc::new(VisibilityLog::default());
        let tracker = SelectionTracker::attach(
            session,
            presenter.clone(),
            SelectionTrackerOptions {
                enabled: false,
                anchor_to_selection: true,
                prevent: false,
            },
        );
        host.set_selection(SelectionState::new(0, 4));
        host.emit_transaction();

        assert_eq!(*presenter.0.borrow(), vec![false]);
        assert_eq!(tracker.mode(), Some(TrackerMode::SelectionDefault));
        assert!(tracker.anchor().is_none());
    }
}
