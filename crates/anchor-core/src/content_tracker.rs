//! Content-anchored tracking.
//!
//! [`ContentTracker`] keeps the menu anchored to AI content. It switches between two modes on
//! every mutation signal:
//!
//! - **Streaming**: generation is in flight and content-anchored tracking is enabled. The
//!   last AI node is followed with at most one recomputation per frame, and its own layout
//!   changes (reflow as text streams in) trigger the same coalesced recomputation.
//! - **Static**: anything else. The anchor is rebuilt against the best settled target (last
//!   AI node, AI-marked block, or selected element). No target leaves the anchor untouched.
//!
//! Leaving streaming cancels the pending frame, disconnects the node observer and destroys the
//! streaming anchor before static logic runs, so the two modes never hold live anchors from
//! the same transition.

use crate::anchor::{AnchorHandle, AnchorTarget, VirtualAnchor};
use crate::geometry::editor_width_rect;
use crate::host::{MenuPresenter, MutationSignal, NodeId, SubscriptionId};
use crate::scheduler::DeferredTask;
use crate::session::MenuSession;
use crate::target::{find_prioritized_element, last_ai_node};
use crate::tracker::{Effect, TrackerMode, apply_effects};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Options for [`ContentTracker::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentTrackerOptions {
    /// Whether AI generation is active for this menu. A disabled tracker never subscribes.
    pub enabled: bool,
    /// Follow AI-inserted content (enables streaming mode).
    pub anchor_to_content: bool,
}

struct ContentState {
    session: Rc<MenuSession>,
    presenter: Rc<dyn MenuPresenter>,
    options: ContentTrackerOptions,
    mode: Option<TrackerMode>,
    frame: DeferredTask,
    observed: Option<NodeId>,
    streaming_anchor: Option<VirtualAnchor>,
    static_anchor: Option<VirtualAnchor>,
    hidden_at_crossover: bool,
    recompute_count: u64,
    detached: bool,
}

impl ContentState {
    fn handle_signal(this: &Rc<RefCell<Self>>, signal: &MutationSignal) {
        let Ok(mut state) = this.try_borrow_mut() else {
            tracing::debug!("Content tracker busy, dropping signal v{}", signal.version);
            return;
        };
        // Emitters deliver to a snapshot of subscribers; teardown may have run mid-delivery.
        if state.detached {
            return;
        }

        let host = Rc::clone(state.session.host());
        let effects = if host.ai_status().is_loading() && state.options.anchor_to_content {
            state.handle_streaming(Rc::downgrade(this))
        } else {
            let mut effects = state.leave_streaming();
            effects.extend(state.handle_static());
            effects
        };

        let session = Rc::clone(&state.session);
        let presenter = Rc::clone(&state.presenter);
        drop(state);
        apply_effects(&session, &*presenter, effects);
    }

    // The static anchor is its own slot and stays live while streaming; only leaving
    // streaming has to clear the streaming slot before static logic runs.
    fn handle_streaming(&mut self, weak: Weak<RefCell<Self>>) -> Vec<Effect> {
        if self.mode != Some(TrackerMode::Streaming) {
            tracing::debug!("Content tracker entering streaming mode");
        }
        self.mode = Some(TrackerMode::Streaming);

        let host = Rc::clone(self.session.host());
        let Some(node) = last_ai_node(&*host) else {
            tracing::trace!("Streaming without AI content yet");
            return Vec::new();
        };

        self.schedule_recompute(weak.clone(), node);

        if self.observed != Some(node) {
            if let Some(previous) = self.observed.take() {
                host.unregister(previous);
            }
            host.register(
                node,
                Rc::new(move |node: NodeId| {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    let Ok(mut inner) = state.try_borrow_mut() else {
                        return;
                    };
                    if inner.detached {
                        return;
                    }
                    inner.schedule_recompute(Rc::downgrade(&state), node);
                }),
            );
            self.observed = Some(node);
        }
        Vec::new()
    }

    fn schedule_recompute(&mut self, weak: Weak<RefCell<Self>>, node: NodeId) {
        let host = Rc::clone(self.session.host());
        self.frame.schedule(&*host, move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let Ok(mut inner) = state.try_borrow_mut() else {
                return;
            };
            if inner.detached {
                return;
            }
            let effects = inner.recompute_streaming(node);
            let session = Rc::clone(&inner.session);
            let presenter = Rc::clone(&inner.presenter);
            drop(inner);
            apply_effects(&session, &*presenter, effects);
        });
    }

    fn recompute_streaming(&mut self, node: NodeId) -> Vec<Effect> {
        if self.mode != Some(TrackerMode::Streaming) {
            return Vec::new();
        }

        let host = Rc::clone(self.session.host());
        let root = host.root();
        let Some(rect) = host
            .bounding_rect(node)
            .and_then(|source| editor_width_rect(&*host, root, source))
        else {
            tracing::debug!("Streaming node {:?} vanished before recompute", node);
            return Vec::new();
        };

        if let Some(previous) = self.streaming_anchor.take() {
            previous.destroy();
        }
        match self.session.factory().create(rect, Some(root)) {
            Ok(anchor) => {
                self.recompute_count += 1;
                let handle = anchor.handle();
                self.streaming_anchor = Some(anchor);
                self.publish(handle)
            }
            Err(err) => {
                tracing::debug!("Failed to create streaming anchor: {}", err);
                Vec::new()
            }
        }
    }

    fn leave_streaming(&mut self) -> Vec<Effect> {
        let host = Rc::clone(self.session.host());
        self.frame.cancel(&*host);
        if let Some(node) = self.observed.take() {
            host.unregister(node);
        }
        if let Some(anchor) = self.streaming_anchor.take() {
            anchor.destroy();
        }

        if self.mode == Some(TrackerMode::Streaming) {
            tracing::debug!("Content tracker left streaming mode");
            self.hidden_at_crossover = true;
            vec![Effect::Visible(false)]
        } else {
            Vec::new()
        }
    }

    fn handle_static(&mut self) -> Vec<Effect> {
        self.mode = Some(TrackerMode::Static);

        let host = Rc::clone(self.session.host());
        let root = host.root();
        let target = self
            .options
            .anchor_to_content
            .then(|| last_ai_node(&*host))
            .flatten()
            .or_else(|| find_prioritized_element(&*host).filter(|node| *node != root));
        let Some(target) = target else {
            tracing::trace!("No static anchor target; keeping current anchor");
            return Vec::new();
        };

        let Some(rect) = host
            .bounding_rect(target)
            .and_then(|source| editor_width_rect(&*host, root, source))
        else {
            return Vec::new();
        };

        if let Some(previous) = self.static_anchor.take() {
            previous.destroy();
        }
        match self.session.factory().create(rect, Some(root)) {
            Ok(anchor) => {
                let handle = anchor.handle();
                self.static_anchor = Some(anchor);
                self.publish(handle)
            }
            Err(err) => {
                tracing::debug!("Failed to create static anchor: {}", err);
                Vec::new()
            }
        }
    }

    fn publish(&mut self, handle: AnchorHandle) -> Vec<Effect> {
        let mut effects = vec![Effect::Anchor(AnchorTarget::Virtual(handle))];
        if std::mem::take(&mut self.hidden_at_crossover) {
            effects.push(Effect::Visible(true));
        }
        effects
    }
}

/// Tracks AI content and publishes the anchor the menu should follow.
///
/// The tracker owns its anchors; dropping it tears it down.
///
/// # Example
///
/// ```rust
/// use anchor_core::anchor::AnchorTarget;
/// use anchor_core::config::AnchorConfig;
/// use anchor_core::content_tracker::{ContentTracker, ContentTrackerOptions};
/// use anchor_core::geometry::Rect;
/// use anchor_core::headless::HeadlessHost;
/// use anchor_core::host::{AiStatus, EditorView, MenuPresenter};
/// use anchor_core::session::MenuSession;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Presenter(RefCell<Option<AnchorTarget>>);
///
/// impl MenuPresenter for Presenter {
///     fn set_anchor(&self, target: AnchorTarget) {
///         *self.0.borrow_mut() = Some(target);
///     }
///     fn set_visible(&self, _visible: bool) {}
/// }
///
/// let host = Rc::new(HeadlessHost::new(Rect::new(0.0, 0.0, 600.0, 800.0)));
/// let session = Rc::new(MenuSession::new(host.clone(), &AnchorConfig::default()));
/// let presenter = Rc::new(Presenter::default());
/// let _tracker = ContentTracker::attach(
///     session,
///     presenter.clone(),
///     ContentTrackerOptions { enabled: true, anchor_to_content: true },
/// );
///
/// let node = host.append_node(host.root(), Rect::new(0.0, 100.0, 500.0, 40.0));
/// host.mark_ai(node);
/// host.set_ai_status(AiStatus::Loading);
/// host.emit_transaction();
/// host.run_frame();
///
/// let anchor = presenter.0.borrow().clone().unwrap();
/// assert_eq!(anchor.rect(&*host), Some(Rect::new(0.0, 100.0, 600.0, 40.0)));
/// ```
pub struct ContentTracker {
    state: Rc<RefCell<ContentState>>,
    subscription: Option<SubscriptionId>,
}

impl ContentTracker {
    /// Attach a tracker to `session`'s host. Inert when `options.enabled` is false.
    pub fn attach(
        session: Rc<MenuSession>,
        presenter: Rc<dyn MenuPresenter>,
        options: ContentTrackerOptions,
    ) -> Self {
        let host = Rc::clone(session.host());
        let state = Rc::new(RefCell::new(ContentState {
            session,
            presenter,
            options,
            mode: None,
            frame: DeferredTask::new(),
            observed: None,
            streaming_anchor: None,
            static_anchor: None,
            hidden_at_crossover: false,
            recompute_count: 0,
            detached: false,
        }));

        let subscription = options.enabled.then(|| {
            let weak = Rc::downgrade(&state);
            host.subscribe(Rc::new(move |signal: &MutationSignal| {
                if let Some(state) = weak.upgrade() {
                    ContentState::handle_signal(&state, signal);
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

    /// The mode chosen for the last signal, `None` before the first signal or after teardown.
    pub fn mode(&self) -> Option<TrackerMode> {
        self.state.borrow().mode
    }

    /// The live streaming anchor, if any.
    pub fn streaming_anchor(&self) -> Option<AnchorHandle> {
        self.state
            .borrow()
            .streaming_anchor
            .as_ref()
            .map(VirtualAnchor::handle)
    }

    /// The live static anchor, if any.
    pub fn static_anchor(&self) -> Option<AnchorHandle> {
        self.state
            .borrow()
            .static_anchor
            .as_ref()
            .map(VirtualAnchor::handle)
    }

    /// Whether a streaming recomputation is waiting for the next frame.
    pub fn has_pending_frame(&self) -> bool {
        self.state.borrow().frame.is_pending()
    }

    /// The node whose layout changes are currently observed.
    pub fn observed_node(&self) -> Option<NodeId> {
        self.state.borrow().observed
    }

    /// Number of streaming recomputations that produced an anchor.
    pub fn recompute_count(&self) -> u64 {
        self.state.borrow().recompute_count
    }

    /// Unsubscribe, cancel the pending frame, disconnect the observer and destroy both
    /// anchors, in that order. Calling it again does nothing.
    ///
    /// A signal already being delivered when this runs is ignored once it reaches the tracker.
    pub fn teardown(&mut self) {
        let mut state = self.state.borrow_mut();
        let host = Rc::clone(state.session.host());

        state.detached = true;
        if let Some(id) = self.subscription.take() {
            host.unsubscribe(id);
        }
        state.frame.cancel(&*host);
        if let Some(node) = state.observed.take() {
            host.unregister(node);
        }
        if let Some(anchor) = state.streaming_anchor.take() {
            anchor.destroy();
        }
        if let Some(anchor) = state.static_anchor.take() {
            anchor.destroy();
        }
        state.mode = None;
    }
}

impl Drop for ContentTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}
