//! Host environment interfaces.
//!
//! `anchor-core` never touches a real document tree. Everything it needs from the editor
//! environment (layout geometry, the AI-marked nodes, the current selection, marker nodes,
//! frame scheduling, layout-change observation, mutation signals) is expressed as a trait in
//! this module, and everything it produces for the menu layer goes through [`MenuPresenter`].
//!
//! A host implements the individual capability traits; [`Host`] is blanket-implemented for
//! any type that provides all of them. [`HeadlessHost`](crate::headless::HeadlessHost) is the
//! in-memory reference implementation.

use crate::anchor::AnchorTarget;
use crate::geometry::{BoxEdges, Rect};
use std::rc::Rc;

/// Identifier of a layout node (element) owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// Identifier of an invisible anchor marker appended by [`MarkerLayer::append_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Token for a pending frame callback, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameToken(pub u64);

/// Identifier of a mutation-signal subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Status of the AI generation pipeline for one editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiStatus {
    /// No generation has been requested.
    #[default]
    Idle,
    /// A generation is in flight and content may still be streaming in.
    Loading,
    /// The last generation finished.
    Done,
    /// The last generation failed.
    Error,
}

impl AiStatus {
    /// Whether generation is currently in flight.
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// The editor's current document selection, as document offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionState {
    /// Anchor-side offset.
    pub from: usize,
    /// Head-side offset.
    pub to: usize,
}

impl SelectionState {
    /// Create a selection spanning `from..to`.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// A collapsed selection (caret) at `pos`.
    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    /// Whether the selection is collapsed.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Viewport coordinates of a document offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coords {
    /// Horizontal viewport position.
    pub left: f64,
    /// Vertical viewport position.
    pub top: f64,
}

impl Coords {
    /// Create a coordinate pair.
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// The live UI selection range as the host's rendering layer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomRange {
    /// Bounding rect of the range.
    pub rect: Rect,
    /// Deepest node containing both ends of the range.
    pub common_ancestor: NodeId,
}

/// Notification that an editor transaction was applied.
///
/// Only the selection emptiness travels with the signal; everything else is read back from the
/// host when the signal is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationSignal {
    /// Monotonic transaction number assigned by the host.
    pub version: u64,
    /// Whether the selection resulting from the transaction is empty.
    pub selection_empty: bool,
}

impl MutationSignal {
    /// Create a mutation signal.
    pub fn new(version: u64, selection_empty: bool) -> Self {
        Self {
            version,
            selection_empty,
        }
    }
}

/// Mutation-signal callback.
pub type SignalCallback = Rc<dyn Fn(&MutationSignal)>;
/// One-shot callback run on the next frame.
pub type FrameCallback = Box<dyn FnOnce()>;
/// Layout-change callback; receives the observed node.
pub type ObserverCallback = Rc<dyn Fn(NodeId)>;

/// Read-only layout queries.
pub trait Layout {
    /// Current viewport-relative bounding rect of `node`, or `None` if the node is gone.
    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;

    /// Horizontal padding and border widths of `node`.
    fn box_edges(&self, node: NodeId) -> BoxEdges;

    /// Parent of `node`, if any.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

/// Editor-level queries.
pub trait EditorView: Layout {
    /// The editor's root element.
    fn root(&self) -> NodeId;

    /// All nodes tagged as AI-inserted, in document order.
    fn ai_marked_nodes(&self) -> Vec<NodeId>;

    /// The single explicitly node-selected element, if any.
    fn selected_element(&self) -> Option<NodeId>;

    /// Whether generation is in flight for this editor.
    fn ai_status(&self) -> AiStatus;

    /// Current document selection.
    fn selection(&self) -> SelectionState;

    /// Live UI selection range, if the rendering layer has one.
    fn dom_selection(&self) -> Option<DomRange>;

    /// Viewport coordinates of document offset `pos`.
    fn coords_at_pos(&self, pos: usize) -> Option<Coords>;
}

/// Creation and removal of invisible marker nodes.
pub trait MarkerLayer {
    /// The node markers are appended to (the document body).
    fn document_root(&self) -> NodeId;

    /// Append an invisible, zero-size, non-interactive marker tagged with `tag`.
    fn append_marker(&self, tag: &str) -> MarkerId;

    /// Remove a marker. Returns `false` if it was already gone.
    fn remove_marker(&self, marker: MarkerId) -> bool;

    /// Whether `marker` is still attached.
    fn contains_marker(&self, marker: MarkerId) -> bool;

    /// All markers tagged with `tag` under `root`.
    fn markers_under(&self, root: NodeId, tag: &str) -> Vec<MarkerId>;
}

/// Layout-change observation, one callback per node.
pub trait ChangeObserver {
    /// Observe `node`, replacing any callback already registered for it.
    fn register(&self, node: NodeId, callback: ObserverCallback);

    /// Stop observing `node`. No-op when not observed.
    fn unregister(&self, node: NodeId);
}

/// Next-frame scheduling.
pub trait FrameScheduler {
    /// Run `callback` on the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameToken;

    /// Cancel a pending frame callback. No-op when it already ran or was cancelled.
    fn cancel_frame(&self, token: FrameToken);
}

/// Mutation-signal subscription.
pub trait SignalSource {
    /// Subscribe to every applied transaction.
    fn subscribe(&self, callback: SignalCallback) -> SubscriptionId;

    /// Drop a subscription. No-op when unknown.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Everything the trackers need from a host.
pub trait Host: EditorView + MarkerLayer + ChangeObserver + FrameScheduler + SignalSource {}

impl<T> Host for T where
    T: EditorView + MarkerLayer + ChangeObserver + FrameScheduler + SignalSource + ?Sized
{
}

/// Consumer of tracker output: the layer that positions and shows the floating menu.
pub trait MenuPresenter {
    /// Position the menu against `target`.
    fn set_anchor(&self, target: AnchorTarget);

    /// Show or hide the menu.
    fn set_visible(&self, visible: bool);

    /// Raw geometry notification for selection-driven placement.
    fn selection_changed(&self, _target: &AnchorTarget, _rect: Rect) {}
}
