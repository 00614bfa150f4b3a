//! In-memory reference host.
//!
//! [`HeadlessHost`] implements every host trait over a flat node table with explicit rects.
//! Nothing happens on its own: tests and demos drive it by mutating nodes, emitting
//! transactions with [`emit_transaction`](HeadlessHost::emit_transaction), and advancing the
//! frame clock with [`run_frame`](HeadlessHost::run_frame).
//!
//! # Example
//!
//! ```rust
//! use anchor_core::geometry::Rect;
//! use anchor_core::headless::HeadlessHost;
//! use anchor_core::host::{EditorView, Layout};
//!
//! let host = HeadlessHost::new(Rect::new(0.0, 0.0, 640.0, 480.0));
//! let paragraph = host.append_node(host.root(), Rect::new(0.0, 10.0, 640.0, 20.0));
//! host.mark_ai(paragraph);
//!
//! assert_eq!(host.ai_marked_nodes(), vec![paragraph]);
//! assert!(host.contains(host.root(), paragraph));
//! ```

use crate::geometry::{BoxEdges, Rect};
use crate::host::{
    AiStatus, ChangeObserver, Coords, DomRange, EditorView, FrameCallback, FrameScheduler,
    FrameToken, Layout, MarkerId, MarkerLayer, MutationSignal, NodeId, ObserverCallback,
    SelectionState, SignalCallback, SignalSource, SubscriptionId,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, Copy)]
struct NodeData {
    parent: Option<NodeId>,
    rect: Rect,
    edges: BoxEdges,
}

/// A scriptable host with a manual frame clock.
pub struct HeadlessHost {
    body: NodeId,
    root: NodeId,
    next_id: Cell<u64>,
    nodes: RefCell<BTreeMap<NodeId, NodeData>>,
    ai_marked: RefCell<Vec<NodeId>>,
    selected: Cell<Option<NodeId>>,
    ai_status: Cell<AiStatus>,
    selection: Cell<SelectionState>,
    dom_selection: Cell<Option<DomRange>>,
    coords: RefCell<HashMap<usize, Coords>>,
    markers: RefCell<BTreeMap<MarkerId, (NodeId, String)>>,
    frames: RefCell<BTreeMap<FrameToken, FrameCallback>>,
    observers: RefCell<HashMap<NodeId, ObserverCallback>>,
    subscribers: RefCell<Vec<(SubscriptionId, SignalCallback)>>,
    version: Cell<u64>,
}

impl HeadlessHost {
    /// Create a host whose editor root occupies `editor_rect` inside a document body.
    pub fn new(editor_rect: Rect) -> Self {
        let body = NodeId(0);
        let root = NodeId(1);
        let body_rect = Rect::new(
            0.0,
            0.0,
            editor_rect.right().max(0.0),
            editor_rect.bottom().max(0.0),
        );

        let mut nodes = BTreeMap::new();
        nodes.insert(
            body,
            NodeData {
                parent: None,
                rect: body_rect,
                edges: BoxEdges::default(),
            },
        );
        nodes.insert(
            root,
            NodeData {
                parent: Some(body),
                rect: editor_rect,
                edges: BoxEdges::default(),
            },
        );

        Self {
            body,
            root,
            next_id: Cell::new(2),
            nodes: RefCell::new(nodes),
            ai_marked: RefCell::new(Vec::new()),
            selected: Cell::new(None),
            ai_status: Cell::new(AiStatus::Idle),
            selection: Cell::new(SelectionState::default()),
            dom_selection: Cell::new(None),
            coords: RefCell::new(HashMap::new()),
            markers: RefCell::new(BTreeMap::new()),
            frames: RefCell::new(BTreeMap::new()),
            observers: RefCell::new(HashMap::new()),
            subscribers: RefCell::new(Vec::new()),
            version: Cell::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// The document body (parent of the editor root and of every marker).
    pub fn document_body(&self) -> NodeId {
        self.body
    }

    /// Append a child node with the given rect.
    pub fn append_node(&self, parent: NodeId, rect: Rect) -> NodeId {
        let id = NodeId(self.next_id());
        self.nodes.borrow_mut().insert(
            id,
            NodeData {
                parent: Some(parent),
                rect,
                edges: BoxEdges::default(),
            },
        );
        id
    }

    /// Remove `node` and its whole subtree.
    pub fn remove_node(&self, node: NodeId) {
        let removed: Vec<NodeId> = {
            let nodes = self.nodes.borrow();
            nodes
                .keys()
                .copied()
                .filter(|id| self.contains(node, *id))
                .collect()
        };

        {
            let mut nodes = self.nodes.borrow_mut();
            let mut observers = self.observers.borrow_mut();
            for id in &removed {
                nodes.remove(id);
                observers.remove(id);
            }
        }
        self.ai_marked.borrow_mut().retain(|id| !removed.contains(id));
        if self.selected.get().is_some_and(|id| removed.contains(&id)) {
            self.selected.set(None);
        }
    }

    /// Replace a node's rect. Observers of the node are notified when its size changes.
    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        let resized = {
            let mut nodes = self.nodes.borrow_mut();
            let Some(data) = nodes.get_mut(&node) else {
                return;
            };
            let resized = data.rect.width != rect.width || data.rect.height != rect.height;
            data.rect = rect;
            resized
        };

        if resized {
            self.notify_layout_change(node);
        }
    }

    /// Set a node's horizontal padding/border.
    pub fn set_box_edges(&self, node: NodeId, edges: BoxEdges) {
        if let Some(data) = self.nodes.borrow_mut().get_mut(&node) {
            data.edges = edges;
        }
    }

    /// Move `node` and its descendants by `(dx, dy)`.
    pub fn translate(&self, node: NodeId, dx: f64, dy: f64) {
        let moved: Vec<NodeId> = {
            let nodes = self.nodes.borrow();
            nodes
                .keys()
                .copied()
                .filter(|id| self.contains(node, *id))
                .collect()
        };
        let mut nodes = self.nodes.borrow_mut();
        for id in moved {
            if let Some(data) = nodes.get_mut(&id) {
                data.rect = data.rect.translated(dx, dy);
            }
        }
    }

    /// Scroll the viewport: every node moves by `(dx, dy)`.
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        self.translate(self.body, dx, dy);
    }

    /// Tag `node` as AI-inserted. Marked nodes are reported in marking order.
    pub fn mark_ai(&self, node: NodeId) {
        let mut marked = self.ai_marked.borrow_mut();
        if !marked.contains(&node) {
            marked.push(node);
        }
    }

    /// Set or clear the explicitly node-selected element.
    pub fn set_selected_element(&self, node: Option<NodeId>) {
        self.selected.set(node);
    }

    /// Set the AI generation status.
    pub fn set_ai_status(&self, status: AiStatus) {
        self.ai_status.set(status);
    }

    /// Set the document selection.
    pub fn set_selection(&self, selection: SelectionState) {
        self.selection.set(selection);
    }

    /// Set or clear the live UI selection range.
    pub fn set_dom_selection(&self, range: Option<DomRange>) {
        self.dom_selection.set(range);
    }

    /// Map document offset `pos` to viewport coordinates.
    pub fn set_coords(&self, pos: usize, coords: Coords) {
        self.coords.borrow_mut().insert(pos, coords);
    }

    /// Emit a mutation signal for the current selection to every subscriber, in subscription
    /// order.
    pub fn emit_transaction(&self) -> MutationSignal {
        let version = self.version.get() + 1;
        self.version.set(version);
        let signal = MutationSignal::new(version, self.selection.get().is_empty());

        // Subscribers may subscribe/unsubscribe while handling the signal.
        let subscribers: Vec<SignalCallback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(&signal);
        }
        signal
    }

    /// Run every callback pending at the start of this frame, in request order.
    ///
    /// Callbacks are taken one at a time, so a callback cancelled by an earlier one in the same
    /// frame does not run. Callbacks requested while the frame runs are deferred to the next
    /// frame. Returns the number of callbacks that ran.
    pub fn run_frame(&self) -> usize {
        let due: Vec<FrameToken> = self.frames.borrow().keys().copied().collect();
        let mut count = 0;
        for token in due {
            let callback = self.frames.borrow_mut().remove(&token);
            if let Some(callback) = callback {
                callback();
                count += 1;
            }
        }
        count
    }

    /// Fire the layout-change observer registered for `node`, if any.
    pub fn notify_layout_change(&self, node: NodeId) {
        let callback = self.observers.borrow().get(&node).cloned();
        if let Some(callback) = callback {
            callback(node);
        }
    }

    /// Number of frame callbacks waiting to run.
    pub fn pending_frame_count(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Number of markers currently attached.
    pub fn live_marker_count(&self) -> usize {
        self.markers.borrow().len()
    }

    /// Whether `marker` is still attached.
    pub fn has_marker(&self, marker: MarkerId) -> bool {
        self.markers.borrow().contains_key(&marker)
    }

    /// Nodes with a registered layout-change observer.
    pub fn observed_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.observers.borrow().keys().copied().collect();
        nodes.sort();
        nodes
    }

    /// Number of active mutation-signal subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl Layout for HeadlessHost {
    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.nodes.borrow().get(&node).map(|data| data.rect)
    }

    fn box_edges(&self, node: NodeId) -> BoxEdges {
        self.nodes
            .borrow()
            .get(&node)
            .map(|data| data.edges)
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(&node).and_then(|data| data.parent)
    }
}

impl EditorView for HeadlessHost {
    fn root(&self) -> NodeId {
        self.root
    }

    fn ai_marked_nodes(&self) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        self.ai_marked
            .borrow()
            .iter()
            .copied()
            .filter(|id| nodes.contains_key(id))
            .collect()
    }

    fn selected_element(&self) -> Option<NodeId> {
        self.selected.get()
    }

    fn ai_status(&self) -> AiStatus {
        self.ai_status.get()
    }

    fn selection(&self) -> SelectionState {
        self.selection.get()
    }

    fn dom_selection(&self) -> Option<DomRange> {
        self.dom_selection.get()
    }

    fn coords_at_pos(&self, pos: usize) -> Option<Coords> {
        self.coords.borrow().get(&pos).copied()
    }
}

impl MarkerLayer for HeadlessHost {
    fn document_root(&self) -> NodeId {
        self.body
    }

    fn append_marker(&self, tag: &str) -> MarkerId {
        let marker = MarkerId(self.next_id());
        self.markers
            .borrow_mut()
            .insert(marker, (self.body, tag.to_string()));
        marker
    }

    fn remove_marker(&self, marker: MarkerId) -> bool {
        self.markers.borrow_mut().remove(&marker).is_some()
    }

    fn contains_marker(&self, marker: MarkerId) -> bool {
        self.has_marker(marker)
    }

    fn markers_under(&self, root: NodeId, tag: &str) -> Vec<MarkerId> {
        self.markers
            .borrow()
            .iter()
            .filter(|(_, (parent, marker_tag))| marker_tag == tag && self.contains(root, *parent))
            .map(|(marker, _)| *marker)
            .collect()
    }
}

impl ChangeObserver for HeadlessHost {
    fn register(&self, node: NodeId, callback: ObserverCallback) {
        self.observers.borrow_mut().insert(node, callback);
    }

    fn unregister(&self, node: NodeId) {
        self.observers.borrow_mut().remove(&node);
    }
}

impl FrameScheduler for HeadlessHost {
    fn request_frame(&self, callback: FrameCallback) -> FrameToken {
        let token = FrameToken(self.next_id());
        self.frames.borrow_mut().insert(token, callback);
        token
    }

    fn cancel_frame(&self, token: FrameToken) {
        self.frames.borrow_mut().remove(&token);
    }
}

impl SignalSource for HeadlessHost {
    fn subscribe(&self, callback: SignalCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id());
        self.subscribers.borrow_mut().push((id, callback));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .borrow_mut()
            .retain(|(subscription, _)| *subscription != id);
    }
}
