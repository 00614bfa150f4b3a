//! Anchor target discovery.
//!
//! Decides which host element the static content anchor should follow: the last AI-marked
//! node (normalized to its block inside the editor root), then the selected element.

use crate::error::AnchorError;
use crate::host::{EditorView, Layout, NodeId};

/// The most recently inserted AI node, as reported by the host.
pub fn last_ai_node<V: EditorView + ?Sized>(view: &V) -> Option<NodeId> {
    view.ai_marked_nodes().last().copied()
}

/// Walk up from `node` to the top-most ancestor whose parent is `root`.
///
/// Returns `node` itself when it is the root or a direct child of it.
pub fn top_most_ancestor_inside<L: Layout + ?Sized>(
    layout: &L,
    node: NodeId,
    root: NodeId,
) -> Result<NodeId, AnchorError> {
    if node == root {
        return Ok(node);
    }
    if !layout.contains(root, node) {
        return Err(AnchorError::NotInsideRoot { node, root });
    }

    let mut current = node;
    while let Some(parent) = layout.parent(current)
        && parent != root
    {
        current = parent;
    }
    Ok(current)
}

/// The last AI-marked node, normalized to its top-most ancestor inside the editor root.
///
/// A marked node outside the root is returned unchanged.
pub fn find_ai_marked_element<V: EditorView + ?Sized>(view: &V) -> Option<NodeId> {
    let last = last_ai_node(view)?;
    match top_most_ancestor_inside(view, last, view.root()) {
        Ok(node) => Some(node),
        Err(err) => {
            tracing::trace!("Using AI node as-is: {}", err);
            Some(last)
        }
    }
}

/// The AI-marked element if there is one, otherwise the selected element.
pub fn find_prioritized_element<V: EditorView + ?Sized>(view: &V) -> Option<NodeId> {
    find_ai_marked_element(view).or_else(|| view.selected_element())
}
