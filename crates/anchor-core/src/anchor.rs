//! Virtual anchors.
//!
//! A [`VirtualAnchor`] pairs an invisible marker node (appended through
//! [`MarkerLayer`](crate::host::MarkerLayer)) with a rectangle the floating menu positions
//! against. The rectangle is either a frozen snapshot or is recomputed from a reference
//! element's live rect plus an offset captured at creation, so a reference-tracked anchor
//! follows scrolling without any new mutation signal.
//!
//! Ownership is exclusive: the tracker that created an anchor holds the [`VirtualAnchor`] and
//! hands out [`AnchorHandle`]s, which stop resolving once the owner destroys the anchor.

use crate::error::AnchorError;
use crate::geometry::Rect;
use crate::host::{Host, Layout, MarkerId, MarkerLayer, NodeId};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Default tag applied to every marker so a sweep can find leaked ones.
pub const DEFAULT_MARKER_TAG: &str = "data-fallback-anchor";

/// Offset of an anchor rect from its reference element, captured once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReferenceOffset {
    /// Vertical offset from the reference's top edge.
    pub top: f64,
    /// Horizontal offset from the reference's left edge.
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AnchorGeometry {
    Frozen(Rect),
    Tracked {
        reference: NodeId,
        offset: ReferenceOffset,
        snapshot: Rect,
    },
}

struct AnchorCell {
    marker: MarkerId,
    geometry: AnchorGeometry,
    live: Cell<bool>,
    host: Rc<dyn Host>,
}

impl AnchorCell {
    fn rect(&self) -> Rect {
        match self.geometry {
            AnchorGeometry::Frozen(rect) => rect,
            AnchorGeometry::Tracked {
                reference,
                offset,
                snapshot,
            } => match self.host.bounding_rect(reference) {
                Some(current) => Rect::new(
                    current.left + offset.left,
                    current.top + offset.top,
                    snapshot.width,
                    snapshot.height,
                ),
                None => snapshot,
            },
        }
    }

    // A marker swept out from under its owner counts as destroyed.
    fn is_live(&self) -> bool {
        self.live.get() && self.host.contains_marker(self.marker)
    }

    fn destroy(&self) -> bool {
        if !self.live.replace(false) {
            return false;
        }
        self.host.remove_marker(self.marker)
    }
}

/// An owned anchor. Destroyed explicitly with [`destroy`](Self::destroy) or on drop.
pub struct VirtualAnchor {
    cell: Rc<AnchorCell>,
}

impl VirtualAnchor {
    /// Current rect. Reference-tracked anchors recompute from the reference's live rect and
    /// fall back to the creation snapshot if the reference is gone.
    pub fn rect(&self) -> Rect {
        self.cell.rect()
    }

    /// A non-owning handle for consumers.
    pub fn handle(&self) -> AnchorHandle {
        AnchorHandle {
            cell: Rc::clone(&self.cell),
        }
    }

    /// The marker backing this anchor.
    pub fn marker(&self) -> MarkerId {
        self.cell.marker
    }

    /// The reference element and captured offset, for reference-tracked anchors.
    pub fn reference(&self) -> Option<(NodeId, ReferenceOffset)> {
        match self.cell.geometry {
            AnchorGeometry::Frozen(_) => None,
            AnchorGeometry::Tracked {
                reference, offset, ..
            } => Some((reference, offset)),
        }
    }

    /// Whether the anchor has not been destroyed or swept yet.
    pub fn is_live(&self) -> bool {
        self.cell.is_live()
    }

    /// Remove the marker. Returns `false` (and does nothing) if already destroyed or swept.
    pub fn destroy(&self) -> bool {
        let removed = self.cell.destroy();
        if removed {
            tracing::trace!("Destroyed anchor marker {:?}", self.cell.marker);
        }
        removed
    }
}

impl Drop for VirtualAnchor {
    fn drop(&mut self) {
        self.cell.destroy();
    }
}

impl fmt::Debug for VirtualAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualAnchor")
            .field("marker", &self.cell.marker)
            .field("geometry", &self.cell.geometry)
            .field("live", &self.cell.is_live())
            .finish()
    }
}

/// A consumer's view of a [`VirtualAnchor`].
///
/// Handles never keep the marker alive; once the owner destroys the anchor, [`rect`](Self::rect)
/// returns `None`.
#[derive(Clone)]
pub struct AnchorHandle {
    cell: Rc<AnchorCell>,
}

impl AnchorHandle {
    /// Current rect, or `None` once the anchor was destroyed or its marker swept.
    pub fn rect(&self) -> Option<Rect> {
        self.cell.is_live().then(|| self.cell.rect())
    }

    /// Whether the owning anchor is still alive.
    pub fn is_live(&self) -> bool {
        self.cell.is_live()
    }

    /// The marker backing this anchor.
    pub fn marker(&self) -> MarkerId {
        self.cell.marker
    }
}

impl PartialEq for AnchorHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl fmt::Debug for AnchorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorHandle")
            .field("marker", &self.cell.marker)
            .field("live", &self.cell.is_live())
            .finish()
    }
}

/// What the floating menu is positioned against.
#[derive(Debug, Clone, PartialEq)]
pub enum AnchorTarget {
    /// A virtual anchor created by a tracker.
    Virtual(AnchorHandle),
    /// A host element, used directly.
    Element(NodeId),
}

impl AnchorTarget {
    /// Resolve the target's current rect. `None` for destroyed anchors or vanished elements.
    pub fn rect<L: Layout + ?Sized>(&self, layout: &L) -> Option<Rect> {
        match self {
            Self::Virtual(handle) => handle.rect(),
            Self::Element(node) => layout.bounding_rect(*node),
        }
    }
}

/// Creates virtual anchors against one host.
#[derive(Clone)]
pub struct AnchorFactory {
    host: Rc<dyn Host>,
    tag: String,
}

impl AnchorFactory {
    /// Create a factory that tags markers with `tag`.
    pub fn new(host: Rc<dyn Host>, tag: impl Into<String>) -> Self {
        Self {
            host,
            tag: tag.into(),
        }
    }

    /// The marker tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The host this factory appends markers to.
    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    /// Create an anchor reporting `rect`.
    ///
    /// With a `reference`, the offset between `rect` and the reference's current rect is
    /// captured and later `rect()` calls follow the reference. Fails if the host does not know
    /// the reference element.
    pub fn create(
        &self,
        rect: Rect,
        reference: Option<NodeId>,
    ) -> Result<VirtualAnchor, AnchorError> {
        let geometry = match reference {
            Some(reference) => {
                let reference_rect = self
                    .host
                    .bounding_rect(reference)
                    .ok_or(AnchorError::NodeNotFound(reference))?;
                AnchorGeometry::Tracked {
                    reference,
                    offset: ReferenceOffset {
                        top: rect.top - reference_rect.top,
                        left: rect.left - reference_rect.left,
                    },
                    snapshot: rect,
                }
            }
            None => AnchorGeometry::Frozen(rect),
        };

        let marker = self.host.append_marker(&self.tag);
        tracing::trace!("Created anchor marker {:?} at {:?}", marker, rect);
        Ok(VirtualAnchor {
            cell: Rc::new(AnchorCell {
                marker,
                geometry,
                live: Cell::new(true),
                host: Rc::clone(&self.host),
            }),
        })
    }

    /// Remove every marker carrying this factory's tag under the document root.
    pub fn sweep_orphans(&self) -> usize {
        sweep_orphans(&*self.host, self.host.document_root(), &self.tag)
    }
}

/// Remove every marker tagged `tag` under `root`, returning how many were removed.
///
/// This is recovery for teardown paths the host could not order (fast unmounts, error paths),
/// not a failure to report. Anchors whose markers are swept stop resolving through their
/// handles.
pub fn sweep_orphans<M: MarkerLayer + ?Sized>(markers: &M, root: NodeId, tag: &str) -> usize {
    let removed = markers
        .markers_under(root, tag)
        .into_iter()
        .filter(|marker| markers.remove_marker(*marker))
        .count();
    if removed > 0 {
        tracing::warn!("Swept {} orphaned anchor markers tagged {:?}", removed, tag);
    }
    removed
}
