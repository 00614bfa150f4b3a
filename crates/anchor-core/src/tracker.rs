//! Pieces shared by the content and selection trackers.

use crate::anchor::AnchorTarget;
use crate::geometry::Rect;
use crate::host::MenuPresenter;
use crate::session::{FallbackAnchor, MenuSession, MenuStateUpdate};

/// Which strategy produced a tracker's current anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerMode {
    /// Following AI content while it streams in.
    Streaming,
    /// Anchored to settled content.
    Static,
    /// Anchored to the text selection's bounding rect.
    SelectionAnchored,
    /// Anchored to the explicitly selected element.
    SelectionDefault,
}

/// Output computed while a tracker's state is borrowed, applied after the borrow ends so
/// presenters and session subscribers may call back into the tracker.
#[derive(Debug)]
pub(crate) enum Effect {
    Anchor(AnchorTarget),
    Visible(bool),
    SelectionChanged(AnchorTarget, Rect),
    MarkOpen(AnchorTarget, Rect),
}

pub(crate) fn apply_effects(
    session: &MenuSession,
    presenter: &dyn MenuPresenter,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::Anchor(target) => presenter.set_anchor(target),
            Effect::Visible(visible) => presenter.set_visible(visible),
            Effect::SelectionChanged(target, rect) => presenter.selection_changed(&target, rect),
            Effect::MarkOpen(target, rect) => session.update(
                MenuStateUpdate::new()
                    .is_open(true)
                    .fallback_anchor(FallbackAnchor {
                        element: Some(target),
                        rect: Some(rect),
                    }),
            ),
        }
    }
}
