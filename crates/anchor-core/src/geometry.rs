//! Rectangle math for anchor placement.
//!
//! All functions here are read-only: they query the host through [`Layout`] / [`EditorView`]
//! and never mutate host state.

use crate::host::{EditorView, Layout, NodeId};
use regex::Regex;
use std::sync::LazyLock;

static CSS_NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("valid css number regex")
});

/// A viewport-relative rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width (non-negative for rects produced by this crate).
    pub width: f64,
    /// Height (non-negative for rects produced by this crate).
    pub height: f64,
}

impl Rect {
    /// Create a rect from its left/top corner and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// The same rect moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Whether the rect has no area.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Horizontal content area of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentSpan {
    /// Left edge of the content box.
    pub left: f64,
    /// Width of the content box.
    pub width: f64,
}

/// Horizontal box-model edges of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxEdges {
    /// Left padding.
    pub padding_left: f64,
    /// Right padding.
    pub padding_right: f64,
    /// Left border width.
    pub border_left: f64,
    /// Right border width.
    pub border_right: f64,
}

impl BoxEdges {
    /// Uniform padding and border on both sides.
    pub fn uniform(padding: f64, border: f64) -> Self {
        Self {
            padding_left: padding,
            padding_right: padding,
            border_left: border,
            border_right: border,
        }
    }

    /// Build edges from computed-style strings such as `"12px"`.
    ///
    /// Values are parsed with [`parse_css_px`], so unparsable values count as zero.
    pub fn from_css(
        padding_left: &str,
        padding_right: &str,
        border_left: &str,
        border_right: &str,
    ) -> Self {
        Self {
            padding_left: parse_css_px(padding_left),
            padding_right: parse_css_px(padding_right),
            border_left: parse_css_px(border_left),
            border_right: parse_css_px(border_right),
        }
    }

    /// Total horizontal inset (both paddings and both borders).
    pub fn horizontal(&self) -> f64 {
        self.padding_left + self.padding_right + self.border_left + self.border_right
    }
}

/// Parse the leading number of a CSS length (`"12.5px"` -> `12.5`).
///
/// Leading whitespace is skipped and trailing units are ignored. A value with no numeric prefix
/// yields `0.0`.
pub fn parse_css_px(value: &str) -> f64 {
    CSS_NUMBER_PREFIX
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Content-area span of `container`: its bounding rect minus left/right padding and border.
pub fn content_rect<L: Layout + ?Sized>(layout: &L, container: NodeId) -> Option<ContentSpan> {
    let rect = layout.bounding_rect(container)?;
    let edges = layout.box_edges(container);
    Some(ContentSpan {
        left: rect.left + edges.border_left + edges.padding_left,
        width: rect.width - edges.horizontal(),
    })
}

/// A rect spanning the content width of `container` at the vertical position of `source`.
///
/// The menu always spans the editor's content width regardless of the anchored node's own
/// width.
pub fn editor_width_rect<L: Layout + ?Sized>(
    layout: &L,
    container: NodeId,
    source: Rect,
) -> Option<Rect> {
    let span = content_rect(layout, container)?;
    Some(Rect::new(span.left, source.top, span.width, source.height))
}

/// Bounding rect of the current selection, or `None` when the selection is empty.
///
/// The live UI range rect wins when it has area and lives inside the editor root. Otherwise
/// the selection ends are mapped to viewport coordinates; a reversed selection still produces
/// a non-negative rect.
pub fn selection_rect<V: EditorView + ?Sized>(view: &V) -> Option<Rect> {
    let selection = view.selection();
    if selection.is_empty() {
        return None;
    }

    if let Some(range) = view.dom_selection()
        && view.contains(view.root(), range.common_ancestor)
        && !range.rect.is_degenerate()
    {
        return Some(range.rect);
    }

    let from = view.coords_at_pos(selection.from)?;
    let to = view.coords_at_pos(selection.to)?;
    Some(Rect::new(
        from.left.min(to.left),
        from.top.min(to.top),
        (to.left - from.left).abs(),
        (to.top - from.top).abs(),
    ))
}
