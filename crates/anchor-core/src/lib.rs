#![warn(missing_docs)]
//! Anchor Core - Headless Virtual-Anchor Tracking for Floating Editor Menus
//!
//! # Overview
//!
//! `anchor-core` keeps a floating AI-assist menu positioned against rich-text editor content
//! that may still be streaming in. It does not render anything and does not own the document
//! model: the host editor provides layout geometry, AI markers, selection state and a
//! mutation-signal channel through the traits in [`host`], and receives anchors through
//! [`MenuPresenter`].
//!
//! # Core Features
//!
//! - **Editor-width anchors**: the menu always spans the editor's content area, whatever the
//!   width of the node it follows
//! - **Scroll-robust anchors**: reference-tracked anchors recompute from the editor root's
//!   live rect, so scrolling needs no new signal
//! - **Frame coalescing**: bursts of streaming updates collapse into one recomputation per
//!   frame
//! - **Leak-free markers**: one live anchor per slot, destroyed on replacement, teardown or
//!   drop, with an orphan sweep on session reset
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MenuSession (state store, reset + sweep)   │  ← Public API
//! ├──────────────────────┬──────────────────────┤
//! │  ContentTracker      │  SelectionTracker    │  ← Mode decisions
//! ├──────────────────────┴──────────────────────┤
//! │  DeferredTask (one pending frame)           │  ← Coalescing
//! ├─────────────────────────────────────────────┤
//! │  AnchorFactory / VirtualAnchor              │  ← Marker lifecycle
//! ├─────────────────────────────────────────────┤
//! │  Geometry (content rect, selection rect)    │  ← Pure math
//! ├─────────────────────────────────────────────┤
//! │  Host traits (layout, signals, frames)      │  ← Editor environment
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use anchor_core::{
//!     AnchorConfig, AnchorTarget, ContentTracker, HeadlessHost, MenuPresenter, MenuSession,
//!     Rect, SelectionTracker,
//! };
//! use std::rc::Rc;
//!
//! struct Presenter;
//!
//! impl MenuPresenter for Presenter {
//!     fn set_anchor(&self, target: AnchorTarget) {
//!         println!("anchor: {target:?}");
//!     }
//!     fn set_visible(&self, visible: bool) {
//!         println!("visible: {visible}");
//!     }
//! }
//!
//! let config = AnchorConfig::default();
//! let host = Rc::new(HeadlessHost::new(Rect::new(0.0, 0.0, 800.0, 600.0)));
//! let session = Rc::new(MenuSession::new(host.clone(), &config));
//! let presenter = Rc::new(Presenter);
//!
//! let content = ContentTracker::attach(
//!     session.clone(),
//!     presenter.clone(),
//!     config.content_options(true),
//! );
//! let selection =
//!     SelectionTracker::attach(session.clone(), presenter, config.selection_options(true));
//!
//! host.emit_transaction();
//! host.run_frame();
//!
//! drop(content);
//! drop(selection);
//! session.reset();
//! assert_eq!(host.live_marker_count(), 0);
//! ```
//!
//! # Module Description
//!
//! - [`geometry`] - Rect math (content rect, editor-width rect, selection rect)
//! - [`anchor`] - Virtual anchors and marker lifecycle
//! - [`scheduler`] - Single in-flight deferred task
//! - [`target`] - Anchor target discovery
//! - [`content_tracker`] - Streaming/static content tracking
//! - [`selection_tracker`] - Selection tracking
//! - [`session`] - Menu session state
//! - [`host`] - Host environment traits
//! - [`headless`] - In-memory reference host

pub mod anchor;
pub mod config;
pub mod content_tracker;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod scheduler;
pub mod selection_tracker;
pub mod session;
pub mod target;
pub mod tracker;

pub use anchor::{
    AnchorFactory, AnchorHandle, AnchorTarget, DEFAULT_MARKER_TAG, ReferenceOffset,
    VirtualAnchor, sweep_orphans,
};
pub use config::AnchorConfig;
pub use content_tracker::{ContentTracker, ContentTrackerOptions};
pub use error::AnchorError;
pub use geometry::{
    BoxEdges, ContentSpan, Rect, content_rect, editor_width_rect, parse_css_px, selection_rect,
};
pub use headless::HeadlessHost;
pub use host::{
    AiStatus, ChangeObserver, Coords, DomRange, EditorView, FrameScheduler, FrameToken, Host,
    Layout, MarkerId, MarkerLayer, MenuPresenter, MutationSignal, NodeId, SelectionState,
    SignalSource, SubscriptionId,
};
pub use scheduler::DeferredTask;
pub use selection_tracker::{SelectionTracker, SelectionTrackerOptions};
pub use session::{FallbackAnchor, MenuSession, MenuSessionSlot, MenuState, MenuStateUpdate};
pub use tracker::TrackerMode;
