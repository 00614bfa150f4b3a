//! Menu session state.
//!
//! One [`MenuSession`] is created per menu instance and shared (by `Rc`) with both trackers.
//! It is the only shared mutable state in the crate and changes only through
//! [`update`](MenuSession::update), [`set_fallback_anchor`](MenuSession::set_fallback_anchor)
//! and [`reset`](MenuSession::reset). A reset also sweeps orphaned anchor markers.
//!
//! # Example
//!
//! ```rust
//! use anchor_core::config::AnchorConfig;
//! use anchor_core::geometry::Rect;
//! use anchor_core::headless::HeadlessHost;
//! use anchor_core::session::{MenuSession, MenuStateUpdate};
//! use std::rc::Rc;
//!
//! let host = Rc::new(HeadlessHost::new(Rect::new(0.0, 0.0, 640.0, 480.0)));
//! let session = MenuSession::new(host, &AnchorConfig::default());
//!
//! session.update(MenuStateUpdate::new().is_open(true).tone(Some("friendly".into())));
//! assert!(session.state().is_open);
//!
//! session.reset();
//! assert!(!session.state().is_open);
//! assert_eq!(session.state().tone, None);
//! ```

use crate::anchor::{AnchorFactory, AnchorTarget};
use crate::config::AnchorConfig;
use crate::geometry::Rect;
use crate::host::Host;
use std::cell::RefCell;
use std::rc::Rc;

/// Anchor recorded as a fallback for menu placement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FallbackAnchor {
    /// Target the menu was last shown at.
    pub element: Option<AnchorTarget>,
    /// Rect of the target when it was recorded.
    pub rect: Option<Rect>,
}

/// Menu session state.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    /// Whether the menu is open.
    pub is_open: bool,
    /// Requested tone for generation, if any.
    pub tone: Option<String>,
    /// Output language.
    pub language: String,
    /// Whether the prompt input is shown.
    pub should_show_input: bool,
    /// Whether the prompt input has focus.
    pub input_is_focused: bool,
    /// Fallback placement anchor.
    pub fallback_anchor: FallbackAnchor,
}

impl MenuState {
    /// Initial state for a session whose default language is `language`.
    pub fn initial(language: impl Into<String>) -> Self {
        Self {
            is_open: false,
            tone: None,
            language: language.into(),
            should_show_input: true,
            input_is_focused: false,
            fallback_anchor: FallbackAnchor::default(),
        }
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::initial("en")
    }
}

/// A partial [`MenuState`]; `None` fields are left untouched by [`MenuSession::update`].
#[derive(Debug, Clone, Default)]
pub struct MenuStateUpdate {
    is_open: Option<bool>,
    tone: Option<Option<String>>,
    language: Option<String>,
    should_show_input: Option<bool>,
    input_is_focused: Option<bool>,
    fallback_anchor: Option<FallbackAnchor>,
}

impl MenuStateUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `is_open`.
    pub fn is_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    /// Set or clear the tone.
    pub fn tone(mut self, tone: Option<String>) -> Self {
        self.tone = Some(tone);
        self
    }

    /// Set the language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set `should_show_input`.
    pub fn should_show_input(mut self, show: bool) -> Self {
        self.should_show_input = Some(show);
        self
    }

    /// Set `input_is_focused`.
    pub fn input_is_focused(mut self, focused: bool) -> Self {
        self.input_is_focused = Some(focused);
        self
    }

    /// Replace the fallback anchor.
    pub fn fallback_anchor(mut self, anchor: FallbackAnchor) -> Self {
        self.fallback_anchor = Some(anchor);
        self
    }

    fn apply(self, state: &mut MenuState) {
        if let Some(is_open) = self.is_open {
            state.is_open = is_open;
        }
        if let Some(tone) = self.tone {
            state.tone = tone;
        }
        if let Some(language) = self.language {
            state.language = language;
        }
        if let Some(show) = self.should_show_input {
            state.should_show_input = show;
        }
        if let Some(focused) = self.input_is_focused {
            state.input_is_focused = focused;
        }
        if let Some(anchor) = self.fallback_anchor {
            state.fallback_anchor = anchor;
        }
    }
}

/// State change callback function type
pub type MenuStateCallback = Box<dyn FnMut(&MenuState)>;

/// Session object for one menu instance.
pub struct MenuSession {
    factory: AnchorFactory,
    default_language: String,
    state: RefCell<MenuState>,
    callbacks: RefCell<Vec<MenuStateCallback>>,
}

impl MenuSession {
    /// Create a session against `host`.
    pub fn new(host: Rc<dyn Host>, config: &AnchorConfig) -> Self {
        Self {
            factory: AnchorFactory::new(host, config.marker_tag.clone()),
            default_language: config.default_language.clone(),
            state: RefCell::new(MenuState::initial(config.default_language.clone())),
            callbacks: RefCell::new(Vec::new()),
        }
    }

    /// The anchor factory shared by this session's trackers.
    pub fn factory(&self) -> &AnchorFactory {
        &self.factory
    }

    /// The host this session runs against.
    pub fn host(&self) -> &Rc<dyn Host> {
        self.factory.host()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> MenuState {
        self.state.borrow().clone()
    }

    /// Merge `update` into the current state and notify subscribers.
    pub fn update(&self, update: MenuStateUpdate) {
        update.apply(&mut self.state.borrow_mut());
        self.notify();
    }

    /// Record the fallback anchor. Without a `rect`, the element's current rect is used.
    pub fn set_fallback_anchor(&self, element: Option<AnchorTarget>, rect: Option<Rect>) {
        let rect = rect.or_else(|| {
            element
                .as_ref()
                .and_then(|target| target.rect(&**self.host()))
        });
        self.update(MenuStateUpdate::new().fallback_anchor(FallbackAnchor { element, rect }));
    }

    /// Restore the initial state and sweep orphaned markers. Returns the number swept.
    pub fn reset(&self) -> usize {
        *self.state.borrow_mut() = MenuState::initial(self.default_language.clone());
        let swept = self.factory.sweep_orphans();
        tracing::debug!("Menu session reset ({} orphaned markers swept)", swept);
        self.notify();
        swept
    }

    /// Subscribe to state changes.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnMut(&MenuState) + 'static,
    {
        self.callbacks.borrow_mut().push(Box::new(callback));
    }

    fn notify(&self) {
        let state = self.state();
        // Callbacks may subscribe or update while being notified.
        let mut callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in &mut callbacks {
            callback(&state);
        }
        let mut slot = self.callbacks.borrow_mut();
        callbacks.append(&mut slot);
        *slot = callbacks;
    }
}

/// Scope holding the active [`MenuSession`], if any.
///
/// The owner calls [`begin`](Self::begin) when the menu mounts and [`end`](Self::end) when it
/// unmounts.
#[derive(Default)]
pub struct MenuSessionSlot {
    current: RefCell<Option<Rc<MenuSession>>>,
}

impl MenuSessionSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` the active session, returning the previous one.
    pub fn begin(&self, session: Rc<MenuSession>) -> Option<Rc<MenuSession>> {
        self.current.borrow_mut().replace(session)
    }

    /// Leave the active session, returning it.
    pub fn end(&self) -> Option<Rc<MenuSession>> {
        self.current.borrow_mut().take()
    }

    /// The active session, if any.
    pub fn try_current(&self) -> Option<Rc<MenuSession>> {
        self.current.borrow().clone()
    }

    /// The active session.
    ///
    /// # Panics
    ///
    /// Panics when no session is active; there is no meaningful default state to hand out.
    #[track_caller]
    pub fn current(&self) -> Rc<MenuSession> {
        match self.try_current() {
            Some(session) => session,
            None => panic!("menu session accessed outside an active session"),
        }
    }
}
