//! Single in-flight deferred task.
//!
//! Coalesces bursts of requests into one execution on the next frame: scheduling while a task
//! is pending cancels the pending one first, so only the most recent request ever runs.

use crate::host::{FrameScheduler, FrameToken};
use std::cell::Cell;
use std::rc::Rc;

/// At most one pending frame callback.
#[derive(Debug, Default)]
pub struct DeferredTask {
    pending: Rc<Cell<Option<FrameToken>>>,
}

impl DeferredTask {
    /// Create an idle task slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` for the next frame, cancelling any not-yet-run task.
    pub fn schedule<S, F>(&self, scheduler: &S, task: F) -> FrameToken
    where
        S: FrameScheduler + ?Sized,
        F: FnOnce() + 'static,
    {
        self.cancel(scheduler);

        let slot = Rc::downgrade(&self.pending);
        let own = Rc::new(Cell::new(None));
        let own_token = Rc::clone(&own);
        let token = scheduler.request_frame(Box::new(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            // A superseded or cancelled callback must not clear a newer request's token.
            if slot.get().is_none() || slot.get() != own_token.get() {
                return;
            }
            slot.set(None);
            task();
        }));
        own.set(Some(token));
        self.pending.set(Some(token));
        token
    }

    /// Cancel the pending task, if any. Returns whether something was cancelled.
    pub fn cancel<S: FrameScheduler + ?Sized>(&self, scheduler: &S) -> bool {
        match self.pending.take() {
            Some(token) => {
                scheduler.cancel_frame(token);
                true
            }
            None => false,
        }
    }

    /// Whether a task is waiting for the next frame.
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }
}
