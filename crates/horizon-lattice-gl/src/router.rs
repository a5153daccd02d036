//! Window event routing.
//!
//! Native window procedures and event queues deliver notifications keyed by
//! the native handle. The `EventRouter` maps that handle back to the owning
//! window: each live window registers its `NativeId` at creation, backends
//! post translated events under the id, and the window drains its own queue
//! from `Window::dequeue_events`.
//!
//! The router never runs callbacks. Its lock is only held while queues are
//! touched, so callbacks are free to move, resize, or create windows.

use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{WindowError, WindowResult};
use crate::event::{NativeId, WindowEvent};
use crate::logging::targets;

/// Global event router instance.
static EVENT_ROUTER: OnceLock<EventRouter> = OnceLock::new();

/// Registry from native window identity to pending events.
#[derive(Debug, Default)]
pub struct EventRouter {
    queues: Mutex<HashMap<NativeId, VecDeque<WindowEvent>>>,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global router instance.
    ///
    /// Initializes the router on first call. It lives for the rest of the
    /// process.
    pub fn instance() -> &'static EventRouter {
        EVENT_ROUTER.get_or_init(EventRouter::new)
    }

    /// Register a live window.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::DuplicateHandle`] if another live window is
    /// registered under the same id.
    pub fn register(&self, id: NativeId) -> WindowResult<()> {
        let mut queues = self.queues.lock();
        if queues.contains_key(&id) {
            return Err(WindowError::DuplicateHandle(id.raw()));
        }
        queues.insert(id, VecDeque::new());
        trace!(target: targets::EVENT, %id, "registered window");
        Ok(())
    }

    /// Unregister a window, discarding its pending events.
    ///
    /// Returns `true` if the window was registered.
    pub fn unregister(&self, id: NativeId) -> bool {
        let removed = self.queues.lock().remove(&id).is_some();
        if removed {
            trace!(target: targets::EVENT, %id, "unregistered window");
        }
        removed
    }

    /// Check if a window is registered.
    pub fn contains(&self, id: NativeId) -> bool {
        self.queues.lock().contains_key(&id)
    }

    /// Queue an event for a window.
    ///
    /// Returns `false` if no window is registered under `id`, in which case
    /// the caller should fall back to default native handling.
    pub fn post(&self, id: NativeId, event: WindowEvent) -> bool {
        match self.queues.lock().get_mut(&id) {
            Some(queue) => {
                trace!(target: targets::EVENT, %id, event = event.name(), "queued event");
                queue.push_back(event);
                true
            }
            None => false,
        }
    }

    /// Number of events waiting for a window.
    pub fn pending(&self, id: NativeId) -> usize {
        self.queues.lock().get(&id).map_or(0, VecDeque::len)
    }

    /// Remove and return all events waiting for a window, oldest first.
    pub fn drain(&self, id: NativeId) -> Vec<WindowEvent> {
        self.queues
            .lock()
            .get_mut(&id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}
