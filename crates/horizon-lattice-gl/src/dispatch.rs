//! Callback dispatch.
//!
//! Each window has one callback slot per event kind. While a callback runs
//! it is taken out of its slot so that it can receive the window mutably.
//! Afterwards it is put back unless the callback installed a replacement
//! or cleared the slot; those changes win.

use std::fmt;

use tracing::trace;

use crate::backend::NativeWindow;
use crate::event::WindowEvent;
use crate::logging::targets;
use crate::window::{Window, WindowCallback};

/// The callback slot an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Move,
    Resize,
    Close,
}

impl Slot {
    fn of(event: WindowEvent) -> Self {
        match event {
            WindowEvent::Moved { .. } => Slot::Move,
            WindowEvent::Resized { .. } => Slot::Resize,
            WindowEvent::CloseRequested => Slot::Close,
        }
    }
}

struct Entry<N: NativeWindow> {
    callback: Option<WindowCallback<N>>,
    // Bumped on every install so dispatch can tell whether the slot was
    // touched while the callback ran.
    generation: u64,
}

impl<N: NativeWindow> Default for Entry<N> {
    fn default() -> Self {
        Self {
            callback: None,
            generation: 0,
        }
    }
}

/// Per-window callback slots.
pub(crate) struct Callbacks<N: NativeWindow> {
    on_move: Entry<N>,
    on_resize: Entry<N>,
    on_close: Entry<N>,
}

impl<N: NativeWindow> Default for Callbacks<N> {
    fn default() -> Self {
        Self {
            on_move: Entry::default(),
            on_resize: Entry::default(),
            on_close: Entry::default(),
        }
    }
}

impl<N: NativeWindow> Callbacks<N> {
    fn entry(&mut self, slot: Slot) -> &mut Entry<N> {
        match slot {
            Slot::Move => &mut self.on_move,
            Slot::Resize => &mut self.on_resize,
            Slot::Close => &mut self.on_close,
        }
    }

    /// Install or clear the callback of a slot.
    pub(crate) fn set(&mut self, slot: Slot, callback: Option<WindowCallback<N>>) {
        let entry = self.entry(slot);
        entry.callback = callback;
        entry.generation = entry.generation.wrapping_add(1);
    }
}

impl<N: NativeWindow> fmt::Debug for Callbacks<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_move", &self.on_move.callback.is_some())
            .field("on_resize", &self.on_resize.callback.is_some())
            .field("on_close", &self.on_close.callback.is_some())
            .finish()
    }
}

impl<N: NativeWindow> Window<N> {
    /// Deliver one event to its callback, if one is installed.
    pub(crate) fn dispatch(&mut self, event: WindowEvent) {
        let slot = Slot::of(event);
        let entry = self.callbacks.entry(slot);
        let generation = entry.generation;
        let Some(mut callback) = entry.callback.take() else {
            trace!(
                target: targets::EVENT,
                id = %self.id(),
                event = event.name(),
                "no callback installed"
            );
            return;
        };

        trace!(target: targets::EVENT, id = %self.id(), event = event.name(), "dispatching");
        callback(self);

        let entry = self.callbacks.entry(slot);
        if entry.generation == generation {
            entry.callback = Some(callback);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::backend::HeadlessWindow;
    use crate::config::WindowConfig;
    use crate::event::WindowEvent;
    use crate::window::Window;

    type TestWindow = Window<HeadlessWindow>;

    fn window() -> TestWindow {
        Window::with_backend(&WindowConfig::new("dispatch")).unwrap()
    }

    #[test]
    fn test_callback_runs_once_per_event() {
        let mut window = window();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        window.set_on_close(Some(Box::new(move |_: &mut TestWindow| {
            counter.set(counter.get() + 1);
        })));

        window.dispatch(WindowEvent::CloseRequested);
        window.dispatch(WindowEvent::CloseRequested);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_events_route_to_their_slot() {
        let mut window = window();
        let moves = Rc::new(Cell::new(0));
        let counter = Rc::clone(&moves);
        window.set_on_move(Some(Box::new(move |_: &mut TestWindow| {
            counter.set(counter.get() + 1);
        })));

        window.dispatch(WindowEvent::Resized {
            width: 1,
            height: 1,
        });
        window.dispatch(WindowEvent::CloseRequested);
        assert_eq!(moves.get(), 0);

        window.dispatch(WindowEvent::Moved { x: 0, y: 0 });
        assert_eq!(moves.get(), 1);
    }

    #[test]
    fn test_replacement_inside_callback_wins() {
        let mut window = window();
        let second = Rc::new(Cell::new(false));
        let flag = Rc::clone(&second);
        window.set_on_close(Some(Box::new(move |w: &mut TestWindow| {
            let flag = Rc::clone(&flag);
            w.set_on_close(Some(Box::new(move |_: &mut TestWindow| flag.set(true))));
        })));

        window.dispatch(WindowEvent::CloseRequested);
        assert!(!second.get());
        window.dispatch(WindowEvent::CloseRequested);
        assert!(second.get());
    }

    #[test]
    fn test_clearing_inside_callback_sticks() {
        let mut window = window();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        window.set_on_resize(Some(Box::new(move |w: &mut TestWindow| {
            counter.set(counter.get() + 1);
            w.set_on_resize(None);
        })));

        window.dispatch(WindowEvent::Resized {
            width: 1,
            height: 1,
        });
        window.dispatch(WindowEvent::Resized {
            width: 2,
            height: 2,
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_callback_sees_current_geometry() {
        let mut window = window();
        window.set_on_move(Some(Box::new(|w: &mut TestWindow| {
            let position = (w.x(), w.y());
            w.set_user_data(position);
        })));

        window.move_to(42, 24);
        window.dequeue_events();
        assert_eq!(window.user_data::<(i32, i32)>(), Some(&(42, 24)));
    }
}
