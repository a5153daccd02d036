//! Window lifecycle events.

use std::fmt;

/// Identity of a native window.
///
/// Wraps the backend's window handle (HWND, X11 window id, or headless id)
/// widened to 64 bits so a single registry can key on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(u64);

impl NativeId {
    /// Create from a raw handle value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A lifecycle notification translated from the native event queue.
///
/// Positions and sizes describe the outer rectangle at the time the
/// notification was translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEvent {
    /// The window was moved.
    Moved {
        /// New x position of the top-left corner.
        x: i32,
        /// New y position of the top-left corner.
        y: i32,
    },
    /// The window was resized. Interactive resizing reports one of these per
    /// native notification, not one per drag.
    Resized {
        /// New outer width.
        width: u32,
        /// New outer height.
        height: u32,
    },
    /// The user asked to close the window. The window stays alive until
    /// [`Window::close`](crate::Window::close) is called.
    CloseRequested,
}

impl WindowEvent {
    /// Short name used in log records.
    pub fn name(&self) -> &'static str {
        match self {
            WindowEvent::Moved { .. } => "moved",
            WindowEvent::Resized { .. } => "resized",
            WindowEvent::CloseRequested => "close_requested",
        }
    }
}
