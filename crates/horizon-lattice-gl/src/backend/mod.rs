//! Native window backends.
//!
//! Exactly one platform backend is compiled per target and exported as
//! [`PlatformWindow`]:
//!
//! - **Windows**: `Win32Window`, a Win32 window with a WGL context.
//! - **Linux / BSD**: `X11Window`, an Xlib window with a GLX context. Xlib
//!   and libGL are loaded at runtime.
//!
//! [`HeadlessWindow`] is available everywhere. It simulates a window system
//! in memory and is the platform window on targets without a native
//! backend.

use std::fmt;

use crate::config::WindowConfig;
use crate::context::ContextKind;
use crate::error::WindowResult;
use crate::event::NativeId;
use crate::geometry::{FrameInsets, WindowRect};

mod headless;
pub use headless::{HeadlessOptions, HeadlessWindow};

#[cfg(target_os = "windows")]
pub mod win32;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

/// The native window type of the current target.
#[cfg(target_os = "windows")]
pub type PlatformWindow = win32::Win32Window;

/// The native window type of the current target.
#[cfg(all(unix, not(target_os = "macos")))]
pub type PlatformWindow = x11::X11Window;

/// The native window type of the current target.
#[cfg(not(any(target_os = "windows", all(unix, not(target_os = "macos")))))]
pub type PlatformWindow = HeadlessWindow;

/// Capability set every backend provides.
///
/// A `NativeWindow` owns its native window, drawing surface and rendering
/// context, and releases all three in [`destroy`](Self::destroy) (also
/// called on drop). The caller-facing semantics (swap interval caching,
/// callbacks, move and resize arithmetic) live in [`Window`](crate::Window);
/// implementations only translate to native calls.
pub trait NativeWindow: Sized {
    /// Native window handle.
    type Handle: Copy + fmt::Debug;
    /// Drawing surface or display connection.
    type Device: Copy + fmt::Debug;
    /// Rendering context handle.
    type Context: Copy + fmt::Debug;

    /// Create the window, select a pixel format and negotiate a context.
    ///
    /// The window is registered with the [`EventRouter`](crate::EventRouter)
    /// under [`id`](Self::id) before this returns. On error every native
    /// resource acquired so far has been released.
    fn create(config: &WindowConfig) -> WindowResult<Self>;

    /// Identity used by the event router.
    fn id(&self) -> NativeId;

    /// Native window handle.
    fn handle(&self) -> Self::Handle;

    /// Drawing surface or display connection.
    fn device(&self) -> Self::Device;

    /// Rendering context adopted at creation.
    fn context(&self) -> Self::Context;

    /// Whether the context is the legacy or the modern one.
    fn context_kind(&self) -> ContextKind;

    /// Show or hide the window. Does nothing if already in that state.
    fn set_visible(&mut self, visible: bool);

    /// Whether the window is currently shown.
    fn is_visible(&self) -> bool;

    /// Translate every pending native notification for this window and post
    /// it to the event router. Never blocks.
    fn pump_events(&mut self);

    /// Make this window's context current on the calling thread. Does
    /// nothing if it already is.
    ///
    /// Returns `false` if the platform refused.
    fn make_current(&mut self) -> bool;

    /// Ask the driver for a new swap interval for this window's context.
    ///
    /// Swap control acts on whichever context is current, so
    /// implementations make their own context current first. Returns
    /// `false` if the driver exposes no swap control entry point.
    fn set_swap_interval(&mut self, interval: i32) -> bool;

    /// Present the back buffer, making this window's context current first.
    fn present(&mut self);

    /// Current outer rectangle.
    fn outer_rect(&self) -> WindowRect;

    /// Current decoration insets.
    fn frame_insets(&self) -> FrameInsets;

    /// Apply a new outer rectangle.
    fn set_outer_rect(&mut self, rect: WindowRect);

    /// Release context, device and window. Safe to call more than once.
    fn destroy(&mut self);
}
