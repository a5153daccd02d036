//! The caller-facing window.
//!
//! [`Window`] wraps a [`NativeWindow`] and adds everything that is the same
//! on every platform: swap interval caching, client-area move and resize
//! arithmetic, lifecycle callbacks, and an opaque user data slot.
//!
//! # Example
//!
//! ```no_run
//! use horizon_lattice_gl::{CreateFlags, Window};
//!
//! let mut window = Window::create("Demo", 800, 600, CreateFlags::NONE)?;
//! window.set_on_close(Some(Box::new(|w: &mut Window| w.set_user_data(true))));
//! window.show();
//!
//! while window.user_data::<bool>().is_none() {
//!     window.dequeue_events();
//!     window.swap_buffers(1);
//! }
//! window.close();
//! # Ok::<(), horizon_lattice_gl::WindowError>(())
//! ```

use std::any::Any;
use std::fmt;

use tracing::{debug, info, warn};

use crate::backend::{NativeWindow, PlatformWindow};
use crate::config::{CreateFlags, WindowConfig};
use crate::context::ContextKind;
use crate::dispatch::{Callbacks, Slot};
use crate::error::WindowResult;
use crate::event::NativeId;
use crate::geometry::WindowRect;
use crate::logging::targets;
use crate::router::EventRouter;

/// A lifecycle callback. It receives the window the event belongs to.
pub type WindowCallback<N = PlatformWindow> = Box<dyn FnMut(&mut Window<N>)>;

/// A native window bound to an OpenGL context.
///
/// A window is single-threaded: it must be used, and dropped, on the thread
/// that created it. Dropping the window releases it just like
/// [`close`](Self::close).
pub struct Window<N: NativeWindow = PlatformWindow> {
    pub(crate) native: N,
    flags: CreateFlags,
    swap_interval: i32,
    pub(crate) callbacks: Callbacks<N>,
    user_data: Option<Box<dyn Any>>,
}

static_assertions::assert_not_impl_any!(Window<crate::backend::HeadlessWindow>: Send, Sync);

impl Window {
    /// Create a hidden window on the current platform whose client area is
    /// `width` x `height`.
    ///
    /// The OpenGL context is current on the calling thread when this
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the window, its pixel format, or its legacy
    /// context cannot be created. Failure to upgrade to a modern context is
    /// not an error.
    pub fn create(
        title: &str,
        width: u32,
        height: u32,
        flags: impl Into<CreateFlags>,
    ) -> WindowResult<Self> {
        Self::from_config(
            &WindowConfig::new(title)
                .with_size(width, height)
                .with_flags(flags),
        )
    }

    /// Create a window on the current platform from a full configuration.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn from_config(config: &WindowConfig) -> WindowResult<Self> {
        Self::with_backend(config)
    }
}

impl<N: NativeWindow> Window<N> {
    /// Create a window with an explicit backend.
    ///
    /// ```
    /// use horizon_lattice_gl::{HeadlessWindow, Window, WindowConfig};
    ///
    /// let window = Window::<HeadlessWindow>::with_backend(&WindowConfig::new("t")).unwrap();
    /// assert_eq!(window.client_size(), (800, 600));
    /// ```
    ///
    /// # Errors
    ///
    /// See [`Window::create`].
    pub fn with_backend(config: &WindowConfig) -> WindowResult<Self> {
        let native = N::create(config)?;
        Ok(Self::from_native(native, config.flags()))
    }

    /// Wrap an already created native window.
    pub fn from_native(native: N, flags: CreateFlags) -> Self {
        Self {
            native,
            flags,
            swap_interval: 0,
            callbacks: Callbacks::default(),
            user_data: None,
        }
    }

    /// Show the window.
    pub fn show(&mut self) {
        self.native.set_visible(true);
    }

    /// Hide the window.
    pub fn hide(&mut self) {
        self.native.set_visible(false);
    }

    /// Check whether the window is shown.
    pub fn is_visible(&self) -> bool {
        self.native.is_visible()
    }

    /// Process every pending native notification for this window and invoke
    /// the matching callbacks, in arrival order. Never blocks.
    ///
    /// Events produced while callbacks run (for example by a callback that
    /// moves the window) are delivered by the next call.
    pub fn dequeue_events(&mut self) {
        self.native.pump_events();
        let events = EventRouter::instance().drain(self.native.id());
        for event in events {
            self.dispatch(event);
        }
    }

    /// Present the back buffer, first applying `interval` if it differs from
    /// the last interval requested.
    ///
    /// `0` disables vertical sync, `1` synchronizes with every vertical
    /// blank, and `-1` requests adaptive sync where the driver supports it
    /// (plain vsync otherwise). Both calls act on this window's context,
    /// which is made current first.
    pub fn swap_buffers(&mut self, interval: i32) {
        if interval != self.swap_interval {
            if !self.native.set_swap_interval(interval) {
                debug!(
                    target: targets::CONTEXT,
                    interval,
                    "swap interval control unavailable"
                );
            }
            self.swap_interval = interval;
        }
        self.native.present();
    }

    /// Make this window's context current on the calling thread.
    ///
    /// Creating a window leaves its context current, so with several
    /// windows open, call this before issuing GL commands for one of them.
    /// [`swap_buffers`](Self::swap_buffers) does it on its own.
    pub fn make_current(&mut self) -> bool {
        let current = self.native.make_current();
        if !current {
            warn!(target: targets::CONTEXT, id = %self.id(), "context could not be made current");
        }
        current
    }

    /// The last swap interval requested through
    /// [`swap_buffers`](Self::swap_buffers). Starts at `0`.
    pub fn swap_interval(&self) -> i32 {
        self.swap_interval
    }

    /// Move the window's top-left corner, keeping its outer size.
    pub fn move_to(&mut self, x: i32, y: i32) {
        let rect = self.native.outer_rect().with_position(x, y);
        debug!(target: targets::WINDOW, id = %self.id(), x, y, "move");
        self.native.set_outer_rect(rect);
    }

    /// Resize the window so that its client area is `width` x `height`,
    /// keeping its top-left corner.
    pub fn resize(&mut self, width: u32, height: u32) {
        let outer = self.native.outer_rect();
        let rect = self.native.frame_insets().resized(outer, width, height);
        debug!(target: targets::WINDOW, id = %self.id(), width, height, "resize");
        self.native.set_outer_rect(rect);
    }

    /// Outer width, including decorations.
    pub fn width(&self) -> u32 {
        self.native.outer_rect().width
    }

    /// Outer height, including decorations.
    pub fn height(&self) -> u32 {
        self.native.outer_rect().height
    }

    /// X position of the outer top-left corner.
    pub fn x(&self) -> i32 {
        self.native.outer_rect().x
    }

    /// Y position of the outer top-left corner.
    pub fn y(&self) -> i32 {
        self.native.outer_rect().y
    }

    /// Outer rectangle, including decorations.
    pub fn outer_rect(&self) -> WindowRect {
        self.native.outer_rect()
    }

    /// Client area size as `(width, height)`.
    pub fn client_size(&self) -> (u32, u32) {
        let outer = self.native.outer_rect();
        self.native
            .frame_insets()
            .client_size(outer.width, outer.height)
    }

    /// Release the context, the drawing surface, and the native window.
    pub fn close(mut self) {
        let id = self.id();
        self.native.destroy();
        info!(target: targets::WINDOW, %id, "window closed");
    }

    /// Install or clear the move callback.
    pub fn set_on_move(&mut self, callback: Option<WindowCallback<N>>) {
        self.callbacks.set(Slot::Move, callback);
    }

    /// Install or clear the resize callback.
    pub fn set_on_resize(&mut self, callback: Option<WindowCallback<N>>) {
        self.callbacks.set(Slot::Resize, callback);
    }

    /// Install or clear the close-request callback.
    ///
    /// Without one, close requests are ignored and the window stays open.
    pub fn set_on_close(&mut self, callback: Option<WindowCallback<N>>) {
        self.callbacks.set(Slot::Close, callback);
    }

    /// Store a value in the user data slot, replacing any previous value.
    pub fn set_user_data<T: Any>(&mut self, data: T) {
        self.user_data = Some(Box::new(data));
    }

    /// Borrow the user data if it holds a `T`.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref()?.downcast_ref()
    }

    /// Mutably borrow the user data if it holds a `T`.
    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_data.as_deref_mut()?.downcast_mut()
    }

    /// Remove and return the user data.
    pub fn take_user_data(&mut self) -> Option<Box<dyn Any>> {
        self.user_data.take()
    }

    /// Creation flags, as given.
    pub fn flags(&self) -> CreateFlags {
        self.flags
    }

    /// Identity used for event routing.
    pub fn id(&self) -> NativeId {
        self.native.id()
    }

    /// Native window handle.
    pub fn handle(&self) -> N::Handle {
        self.native.handle()
    }

    /// Drawing surface or display connection.
    pub fn device(&self) -> N::Device {
        self.native.device()
    }

    /// The rendering context, current on the creating thread.
    pub fn context(&self) -> N::Context {
        self.native.context()
    }

    /// Whether the context is the legacy or the upgraded one.
    pub fn context_kind(&self) -> ContextKind {
        self.native.context_kind()
    }

    /// Borrow the backend.
    pub fn native(&self) -> &N {
        &self.native
    }

    /// Mutably borrow the backend.
    pub fn native_mut(&mut self) -> &mut N {
        &mut self.native
    }
}

impl<N: NativeWindow + fmt::Debug> fmt::Debug for Window<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("native", &self.native)
            .field("flags", &self.flags)
            .field("swap_interval", &self.swap_interval)
            .field("callbacks", &self.callbacks)
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}
