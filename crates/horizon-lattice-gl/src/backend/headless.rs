//! In-memory backend.
//!
//! `HeadlessWindow` behaves like a native window without talking to a window
//! system: it keeps its outer rectangle in memory, reports geometry changes
//! through the [`EventRouter`] the way a window procedure would, and runs
//! the real context negotiation against a simulated driver. It also records
//! what the front end asked of it, which makes it the backend of choice for
//! tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use tracing::{debug, info};

use super::NativeWindow;
use crate::config::{ContextRequest, WindowConfig};
use crate::context::{ContextApi, ContextKind, negotiate};
use crate::error::WindowResult;
use crate::event::{NativeId, WindowEvent};
use crate::geometry::{FrameInsets, WindowRect};
use crate::logging::targets;
use crate::router::EventRouter;

/// Source of unique headless window ids.
static NEXT_ID: AtomicU64 = AtomicU64::new(0x1_0000);

/// Source of unique simulated context handles.
static NEXT_CONTEXT: AtomicU32 = AtomicU32::new(1);

/// Per-thread state of the simulated driver. Like a real GL driver, swap
/// control applies to whichever context is current on the thread.
#[derive(Default)]
struct DriverState {
    current: Option<u32>,
    intervals: HashMap<u32, i32>,
}

thread_local! {
    static LIVE_WINDOWS: Cell<usize> = const { Cell::new(0) };
    static DRIVER: RefCell<DriverState> = RefCell::new(DriverState::default());
}

fn current_context() -> Option<u32> {
    DRIVER.with(|driver| driver.borrow().current)
}

fn set_current_context(context: Option<u32>) {
    DRIVER.with(|driver| driver.borrow_mut().current = context);
}

/// Behaviour of the simulated driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessOptions {
    /// Whether the modern context entry point can be looked up.
    pub modern_entry_point: bool,
    /// Whether modern context requests succeed.
    pub accept_modern: bool,
    /// Whether a swap interval entry point exists.
    pub swap_control: bool,
    /// Simulated decoration insets.
    pub insets: FrameInsets,
}

impl HeadlessOptions {
    /// Set whether the modern entry point can be looked up.
    pub fn with_modern_entry_point(mut self, available: bool) -> Self {
        self.modern_entry_point = available;
        self
    }

    /// Set whether modern context requests succeed.
    pub fn with_accept_modern(mut self, accept: bool) -> Self {
        self.accept_modern = accept;
        self
    }

    /// Set whether a swap interval entry point exists.
    pub fn with_swap_control(mut self, available: bool) -> Self {
        self.swap_control = available;
        self
    }

    /// Set the simulated decoration insets.
    pub fn with_insets(mut self, insets: FrameInsets) -> Self {
        self.insets = insets;
        self
    }
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            modern_entry_point: true,
            accept_modern: true,
            swap_control: true,
            insets: FrameInsets::HEADLESS,
        }
    }
}

/// Context operations against the simulated driver.
struct HeadlessGl {
    options: HeadlessOptions,
    live: Vec<u32>,
}

impl HeadlessGl {
    fn new(options: HeadlessOptions) -> Self {
        Self {
            options,
            live: Vec::new(),
        }
    }

    fn allocate(&mut self) -> u32 {
        let context = NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed);
        self.live.push(context);
        context
    }
}

impl ContextApi for HeadlessGl {
    type Context = u32;

    fn create_legacy(&mut self) -> WindowResult<u32> {
        Ok(self.allocate())
    }

    fn make_current(&mut self, context: Option<u32>) -> bool {
        match context {
            Some(context) if !self.live.contains(&context) => false,
            other => {
                set_current_context(other);
                true
            }
        }
    }

    fn load_modern_entry_point(&mut self) -> bool {
        self.options.modern_entry_point
    }

    fn create_modern(&mut self, _request: &ContextRequest) -> Option<u32> {
        self.options.accept_modern.then(|| self.allocate())
    }

    fn destroy(&mut self, context: u32) {
        self.live.retain(|&live| live != context);
    }
}

/// A window that exists only in memory.
///
/// # Example
///
/// ```
/// use horizon_lattice_gl::{HeadlessWindow, NativeWindow, WindowConfig};
///
/// let native = HeadlessWindow::create(&WindowConfig::new("offscreen")).unwrap();
/// assert_eq!(native.outer_rect().width, 800 + 16);
/// ```
#[derive(Debug)]
pub struct HeadlessWindow {
    id: NativeId,
    title: String,
    rect: WindowRect,
    insets: FrameInsets,
    visible: bool,
    context: u32,
    context_kind: ContextKind,
    swap_control: bool,
    swap_interval_calls: Vec<i32>,
    present_count: u64,
    destroyed: bool,
}

impl HeadlessWindow {
    /// Create a window against a driver that behaves as `options` says.
    pub fn create_with(config: &WindowConfig, options: HeadlessOptions) -> WindowResult<Self> {
        let id = NativeId::from_raw(NEXT_ID.fetch_add(1, Ordering::Relaxed));

        let mut gl = HeadlessGl::new(options);
        let negotiated = negotiate(&mut gl, config.context())?;

        EventRouter::instance().register(id)?;
        LIVE_WINDOWS.with(|live| live.set(live.get() + 1));

        // Cascade new windows like a window manager placing them by default.
        let origin = 32 * (1 + (id.raw() % 8) as i32);
        let (client_width, client_height) = config.size();
        let (width, height) = options.insets.outer_size(client_width, client_height);

        info!(
            target: targets::WINDOW,
            %id,
            title = config.title(),
            width,
            height,
            context = ?negotiated.kind,
            "created headless window"
        );

        let mut window = Self {
            id,
            title: config.native_title(),
            rect: WindowRect::new(origin, origin, width, height),
            insets: options.insets,
            visible: false,
            context: negotiated.handle,
            context_kind: negotiated.kind,
            swap_control: options.swap_control,
            swap_interval_calls: Vec::new(),
            present_count: 0,
            destroyed: false,
        };
        if config.is_visible() {
            window.set_visible(true);
        }
        Ok(window)
    }

    /// Simulate a native notification, as if the user had moved, resized,
    /// or tried to close the window.
    ///
    /// Returns `false` once the window has been destroyed.
    pub fn inject(&self, event: WindowEvent) -> bool {
        EventRouter::instance().post(self.id, event)
    }

    /// Window title with interior NULs removed.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Every interval passed to the simulated swap control, in order.
    pub fn swap_interval_calls(&self) -> &[i32] {
        &self.swap_interval_calls
    }

    /// Swap interval the simulated driver holds for this window's context,
    /// if one was ever applied to it.
    pub fn applied_swap_interval(&self) -> Option<i32> {
        DRIVER.with(|driver| driver.borrow().intervals.get(&self.context).copied())
    }

    /// Check whether this window's context is current on the calling thread.
    pub fn is_current(&self) -> bool {
        !self.destroyed && current_context() == Some(self.context)
    }

    /// Number of buffer swaps presented.
    pub fn present_count(&self) -> u64 {
        self.present_count
    }

    /// Check whether [`destroy`](NativeWindow::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Number of headless windows created and not yet destroyed on the
    /// current thread.
    pub fn live_count() -> usize {
        LIVE_WINDOWS.with(Cell::get)
    }
}

impl NativeWindow for HeadlessWindow {
    type Handle = NativeId;
    type Device = NativeId;
    type Context = u32;

    fn create(config: &WindowConfig) -> WindowResult<Self> {
        Self::create_with(config, HeadlessOptions::default())
    }

    fn id(&self) -> NativeId {
        self.id
    }

    fn handle(&self) -> NativeId {
        self.id
    }

    fn device(&self) -> NativeId {
        self.id
    }

    fn context(&self) -> u32 {
        self.context
    }

    fn context_kind(&self) -> ContextKind {
        self.context_kind
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            debug!(target: targets::WINDOW, id = %self.id, visible, "visibility changed");
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn pump_events(&mut self) {
        // Notifications are posted to the router as they happen.
    }

    fn make_current(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        set_current_context(Some(self.context));
        true
    }

    fn set_swap_interval(&mut self, interval: i32) -> bool {
        if !self.swap_control {
            return false;
        }
        if !self.make_current() {
            return false;
        }
        self.swap_interval_calls.push(interval);
        DRIVER.with(|driver| {
            let mut driver = driver.borrow_mut();
            if let Some(current) = driver.current {
                driver.intervals.insert(current, interval);
            }
        });
        true
    }

    fn present(&mut self) {
        if self.make_current() {
            self.present_count += 1;
        }
    }

    fn outer_rect(&self) -> WindowRect {
        self.rect
    }

    fn frame_insets(&self) -> FrameInsets {
        self.insets
    }

    fn set_outer_rect(&mut self, rect: WindowRect) {
        let previous = self.rect;
        self.rect = rect;

        let router = EventRouter::instance();
        if (rect.x, rect.y) != (previous.x, previous.y) {
            router.post(self.id, WindowEvent::Moved { x: rect.x, y: rect.y });
        }
        if (rect.width, rect.height) != (previous.width, previous.height) {
            router.post(
                self.id,
                WindowEvent::Resized {
                    width: rect.width,
                    height: rect.height,
                },
            );
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        EventRouter::instance().unregister(self.id);
        DRIVER.with(|driver| {
            let mut driver = driver.borrow_mut();
            if driver.current == Some(self.context) {
                driver.current = None;
            }
            driver.intervals.remove(&self.context);
        });
        LIVE_WINDOWS.with(|live| live.set(live.get().saturating_sub(1)));
        debug!(target: targets::WINDOW, id = %self.id, "destroyed headless window");
    }
}

impl Drop for HeadlessWindow {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_registers_with_router() {
        let window = HeadlessWindow::create(&WindowConfig::new("a")).unwrap();
        assert!(EventRouter::instance().contains(window.id()));
        assert!(!window.is_visible());
        assert_eq!(window.context_kind(), ContextKind::Modern { major: 3, minor: 1 });
    }

    #[test]
    fn test_outer_size_includes_insets() {
        let config = WindowConfig::new("a").with_size(320, 200);
        let window = HeadlessWindow::create(&config).unwrap();
        let rect = window.outer_rect();
        assert_eq!((rect.width, rect.height), (336, 239));
    }

    #[test]
    fn test_legacy_fallback_without_entry_point() {
        let options = HeadlessOptions::default().with_modern_entry_point(false);
        let window = HeadlessWindow::create_with(&WindowConfig::new("a"), options).unwrap();
        assert_eq!(window.context_kind(), ContextKind::Legacy);
        assert!(window.is_current());
    }

    #[test]
    fn test_legacy_fallback_when_refused() {
        let options = HeadlessOptions::default().with_accept_modern(false);
        let window = HeadlessWindow::create_with(&WindowConfig::new("a"), options).unwrap();
        assert!(!window.context_kind().is_modern());
    }

    #[test]
    fn test_visible_on_creation() {
        let window = HeadlessWindow::create(&WindowConfig::new("a").with_visible(true)).unwrap();
        assert!(window.is_visible());
    }

    #[test]
    fn test_set_outer_rect_posts_changes_only() {
        let mut window = HeadlessWindow::create(&WindowConfig::new("a")).unwrap();
        let router = EventRouter::instance();
        let rect = window.outer_rect();

        window.set_outer_rect(rect.with_position(rect.x + 5, rect.y));
        assert_eq!(
            router.drain(window.id()),
            vec![WindowEvent::Moved { x: rect.x + 5, y: rect.y }]
        );

        window.set_outer_rect(window.outer_rect());
        assert!(router.drain(window.id()).is_empty());
    }

    #[test]
    fn test_swap_control_absent() {
        let options = HeadlessOptions::default().with_swap_control(false);
        let mut window = HeadlessWindow::create_with(&WindowConfig::new("a"), options).unwrap();
        assert!(!window.set_swap_interval(1));
        assert!(window.swap_interval_calls().is_empty());
    }

    #[test]
    fn test_swap_interval_follows_make_current() {
        let mut first = HeadlessWindow::create(&WindowConfig::new("a")).unwrap();
        let mut second = HeadlessWindow::create(&WindowConfig::new("b")).unwrap();
        assert_ne!(first.context(), second.context());
        assert!(second.is_current());

        assert!(first.set_swap_interval(1));
        assert!(first.is_current());
        assert_eq!(first.applied_swap_interval(), Some(1));
        assert_eq!(second.applied_swap_interval(), None);

        second.present();
        assert!(second.is_current());
        assert_eq!(first.applied_swap_interval(), Some(1));
    }

    #[test]
    fn test_destroy_releases_current_context() {
        let mut window = HeadlessWindow::create(&WindowConfig::new("a")).unwrap();
        assert!(window.is_current());
        window.destroy();
        assert!(!window.is_current());
        assert!(!window.make_current());
        assert_eq!(current_context(), None);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let before = HeadlessWindow::live_count();
        let mut window = HeadlessWindow::create(&WindowConfig::new("a")).unwrap();
        assert_eq!(HeadlessWindow::live_count(), before + 1);

        window.destroy();
        window.destroy();
        assert!(window.is_destroyed());
        assert!(!window.inject(WindowEvent::CloseRequested));
        assert_eq!(HeadlessWindow::live_count(), before);

        drop(window);
        assert_eq!(HeadlessWindow::live_count(), before);
    }
}
