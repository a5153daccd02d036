//! X11 backend with a GLX context.
//!
//! Xlib and libGL are loaded at runtime through `x11-dl`, once per thread.
//! Each window owns its own display connection, so pumping one window's
//! events never consumes another's.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char, c_int, c_long, c_uchar, c_uint, c_ulong, c_void};
use std::mem;
use std::ptr;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, trace, warn};
use x11_dl::glx::{self, Glx};
use x11_dl::xlib::{self, Xlib};

use super::NativeWindow;
use crate::config::{ContextRequest, PixelFormatRequest, WindowConfig};
use crate::context::{ContextApi, ContextKind, negotiate};
use crate::error::{WindowError, WindowResult};
use crate::event::{NativeId, WindowEvent};
use crate::geometry::{FrameInsets, WindowRect};
use crate::logging::targets;
use crate::router::EventRouter;

// GLX 1.3 attribute names and values.
const GLX_RGBA: c_int = 4;
const GLX_DOUBLEBUFFER: c_int = 5;
const GLX_RED_SIZE: c_int = 8;
const GLX_GREEN_SIZE: c_int = 9;
const GLX_BLUE_SIZE: c_int = 10;
const GLX_ALPHA_SIZE: c_int = 11;
const GLX_DEPTH_SIZE: c_int = 12;
const GLX_STENCIL_SIZE: c_int = 13;
const GLX_X_VISUAL_TYPE: c_int = 0x22;
const GLX_TRUE_COLOR: c_int = 0x8002;
const GLX_DRAWABLE_TYPE: c_int = 0x8010;
const GLX_RENDER_TYPE: c_int = 0x8011;
const GLX_X_RENDERABLE: c_int = 0x8012;
const GLX_RGBA_TYPE: c_int = 0x8014;
const GLX_WINDOW_BIT: c_int = 0x0001;
const GLX_RGBA_BIT: c_int = 0x0001;

const X_SUCCESS: c_int = 0;

type GlxCreateContextAttribsArb = unsafe extern "C" fn(
    *mut xlib::Display,
    glx::GLXFBConfig,
    glx::GLXContext,
    xlib::Bool,
    *const c_int,
) -> glx::GLXContext;
type GlxSwapIntervalExt = unsafe extern "C" fn(*mut xlib::Display, glx::GLXDrawable, c_int);
type GlxSwapIntervalMesa = unsafe extern "C" fn(c_uint) -> c_int;
type GlxSwapIntervalSgi = unsafe extern "C" fn(c_int) -> c_int;

/// Loaded Xlib and GLX entry points.
struct GlxLibraries {
    xlib: Xlib,
    glx: Glx,
}

thread_local! {
    static LIBRARIES: RefCell<Option<Rc<GlxLibraries>>> = const { RefCell::new(None) };
}

fn libraries() -> WindowResult<Rc<GlxLibraries>> {
    LIBRARIES.with(|cell| {
        if let Some(libs) = cell.borrow().as_ref() {
            return Ok(Rc::clone(libs));
        }
        let xlib = Xlib::open().map_err(|err| WindowError::LibraryLoad(err.to_string()))?;
        let glx = Glx::open().map_err(|err| WindowError::LibraryLoad(err.to_string()))?;
        debug!(target: targets::PLATFORM, "loaded Xlib and libGL");
        let libs = Rc::new(GlxLibraries { xlib, glx });
        *cell.borrow_mut() = Some(Rc::clone(&libs));
        Ok(libs)
    })
}

/// Set by [`record_x_error`] while an [`ErrorTrap`] is installed.
static X_ERROR: AtomicBool = AtomicBool::new(false);

unsafe extern "C" fn record_x_error(
    _display: *mut xlib::Display,
    _event: *mut xlib::XErrorEvent,
) -> c_int {
    X_ERROR.store(true, Ordering::SeqCst);
    0
}

/// Temporarily replaces the Xlib error handler so that a failing GLX
/// request reports an error instead of terminating the process.
struct ErrorTrap<'a> {
    xlib: &'a Xlib,
    display: *mut xlib::Display,
    previous: Option<unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int>,
}

impl<'a> ErrorTrap<'a> {
    fn install(xlib: &'a Xlib, display: *mut xlib::Display) -> Self {
        // SAFETY: `display` is an open connection.
        let previous = unsafe {
            (xlib.XSync)(display, xlib::False);
            X_ERROR.store(false, Ordering::SeqCst);
            (xlib.XSetErrorHandler)(Some(record_x_error))
        };
        Self {
            xlib,
            display,
            previous,
        }
    }

    /// Flush pending requests, restore the previous handler, and report
    /// whether any request failed.
    fn finish(self) -> bool {
        // SAFETY: `display` is an open connection.
        unsafe {
            (self.xlib.XSync)(self.display, xlib::False);
            (self.xlib.XSetErrorHandler)(self.previous);
        }
        X_ERROR.swap(false, Ordering::SeqCst)
    }
}

/// Check whether the display's GLX extension string lists `name`.
fn has_glx_extension(libs: &GlxLibraries, display: *mut xlib::Display, name: &str) -> bool {
    // SAFETY: `display` is an open connection; the returned string is owned
    // by Xlib and valid until the connection closes.
    unsafe {
        let screen = (libs.xlib.XDefaultScreen)(display);
        let extensions = (libs.glx.glXQueryExtensionsString)(display, screen);
        if extensions.is_null() {
            return false;
        }
        CStr::from_ptr(extensions)
            .to_string_lossy()
            .split_whitespace()
            .any(|extension| extension == name)
    }
}

/// Interval to hand to GLX swap control.
///
/// Negative (adaptive) intervals are only valid with
/// `GLX_EXT_swap_control_tear`; without it they fall back to plain vsync
/// at the same magnitude.
fn glx_swap_interval(interval: i32, tear_control: bool) -> i32 {
    if interval < 0 && !tear_control {
        interval.saturating_abs()
    } else {
        interval
    }
}

/// Events for the difference between two client rectangles, reported in
/// outer coordinates. A notify that changes nothing yields nothing.
fn geometry_events(
    previous: WindowRect,
    next: WindowRect,
    insets: FrameInsets,
) -> Vec<WindowEvent> {
    let mut events = Vec::new();
    if (next.x, next.y) != (previous.x, previous.y) {
        let outer = insets.outer_rect(next);
        events.push(WindowEvent::Moved {
            x: outer.x,
            y: outer.y,
        });
    }
    if (next.width, next.height) != (previous.width, previous.height) {
        let (width, height) = insets.outer_size(next.width, next.height);
        events.push(WindowEvent::Resized { width, height });
    }
    events
}

fn glx_proc(libs: &GlxLibraries, name: &CStr) -> Option<unsafe extern "C" fn()> {
    // SAFETY: `name` is NUL-terminated.
    unsafe { (libs.glx.glXGetProcAddress)(name.as_ptr() as *const c_uchar) }
}

/// `XVisualInfo` allocated by GLX, freed on drop.
struct VisualInfo<'a> {
    xlib: &'a Xlib,
    info: *mut xlib::XVisualInfo,
    fbconfig: Option<glx::GLXFBConfig>,
}

impl Drop for VisualInfo<'_> {
    fn drop(&mut self) {
        // SAFETY: `info` was returned by GLX and is freed exactly once.
        unsafe {
            (self.xlib.XFree)(self.info as *mut c_void);
        }
    }
}

fn choose_visual<'a>(
    libs: &'a GlxLibraries,
    display: *mut xlib::Display,
    screen: c_int,
    request: &PixelFormatRequest,
) -> WindowResult<VisualInfo<'a>> {
    let color = c_int::from(request.color_bits);
    let double_buffer = xlib::Bool::from(request.double_buffer);
    let fb_attribs = [
        GLX_X_RENDERABLE,
        xlib::True,
        GLX_DRAWABLE_TYPE,
        GLX_WINDOW_BIT,
        GLX_RENDER_TYPE,
        GLX_RGBA_BIT,
        GLX_X_VISUAL_TYPE,
        GLX_TRUE_COLOR,
        GLX_RED_SIZE,
        color,
        GLX_GREEN_SIZE,
        color,
        GLX_BLUE_SIZE,
        color,
        GLX_ALPHA_SIZE,
        c_int::from(request.alpha_bits),
        GLX_DEPTH_SIZE,
        c_int::from(request.depth_bits),
        GLX_STENCIL_SIZE,
        c_int::from(request.stencil_bits),
        GLX_DOUBLEBUFFER,
        double_buffer,
        0,
    ];

    // SAFETY: the attribute lists are zero-terminated; returned arrays are
    // freed with XFree.
    unsafe {
        let mut count: c_int = 0;
        let configs =
            (libs.glx.glXChooseFBConfig)(display, screen, fb_attribs.as_ptr(), &mut count);
        if !configs.is_null() {
            let fbconfig = (count > 0).then(|| *configs);
            (libs.xlib.XFree)(configs as *mut c_void);
            if let Some(fbconfig) = fbconfig {
                let info = (libs.glx.glXGetVisualFromFBConfig)(display, fbconfig);
                if !info.is_null() {
                    trace!(target: targets::PLATFORM, "visual chosen from framebuffer config");
                    return Ok(VisualInfo {
                        xlib: &libs.xlib,
                        info,
                        fbconfig: Some(fbconfig),
                    });
                }
            }
        }

        // GLX 1.2 servers: boolean attributes take no value.
        let mut legacy_attribs = vec![
            GLX_RGBA,
            GLX_RED_SIZE,
            color,
            GLX_GREEN_SIZE,
            color,
            GLX_BLUE_SIZE,
            color,
            GLX_DEPTH_SIZE,
            c_int::from(request.depth_bits),
            GLX_STENCIL_SIZE,
            c_int::from(request.stencil_bits),
        ];
        if request.double_buffer {
            legacy_attribs.push(GLX_DOUBLEBUFFER);
        }
        legacy_attribs.push(0);

        let info = (libs.glx.glXChooseVisual)(display, screen, legacy_attribs.as_mut_ptr());
        if info.is_null() {
            return Err(WindowError::PixelFormat(
                "no GLX visual matches the requested format".into(),
            ));
        }
        debug!(target: targets::PLATFORM, "visual chosen with glXChooseVisual");
        Ok(VisualInfo {
            xlib: &libs.xlib,
            info,
            fbconfig: None,
        })
    }
}

/// GLX context operations on one window.
struct GlxContexts<'a> {
    libs: &'a GlxLibraries,
    display: *mut xlib::Display,
    drawable: xlib::Window,
    visual: &'a VisualInfo<'a>,
    create_attribs: Option<GlxCreateContextAttribsArb>,
}

impl ContextApi for GlxContexts<'_> {
    type Context = glx::GLXContext;

    fn create_legacy(&mut self) -> WindowResult<glx::GLXContext> {
        let trap = ErrorTrap::install(&self.libs.xlib, self.display);
        // SAFETY: the visual and framebuffer config belong to `display`.
        let context = unsafe {
            match self.visual.fbconfig {
                Some(fbconfig) => (self.libs.glx.glXCreateNewContext)(
                    self.display,
                    fbconfig,
                    GLX_RGBA_TYPE,
                    ptr::null_mut(),
                    xlib::True,
                ),
                None => (self.libs.glx.glXCreateContext)(
                    self.display,
                    self.visual.info,
                    ptr::null_mut(),
                    xlib::True,
                ),
            }
        };
        let failed = trap.finish();
        if context.is_null() || failed {
            return Err(WindowError::ContextCreation(
                "GLX refused to create a context".into(),
            ));
        }
        Ok(context)
    }

    fn make_current(&mut self, context: Option<glx::GLXContext>) -> bool {
        let (drawable, context) = match context {
            Some(context) => (self.drawable, context),
            None => (0, ptr::null_mut()),
        };
        // SAFETY: `drawable` is this window or none.
        unsafe { (self.libs.glx.glXMakeCurrent)(self.display, drawable, context) != 0 }
    }

    fn load_modern_entry_point(&mut self) -> bool {
        if self.visual.fbconfig.is_none()
            || !has_glx_extension(self.libs, self.display, "GLX_ARB_create_context")
        {
            return false;
        }
        self.create_attribs = glx_proc(self.libs, c"glXCreateContextAttribsARB").map(|proc| {
            // SAFETY: the extension defines this signature for the name.
            unsafe { mem::transmute::<unsafe extern "C" fn(), GlxCreateContextAttribsArb>(proc) }
        });
        self.create_attribs.is_some()
    }

    fn create_modern(&mut self, request: &ContextRequest) -> Option<glx::GLXContext> {
        let create = self.create_attribs?;
        let fbconfig = self.visual.fbconfig?;
        let attribs = request.attrib_list();

        let trap = ErrorTrap::install(&self.libs.xlib, self.display);
        // SAFETY: the attribute list is zero-terminated and outlives the call.
        let context = unsafe {
            create(
                self.display,
                fbconfig,
                ptr::null_mut(),
                xlib::True,
                attribs.as_ptr(),
            )
        };
        let failed = trap.finish();

        if failed || context.is_null() {
            if !context.is_null() {
                self.destroy(context);
            }
            return None;
        }
        Some(context)
    }

    fn destroy(&mut self, context: glx::GLXContext) {
        // SAFETY: the context belongs to `display` and is not current.
        unsafe { (self.libs.glx.glXDestroyContext)(self.display, context) }
    }
}

/// An Xlib window with a GLX context.
pub struct X11Window {
    libs: Rc<GlxLibraries>,
    display: *mut xlib::Display,
    window: xlib::Window,
    colormap: xlib::Colormap,
    context: glx::GLXContext,
    context_kind: ContextKind,
    wm_delete_window: xlib::Atom,
    net_frame_extents: xlib::Atom,
    id: NativeId,
    registered: bool,
    visible: bool,
    /// Client rectangle in root coordinates as of the last ConfigureNotify.
    geometry: WindowRect,
    destroyed: bool,
}

impl std::fmt::Debug for X11Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11Window")
            .field("display", &self.display)
            .field("window", &self.window)
            .field("context", &self.context)
            .field("context_kind", &self.context_kind)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

impl X11Window {
    fn intern_atom(&self, name: &CStr) -> xlib::Atom {
        // SAFETY: `name` is NUL-terminated.
        unsafe { (self.libs.xlib.XInternAtom)(self.display, name.as_ptr(), xlib::False) }
    }

    fn flush(&self) {
        // SAFETY: the display is open.
        unsafe {
            (self.libs.xlib.XFlush)(self.display);
        }
    }

    /// Root window coordinates of the client area's top-left corner.
    fn client_origin(&self) -> Option<(i32, i32)> {
        let xlib = &self.libs.xlib;
        // SAFETY: out pointers are valid for the duration of the call.
        unsafe {
            let root = (xlib.XDefaultRootWindow)(self.display);
            let (mut x, mut y, mut child): (c_int, c_int, xlib::Window) = (0, 0, 0);
            let same_screen = (xlib.XTranslateCoordinates)(
                self.display,
                self.window,
                root,
                0,
                0,
                &mut x,
                &mut y,
                &mut child,
            );
            (same_screen != 0).then_some((x, y))
        }
    }

    /// Client area in root window coordinates.
    fn client_rect(&self) -> Option<WindowRect> {
        let xlib = &self.libs.xlib;
        // SAFETY: out pointers are valid for the duration of each call.
        unsafe {
            let mut attributes: xlib::XWindowAttributes = mem::zeroed();
            if (xlib.XGetWindowAttributes)(self.display, self.window, &mut attributes) == 0 {
                return None;
            }
            let (mut x, mut y, mut child): (c_int, c_int, xlib::Window) = (0, 0, 0);
            (xlib.XTranslateCoordinates)(
                self.display,
                self.window,
                attributes.root,
                0,
                0,
                &mut x,
                &mut y,
                &mut child,
            );
            Some(WindowRect::new(
                x,
                y,
                attributes.width.max(0) as u32,
                attributes.height.max(0) as u32,
            ))
        }
    }

    fn translate(&mut self, event: &xlib::XEvent) -> Vec<WindowEvent> {
        // SAFETY: union fields are read according to the event type.
        unsafe {
            match event.get_type() {
                xlib::ConfigureNotify => {
                    let configure = event.configure;
                    // Synthetic notifies from the window manager carry root
                    // coordinates; real ones are relative to the frame.
                    let (x, y) = if configure.send_event != 0 {
                        (configure.x, configure.y)
                    } else {
                        self.client_origin()
                            .unwrap_or((self.geometry.x, self.geometry.y))
                    };
                    let next = WindowRect::new(
                        x,
                        y,
                        configure.width.max(0) as u32,
                        configure.height.max(0) as u32,
                    );
                    let previous = mem::replace(&mut self.geometry, next);
                    geometry_events(previous, next, self.frame_insets())
                }
                xlib::ClientMessage => {
                    let atom = event.client_message.data.get_long(0) as xlib::Atom;
                    if atom == self.wm_delete_window {
                        vec![WindowEvent::CloseRequested]
                    } else {
                        Vec::new()
                    }
                }
                xlib::MapNotify => {
                    self.visible = true;
                    Vec::new()
                }
                xlib::UnmapNotify => {
                    self.visible = false;
                    Vec::new()
                }
                _ => Vec::new(),
            }
        }
    }
}

impl NativeWindow for X11Window {
    type Handle = xlib::Window;
    type Device = *mut xlib::Display;
    type Context = glx::GLXContext;

    fn create(config: &WindowConfig) -> WindowResult<Self> {
        let libs = libraries()?;

        // SAFETY: a null name opens the display named by $DISPLAY.
        let display = unsafe { (libs.xlib.XOpenDisplay)(ptr::null()) };
        if display.is_null() {
            return Err(WindowError::DisplayUnavailable);
        }

        // From here on, dropping `window` releases everything acquired.
        let mut window = Self {
            libs: Rc::clone(&libs),
            display,
            window: 0,
            colormap: 0,
            context: ptr::null_mut(),
            context_kind: ContextKind::Legacy,
            wm_delete_window: 0,
            net_frame_extents: 0,
            id: NativeId::from_raw(0),
            registered: false,
            visible: false,
            geometry: WindowRect::default(),
            destroyed: false,
        };

        let xlib = &libs.xlib;
        // SAFETY: the display is open.
        let (screen, root) = unsafe {
            let screen = (xlib.XDefaultScreen)(display);
            (screen, (xlib.XRootWindow)(display, screen))
        };

        let visual = choose_visual(&libs, display, screen, config.pixel_format())?;
        let (width, height) = config.size();

        // SAFETY: the visual belongs to `display`; `attributes` outlives the
        // call.
        unsafe {
            let info = &*visual.info;
            window.colormap =
                (xlib.XCreateColormap)(display, root, info.visual, xlib::AllocNone as c_int);

            let mut attributes: xlib::XSetWindowAttributes = mem::zeroed();
            attributes.colormap = window.colormap;
            attributes.border_pixel = 0;
            attributes.event_mask = xlib::StructureNotifyMask as c_long;

            window.window = (xlib.XCreateWindow)(
                display,
                root,
                0,
                0,
                width.max(1),
                height.max(1),
                0,
                info.depth,
                xlib::InputOutput as c_uint,
                info.visual,
                (xlib::CWColormap | xlib::CWEventMask | xlib::CWBorderPixel) as c_ulong,
                &mut attributes,
            );
        }
        if window.window == 0 {
            return Err(WindowError::CreationFailed("XCreateWindow failed".into()));
        }
        window.geometry = WindowRect::new(0, 0, width.max(1), height.max(1));

        window.id = NativeId::from_raw(u64::from(window.window));
        EventRouter::instance().register(window.id)?;
        window.registered = true;

        let title = CString::new(config.native_title()).unwrap_or_default();
        window.wm_delete_window = window.intern_atom(c"WM_DELETE_WINDOW");
        window.net_frame_extents = window.intern_atom(c"_NET_FRAME_EXTENTS");
        // SAFETY: the window is alive and the title is NUL-terminated.
        unsafe {
            (xlib.XStoreName)(display, window.window, title.as_ptr() as *const c_char);
            let mut protocols = [window.wm_delete_window];
            (xlib.XSetWMProtocols)(display, window.window, protocols.as_mut_ptr(), 1);
        }

        let mut contexts = GlxContexts {
            libs: &libs,
            display,
            drawable: window.window,
            visual: &visual,
            create_attribs: None,
        };
        let negotiated = negotiate(&mut contexts, config.context())?;
        window.context = negotiated.handle;
        window.context_kind = negotiated.kind;
        drop(visual);

        info!(
            target: targets::WINDOW,
            id = %window.id,
            title = config.title(),
            width,
            height,
            context = ?negotiated.kind,
            "created X11 window"
        );

        if config.is_visible() {
            window.set_visible(true);
        }
        window.flush();
        Ok(window)
    }

    fn id(&self) -> NativeId {
        self.id
    }

    fn handle(&self) -> xlib::Window {
        self.window
    }

    fn device(&self) -> *mut xlib::Display {
        self.display
    }

    fn context(&self) -> glx::GLXContext {
        self.context
    }

    fn context_kind(&self) -> ContextKind {
        self.context_kind
    }

    fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        // SAFETY: the window is alive.
        unsafe {
            if visible {
                (self.libs.xlib.XMapWindow)(self.display, self.window);
            } else {
                (self.libs.xlib.XUnmapWindow)(self.display, self.window);
            }
        }
        self.flush();
        self.visible = visible;
        debug!(target: targets::WINDOW, id = %self.id, visible, "visibility changed");
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn pump_events(&mut self) {
        let router = EventRouter::instance();
        loop {
            // SAFETY: the display is open; XNextEvent fills `event`.
            let event = unsafe {
                if (self.libs.xlib.XPending)(self.display) <= 0 {
                    break;
                }
                let mut event: xlib::XEvent = mem::zeroed();
                (self.libs.xlib.XNextEvent)(self.display, &mut event);
                event
            };
            // SAFETY: every event carries the `any` header.
            let target = NativeId::from_raw(u64::from(unsafe { event.any.window }));
            for translated in self.translate(&event) {
                router.post(target, translated);
            }
        }
    }

    fn make_current(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        let glx = &self.libs.glx;
        // SAFETY: the context and window belong to this display.
        unsafe {
            if (glx.glXGetCurrentContext)() == self.context
                && (glx.glXGetCurrentDrawable)() == self.window
            {
                return true;
            }
            (glx.glXMakeCurrent)(self.display, self.window, self.context) != 0
        }
    }

    fn set_swap_interval(&mut self, requested: i32) -> bool {
        if !self.make_current() {
            warn!(target: targets::CONTEXT, id = %self.id, "context could not be made current");
            return false;
        }
        let libs = &*self.libs;
        let display = self.display;

        if has_glx_extension(libs, display, "GLX_EXT_swap_control") {
            if let Some(proc) = glx_proc(libs, c"glXSwapIntervalEXT") {
                let tear_control = requested < 0
                    && has_glx_extension(libs, display, "GLX_EXT_swap_control_tear");
                let interval = glx_swap_interval(requested, tear_control);
                let trap = ErrorTrap::install(&libs.xlib, display);
                // SAFETY: the extension defines this signature for the name.
                unsafe {
                    let swap = mem::transmute::<unsafe extern "C" fn(), GlxSwapIntervalExt>(proc);
                    swap(display, self.window, interval);
                }
                if trap.finish() {
                    warn!(target: targets::CONTEXT, interval, "glXSwapIntervalEXT failed");
                }
                return true;
            }
        }

        // MESA and SGI have no adaptive mode.
        let interval = glx_swap_interval(requested, false);

        if has_glx_extension(libs, display, "GLX_MESA_swap_control") {
            if let Some(proc) = glx_proc(libs, c"glXSwapIntervalMESA") {
                // SAFETY: the extension defines this signature for the name.
                let status = unsafe {
                    let swap = mem::transmute::<unsafe extern "C" fn(), GlxSwapIntervalMesa>(proc);
                    swap(interval.unsigned_abs())
                };
                if status != 0 {
                    warn!(target: targets::CONTEXT, interval, "glXSwapIntervalMESA failed");
                }
                return true;
            }
        }

        if has_glx_extension(libs, display, "GLX_SGI_swap_control") {
            if let Some(proc) = glx_proc(libs, c"glXSwapIntervalSGI") {
                // SGI only accepts positive intervals.
                if interval > 0 {
                    // SAFETY: the extension defines this signature for the name.
                    unsafe {
                        let swap =
                            mem::transmute::<unsafe extern "C" fn(), GlxSwapIntervalSgi>(proc);
                        swap(interval);
                    }
                } else {
                    debug!(target: targets::CONTEXT, interval, "GLX_SGI_swap_control cannot disable vsync");
                }
                return true;
            }
        }

        false
    }

    fn present(&mut self) {
        if !self.make_current() {
            trace!(target: targets::PLATFORM, id = %self.id, "present without current context");
        }
        // SAFETY: the window is a GLX drawable on `display`.
        unsafe { (self.libs.glx.glXSwapBuffers)(self.display, self.window) }
    }

    fn outer_rect(&self) -> WindowRect {
        self.client_rect()
            .map(|client| self.frame_insets().outer_rect(client))
            .unwrap_or_default()
    }

    fn frame_insets(&self) -> FrameInsets {
        if self.net_frame_extents == 0 {
            return FrameInsets::NONE;
        }
        let xlib = &self.libs.xlib;
        // SAFETY: out pointers are valid; the property buffer is freed with
        // XFree.
        unsafe {
            let mut actual_type: xlib::Atom = 0;
            let mut actual_format: c_int = 0;
            let mut item_count: c_ulong = 0;
            let mut bytes_after: c_ulong = 0;
            let mut data: *mut c_uchar = ptr::null_mut();
            let status = (xlib.XGetWindowProperty)(
                self.display,
                self.window,
                self.net_frame_extents,
                0,
                4,
                xlib::False,
                xlib::XA_CARDINAL,
                &mut actual_type,
                &mut actual_format,
                &mut item_count,
                &mut bytes_after,
                &mut data,
            );
            if status != X_SUCCESS || data.is_null() {
                return FrameInsets::NONE;
            }

            // Format 32 properties are returned as arrays of C longs,
            // ordered left, right, top, bottom.
            let insets = if actual_format == 32 && item_count == 4 {
                let extents = std::slice::from_raw_parts(data as *const c_ulong, 4);
                FrameInsets::new(
                    extents[0] as u32,
                    extents[2] as u32,
                    extents[1] as u32,
                    extents[3] as u32,
                )
            } else {
                FrameInsets::NONE
            };
            (xlib.XFree)(data as *mut c_void);
            insets
        }
    }

    fn set_outer_rect(&mut self, rect: WindowRect) {
        let (width, height) = self.frame_insets().client_size(rect.width, rect.height);
        // SAFETY: the window is alive.
        unsafe {
            (self.libs.xlib.XMoveResizeWindow)(
                self.display,
                self.window,
                rect.x,
                rect.y,
                width.max(1),
                height.max(1),
            );
        }
        self.flush();
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if self.registered {
            EventRouter::instance().unregister(self.id);
        }

        let xlib = &self.libs.xlib;
        let glx = &self.libs.glx;
        // SAFETY: every resource below was created on this display and is
        // released exactly once, before the display is closed.
        unsafe {
            if !self.context.is_null() {
                if (glx.glXGetCurrentContext)() == self.context {
                    (glx.glXMakeCurrent)(self.display, 0, ptr::null_mut());
                }
                (glx.glXDestroyContext)(self.display, self.context);
            }
            if self.window != 0 {
                (xlib.XDestroyWindow)(self.display, self.window);
            }
            if self.colormap != 0 {
                (xlib.XFreeColormap)(self.display, self.colormap);
            }
            (xlib.XCloseDisplay)(self.display);
        }

        debug!(target: targets::WINDOW, id = %self.id, "destroyed X11 window");
    }
}

impl Drop for X11Window {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_interval_needs_tear_control() {
        assert_eq!(glx_swap_interval(-1, true), -1);
        assert_eq!(glx_swap_interval(-1, false), 1);
        assert_eq!(glx_swap_interval(-2, false), 2);
        assert_eq!(glx_swap_interval(i32::MIN, false), i32::MAX);
        assert_eq!(glx_swap_interval(0, false), 0);
        assert_eq!(glx_swap_interval(1, false), 1);
    }

    #[test]
    fn test_configure_with_move_and_resize_reports_both() {
        let previous = WindowRect::new(0, 0, 800, 600);
        let next = WindowRect::new(100, 50, 640, 480);
        assert_eq!(
            geometry_events(previous, next, FrameInsets::NONE),
            vec![
                WindowEvent::Moved { x: 100, y: 50 },
                WindowEvent::Resized {
                    width: 640,
                    height: 480
                },
            ]
        );
    }

    #[test]
    fn test_unchanged_configure_reports_nothing() {
        let rect = WindowRect::new(40, 30, 800, 600);
        assert!(geometry_events(rect, rect, FrameInsets::HEADLESS).is_empty());
    }

    #[test]
    fn test_configure_events_use_outer_geometry() {
        let insets = FrameInsets::new(4, 24, 4, 4);
        let previous = WindowRect::new(104, 124, 320, 200);

        assert_eq!(
            geometry_events(previous, previous.with_position(204, 124), insets),
            vec![WindowEvent::Moved { x: 200, y: 100 }]
        );
        assert_eq!(
            geometry_events(previous, previous.with_size(400, 300), insets),
            vec![WindowEvent::Resized {
                width: 408,
                height: 328
            }]
        );
    }

    #[test]
    #[ignore = "requires an X server and libGL"]
    fn test_create_and_destroy() {
        let mut window = X11Window::create(&WindowConfig::new("x11 test")).unwrap();
        assert!(EventRouter::instance().contains(window.id()));
        assert!(!window.context().is_null());
        window.destroy();
        assert!(!EventRouter::instance().contains(window.id()));
    }
}
