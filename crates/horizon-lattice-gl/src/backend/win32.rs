//! Win32 backend with a WGL context.
//!
//! All windows share one registered class whose window procedure turns
//! `WM_MOVE`, `WM_SIZE`/`WM_SIZING` and `WM_CLOSE` into [`WindowEvent`]s and
//! posts them to the [`EventRouter`]. Messages for windows the router does
//! not know fall through to `DefWindowProcW`.
//!
//! Every call in this module must happen on the thread that created the
//! window.

use std::mem;

use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};
use windows::Win32::Foundation::{BOOL, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetDC, HDC, ReleaseDC};
use windows::Win32::Graphics::OpenGL::{
    ChoosePixelFormat, HGLRC, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_FLAGS,
    PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR, SetPixelFormat, SwapBuffers,
    wglCreateContext, wglDeleteContext, wglGetCurrentContext, wglGetCurrentDC, wglGetProcAddress,
    wglMakeCurrent,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, CS_DBLCLKS, CS_HREDRAW, CS_OWNDC, CS_VREDRAW, CW_USEDEFAULT,
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GWL_EXSTYLE, GWL_STYLE,
    GetWindowLongW, GetWindowRect, IDC_ARROW, IsWindowVisible, LoadCursorW, MSG, MoveWindow,
    PM_REMOVE, PeekMessageW, RegisterClassExW, SW_HIDE, SW_SHOW, ShowWindow, TranslateMessage,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_MOVE, WM_SIZE, WM_SIZING, WNDCLASSEXW,
    WS_CAPTION, WS_MAXIMIZEBOX, WS_MINIMIZEBOX, WS_OVERLAPPED, WS_SYSMENU, WS_THICKFRAME,
};
use windows::core::{HSTRING, PCSTR, PCWSTR, s, w};

use super::NativeWindow;
use crate::config::{ContextRequest, PixelFormatRequest, WindowConfig};
use crate::context::{ContextApi, ContextKind, negotiate};
use crate::error::{WindowError, WindowResult};
use crate::event::{NativeId, WindowEvent};
use crate::geometry::{FrameInsets, WindowRect};
use crate::logging::targets;
use crate::router::EventRouter;

const WINDOW_CLASS: PCWSTR = w!("HorizonLatticeGlWindow");

/// Whether [`WINDOW_CLASS`] has been registered in this process.
static CLASS_REGISTERED: Mutex<bool> = parking_lot::const_mutex(false);

type WglCreateContextAttribsArb = unsafe extern "system" fn(HDC, HGLRC, *const i32) -> HGLRC;
type WglSwapIntervalExt = unsafe extern "system" fn(i32) -> BOOL;

fn window_style() -> WINDOW_STYLE {
    WS_CAPTION | WS_MAXIMIZEBOX | WS_MINIMIZEBOX | WS_THICKFRAME | WS_OVERLAPPED | WS_SYSMENU
}

fn native_id(hwnd: HWND) -> NativeId {
    NativeId::from_raw(hwnd.0 as usize as u64)
}

/// A width or height as Win32 takes it, saturating at `i32::MAX`.
fn extent(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn register_class(instance: HINSTANCE) -> WindowResult<()> {
    let mut registered = CLASS_REGISTERED.lock();
    if *registered {
        return Ok(());
    }

    // SAFETY: the class name is a static wide string and the procedure has
    // the required signature.
    let atom = unsafe {
        let class = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_DBLCLKS | CS_OWNDC | CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(window_proc),
            hInstance: instance,
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            lpszClassName: WINDOW_CLASS,
            ..Default::default()
        };
        RegisterClassExW(&class)
    };
    if atom == 0 {
        return Err(WindowError::ClassRegistration(
            windows::core::Error::from_win32().to_string(),
        ));
    }

    *registered = true;
    debug!(target: targets::PLATFORM, "registered window class");
    Ok(())
}

/// Decoration insets of a window with the given styles.
fn insets_for_style(style: WINDOW_STYLE, ex_style: WINDOW_EX_STYLE) -> FrameInsets {
    let mut rect = RECT::default();
    // SAFETY: `rect` is a valid out pointer.
    if let Err(err) = unsafe { AdjustWindowRectEx(&mut rect, style, BOOL::from(false), ex_style) } {
        warn!(target: targets::PLATFORM, error = %err, "AdjustWindowRectEx failed");
        return FrameInsets::NONE;
    }
    FrameInsets::new(
        rect.left.unsigned_abs(),
        rect.top.unsigned_abs(),
        rect.right.max(0) as u32,
        rect.bottom.max(0) as u32,
    )
}

fn window_rect(hwnd: HWND) -> Option<WindowRect> {
    let mut rect = RECT::default();
    // SAFETY: `rect` is a valid out pointer.
    unsafe { GetWindowRect(hwnd, &mut rect) }.ok()?;
    Some(WindowRect::from_edges(
        rect.left,
        rect.top,
        rect.right,
        rect.bottom,
    ))
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let event = match msg {
        WM_MOVE => window_rect(hwnd).map(|rect| WindowEvent::Moved {
            x: rect.x,
            y: rect.y,
        }),
        WM_SIZE | WM_SIZING => window_rect(hwnd).map(|rect| WindowEvent::Resized {
            width: rect.width,
            height: rect.height,
        }),
        WM_CLOSE => Some(WindowEvent::CloseRequested),
        _ => None,
    };

    if let Some(event) = event {
        if EventRouter::instance().post(native_id(hwnd), event) {
            // WM_SIZING asks for TRUE when handled.
            return LRESULT(isize::from(msg == WM_SIZING));
        }
    }

    // SAFETY: forwarding the unmodified message.
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Look up a WGL extension function.
///
/// Some drivers return small sentinel values instead of null for unknown
/// names.
fn wgl_proc(name: PCSTR) -> Option<unsafe extern "system" fn() -> isize> {
    // SAFETY: `name` is a static NUL-terminated string.
    let proc = unsafe { wglGetProcAddress(name) }?;
    match proc as usize {
        1 | 2 | 3 | usize::MAX => None,
        _ => Some(proc),
    }
}

fn set_pixel_format(hdc: HDC, request: &PixelFormatRequest) -> WindowResult<()> {
    let mut flags: PFD_FLAGS = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
    if request.double_buffer {
        flags = flags | PFD_DOUBLEBUFFER;
    }

    let descriptor = PIXELFORMATDESCRIPTOR {
        nSize: mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16,
        nVersion: 1,
        dwFlags: flags,
        iPixelType: PFD_TYPE_RGBA,
        cColorBits: request.color_bits.saturating_mul(3),
        cRedBits: request.color_bits,
        cGreenBits: request.color_bits,
        cBlueBits: request.color_bits,
        cAlphaBits: request.alpha_bits,
        cDepthBits: request.depth_bits,
        cStencilBits: request.stencil_bits,
        ..Default::default()
    };

    // SAFETY: `hdc` is the window's device context and `descriptor` is
    // fully initialized.
    unsafe {
        let format = ChoosePixelFormat(hdc, &descriptor);
        if format == 0 {
            return Err(WindowError::PixelFormat(
                windows::core::Error::from_win32().to_string(),
            ));
        }
        SetPixelFormat(hdc, format, &descriptor)
            .map_err(|err| WindowError::PixelFormat(err.to_string()))?;
        trace!(target: targets::PLATFORM, format, "pixel format set");
    }
    Ok(())
}

/// WGL context operations on one device context.
struct Wgl {
    hdc: HDC,
    create_attribs: Option<WglCreateContextAttribsArb>,
}

impl ContextApi for Wgl {
    type Context = HGLRC;

    fn create_legacy(&mut self) -> WindowResult<HGLRC> {
        // SAFETY: the device context has a pixel format set.
        unsafe { wglCreateContext(self.hdc) }
            .map_err(|err| WindowError::ContextCreation(err.to_string()))
    }

    fn make_current(&mut self, context: Option<HGLRC>) -> bool {
        // SAFETY: a null context releases the current one.
        unsafe { wglMakeCurrent(self.hdc, context.unwrap_or_default()) }.is_ok()
    }

    fn load_modern_entry_point(&mut self) -> bool {
        self.create_attribs = wgl_proc(s!("wglCreateContextAttribsARB")).map(|proc| {
            // SAFETY: the extension defines this signature for the name.
            unsafe { mem::transmute::<_, WglCreateContextAttribsArb>(proc) }
        });
        self.create_attribs.is_some()
    }

    fn create_modern(&mut self, request: &ContextRequest) -> Option<HGLRC> {
        let create = self.create_attribs?;
        let attribs = request.attrib_list();
        // SAFETY: the attribute list is zero-terminated and outlives the call.
        let context = unsafe { create(self.hdc, HGLRC::default(), attribs.as_ptr()) };
        (!context.0.is_null()).then_some(context)
    }

    fn destroy(&mut self, context: HGLRC) {
        // SAFETY: the context is not current.
        if let Err(err) = unsafe { wglDeleteContext(context) } {
            warn!(target: targets::CONTEXT, error = %err, "wglDeleteContext failed");
        }
    }
}

/// A Win32 window with a WGL context.
#[derive(Debug)]
pub struct Win32Window {
    hwnd: HWND,
    hdc: HDC,
    context: HGLRC,
    context_kind: ContextKind,
    id: NativeId,
    destroyed: bool,
}

impl NativeWindow for Win32Window {
    type Handle = HWND;
    type Device = HDC;
    type Context = HGLRC;

    fn create(config: &WindowConfig) -> WindowResult<Self> {
        // SAFETY: querying the module handle of the running executable.
        let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }
            .map_err(|err| WindowError::CreationFailed(err.to_string()))?
            .into();
        register_class(instance)?;

        let style = window_style();
        let ex_style = WINDOW_EX_STYLE::default();
        let (client_width, client_height) = config.size();
        let (width, height) =
            insets_for_style(style, ex_style).outer_size(client_width, client_height);
        let title = HSTRING::from(config.native_title());

        // SAFETY: the class is registered and the title outlives the call.
        let hwnd = unsafe {
            CreateWindowExW(
                ex_style,
                WINDOW_CLASS,
                &title,
                style,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                extent(width),
                extent(height),
                None,
                None,
                instance,
                None,
            )
        }
        .map_err(|err| WindowError::CreationFailed(err.to_string()))?;

        let id = native_id(hwnd);
        if let Err(err) = EventRouter::instance().register(id) {
            // SAFETY: the window was created above and is not shared.
            if let Err(destroy_err) = unsafe { DestroyWindow(hwnd) } {
                warn!(target: targets::PLATFORM, error = %destroy_err, "DestroyWindow failed");
            }
            return Err(err);
        }

        // From here on, dropping `window` releases everything acquired.
        let mut window = Self {
            hwnd,
            hdc: HDC::default(),
            context: HGLRC::default(),
            context_kind: ContextKind::Legacy,
            id,
            destroyed: false,
        };

        // SAFETY: the window has CS_OWNDC, so the DC stays valid until release.
        window.hdc = unsafe { GetDC(hwnd) };
        if window.hdc.0.is_null() {
            return Err(WindowError::CreationFailed("GetDC returned null".into()));
        }

        set_pixel_format(window.hdc, config.pixel_format())?;

        let mut wgl = Wgl {
            hdc: window.hdc,
            create_attribs: None,
        };
        let negotiated = negotiate(&mut wgl, config.context())?;
        window.context = negotiated.handle;
        window.context_kind = negotiated.kind;

        info!(
            target: targets::WINDOW,
            %id,
            title = config.title(),
            width,
            height,
            context = ?negotiated.kind,
            "created Win32 window"
        );

        if config.is_visible() {
            window.set_visible(true);
        }
        Ok(window)
    }

    fn id(&self) -> NativeId {
        self.id
    }

    fn handle(&self) -> HWND {
        self.hwnd
    }

    fn device(&self) -> HDC {
        self.hdc
    }

    fn context(&self) -> HGLRC {
        self.context
    }

    fn context_kind(&self) -> ContextKind {
        self.context_kind
    }

    fn set_visible(&mut self, visible: bool) {
        if self.is_visible() == visible {
            return;
        }
        // SAFETY: the window is alive.
        let _ = unsafe { ShowWindow(self.hwnd, if visible { SW_SHOW } else { SW_HIDE }) };
        debug!(target: targets::WINDOW, id = %self.id, visible, "visibility changed");
    }

    fn is_visible(&self) -> bool {
        // SAFETY: the window is alive.
        unsafe { IsWindowVisible(self.hwnd) }.as_bool()
    }

    fn pump_events(&mut self) {
        let mut msg = MSG::default();
        // SAFETY: `msg` is a valid out pointer; dispatch re-enters
        // `window_proc`, which only touches the router.
        unsafe {
            while PeekMessageW(&mut msg, self.hwnd, 0, 0, PM_REMOVE).as_bool() {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
    }

    fn make_current(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        // SAFETY: the DC and context belong to this window.
        unsafe {
            if wglGetCurrentContext() == self.context && wglGetCurrentDC() == self.hdc {
                return true;
            }
            wglMakeCurrent(self.hdc, self.context).is_ok()
        }
    }

    fn set_swap_interval(&mut self, interval: i32) -> bool {
        if !self.make_current() {
            warn!(target: targets::CONTEXT, id = %self.id, "context could not be made current");
            return false;
        }
        let Some(proc) = wgl_proc(s!("wglSwapIntervalEXT")) else {
            return false;
        };
        // SAFETY: the extension defines this signature for the name.
        let swap_interval = unsafe { mem::transmute::<_, WglSwapIntervalExt>(proc) };
        // SAFETY: the window's context was made current above.
        let accepted = unsafe { swap_interval(interval) }.as_bool();
        if !accepted {
            warn!(target: targets::CONTEXT, interval, "wglSwapIntervalEXT rejected interval");
        }
        true
    }

    fn present(&mut self) {
        if !self.make_current() {
            trace!(target: targets::PLATFORM, id = %self.id, "present without current context");
        }
        // SAFETY: the DC belongs to this window.
        if let Err(err) = unsafe { SwapBuffers(self.hdc) } {
            trace!(target: targets::PLATFORM, error = %err, "SwapBuffers failed");
        }
    }

    fn outer_rect(&self) -> WindowRect {
        window_rect(self.hwnd).unwrap_or_default()
    }

    fn frame_insets(&self) -> FrameInsets {
        // SAFETY: the window is alive.
        let (style, ex_style) = unsafe {
            (
                GetWindowLongW(self.hwnd, GWL_STYLE),
                GetWindowLongW(self.hwnd, GWL_EXSTYLE),
            )
        };
        insets_for_style(WINDOW_STYLE(style as u32), WINDOW_EX_STYLE(ex_style as u32))
    }

    fn set_outer_rect(&mut self, rect: WindowRect) {
        // SAFETY: the window is alive; MoveWindow re-enters `window_proc`.
        let moved = unsafe {
            MoveWindow(
                self.hwnd,
                rect.x,
                rect.y,
                extent(rect.width),
                extent(rect.height),
                BOOL::from(true),
            )
        };
        if let Err(err) = moved {
            warn!(target: targets::PLATFORM, error = %err, "MoveWindow failed");
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        EventRouter::instance().unregister(self.id);

        // SAFETY: every handle below was created by this window and is
        // released exactly once.
        unsafe {
            if !self.context.0.is_null() {
                if wglGetCurrentContext() == self.context {
                    let _ = wglMakeCurrent(HDC::default(), HGLRC::default());
                }
                if let Err(err) = wglDeleteContext(self.context) {
                    warn!(target: targets::CONTEXT, error = %err, "wglDeleteContext failed");
                }
            }
            if !self.hdc.0.is_null() {
                ReleaseDC(self.hwnd, self.hdc);
            }
            if let Err(err) = DestroyWindow(self.hwnd) {
                warn!(target: targets::PLATFORM, error = %err, "DestroyWindow failed");
            }
        }

        debug!(target: targets::WINDOW, id = %self.id, "destroyed Win32 window");
    }
}

impl Drop for Win32Window {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapped_style_has_decorations() {
        let insets = insets_for_style(window_style(), WINDOW_EX_STYLE::default());
        assert!(insets.top > insets.bottom);
        assert!(insets.horizontal() > 0);
    }

    #[test]
    fn test_extent_saturates() {
        assert_eq!(extent(640), 640);
        assert_eq!(extent(i32::MAX as u32), i32::MAX);
        assert_eq!(extent(u32::MAX), i32::MAX);
    }

    #[test]
    #[ignore = "requires an interactive desktop session"]
    fn test_two_windows_keep_their_own_context() {
        let mut first = Win32Window::create(&WindowConfig::new("first")).unwrap();
        let second = Win32Window::create(&WindowConfig::new("second")).unwrap();
        // SAFETY: querying the calling thread's current context.
        assert_eq!(unsafe { wglGetCurrentContext() }, second.context);

        first.set_swap_interval(1);
        // SAFETY: as above.
        assert_eq!(unsafe { wglGetCurrentContext() }, first.context);
    }

    #[test]
    #[ignore = "requires an interactive desktop session"]
    fn test_create_and_destroy() {
        let mut window = Win32Window::create(&WindowConfig::new("win32 test")).unwrap();
        assert!(EventRouter::instance().contains(window.id()));
        assert!(!window.context.0.is_null());
        window.destroy();
        assert!(!EventRouter::instance().contains(window.id()));
    }
}
