//! Native OpenGL windows for Horizon Lattice.
//!
//! This crate opens a single OS window bound to an OpenGL context and keeps
//! the surface around it deliberately small:
//!
//! - **Window**: creation with a client-area size, show/hide, move/resize,
//!   geometry queries, and close
//! - **Context**: a legacy context that is upgraded to a versioned core
//!   context when the driver allows it
//! - **Presentation**: buffer swaps with a cached swap interval
//! - **Events**: move, resize and close-request callbacks, delivered from a
//!   non-blocking [`Window::dequeue_events`]
//! - **Clock**: a high-resolution monotonic tick counter
//!
//! Backends: Win32/WGL on Windows, Xlib/GLX on Linux and the BSDs, and an
//! in-memory [`HeadlessWindow`] everywhere.
//!
//! # Example
//!
//! ```no_run
//! use horizon_lattice_gl::{Window, WindowConfig, now, ticks_per_second};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut window = Window::from_config(&WindowConfig::new("Demo").with_visible(true))?;
//!
//!     window.set_on_close(Some(Box::new(|w: &mut Window| w.set_user_data(()))));
//!     window.set_on_resize(Some(Box::new(|w: &mut Window| {
//!         println!("resized to {}x{}", w.width(), w.height());
//!     })));
//!
//!     let start = now();
//!     while window.user_data::<()>().is_none() {
//!         window.dequeue_events();
//!         // ... draw with any OpenGL loader ...
//!         window.swap_buffers(1);
//!     }
//!
//!     let seconds = (now() - start) as f64 / ticks_per_second() as f64;
//!     println!("ran for {seconds:.1}s");
//!     window.close();
//!     Ok(())
//! }
//! ```
//!
//! # Threading
//!
//! Windows and their contexts belong to the thread that created them.
//! [`Window`] is neither `Send` nor `Sync`.

mod backend;
mod clock;
mod config;
mod context;
mod dispatch;
mod error;
mod event;
mod geometry;
pub mod logging;
mod router;
mod window;

pub use backend::{HeadlessOptions, HeadlessWindow, NativeWindow, PlatformWindow};
#[cfg(target_os = "windows")]
pub use backend::win32::Win32Window;
#[cfg(all(unix, not(target_os = "macos")))]
pub use backend::x11::X11Window;
pub use clock::{now, ticks_per_second, ticks_to_duration};
pub use config::{CreateFlags, ContextRequest, GlProfile, PixelFormatRequest, WindowConfig};
pub use context::{ContextApi, ContextKind, NegotiatedContext, negotiate};
pub use error::{WindowError, WindowResult};
pub use event::{NativeId, WindowEvent};
pub use geometry::{FrameInsets, WindowRect};
pub use router::EventRouter;
pub use window::{Window, WindowCallback};
