//! Logging targets.
//!
//! The crate logs through the `tracing` crate and never installs a
//! subscriber. To see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_gl=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Window lifecycle: creation, visibility, geometry, close.
    pub const WINDOW: &str = "horizon_lattice_gl::window";
    /// Rendering context negotiation and swap control.
    pub const CONTEXT: &str = "horizon_lattice_gl::context";
    /// Event routing and callback dispatch.
    pub const EVENT: &str = "horizon_lattice_gl::event";
    /// Native platform calls.
    pub const PLATFORM: &str = "horizon_lattice_gl::platform";
}
