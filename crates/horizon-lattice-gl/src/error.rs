//! Error types for native window creation.

use thiserror::Error;

/// Errors that can occur while creating a native OpenGL window.
///
/// Only creation is fallible. Missing optional capabilities (the modern
/// context entry point, swap control) are never reported as errors, and
/// teardown is best effort.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The native window class could not be registered.
    #[error("failed to register window class: {0}")]
    ClassRegistration(String),

    /// A windowing or OpenGL system library could not be loaded.
    #[error("failed to load system library: {0}")]
    LibraryLoad(String),

    /// No connection to the display server could be opened.
    #[error("display server unavailable")]
    DisplayUnavailable,

    /// The native window could not be created.
    #[error("window creation failed: {0}")]
    CreationFailed(String),

    /// Another live window is already registered under this native handle.
    #[error("native handle {0:#x} is already registered")]
    DuplicateHandle(u64),

    /// No pixel format or visual matches the request.
    #[error("no matching pixel format: {0}")]
    PixelFormat(String),

    /// The legacy rendering context could not be created or made current.
    #[error("failed to create rendering context: {0}")]
    ContextCreation(String),
}

/// Result type for window operations.
pub type WindowResult<T> = Result<T, WindowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_error_display() {
        let err = WindowError::CreationFailed("test error".to_string());
        assert!(err.to_string().contains("test error"));

        let err = WindowError::DuplicateHandle(0x2a);
        assert!(err.to_string().contains("0x2a"));

        let err = WindowError::DisplayUnavailable;
        assert!(err.to_string().contains("display"));

        let err = WindowError::PixelFormat("no visual".into());
        assert!(err.to_string().contains("pixel format"));
    }
}
