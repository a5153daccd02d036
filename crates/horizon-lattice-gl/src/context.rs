//! Rendering context negotiation.
//!
//! Drivers expose modern context creation (`wglCreateContextAttribsARB`,
//! `glXCreateContextAttribsARB`) only as an extension function, and the
//! extension loader only works while *some* context is current. Every
//! backend therefore runs the same two-step sequence:
//!
//! 1. create a legacy context and make it current;
//! 2. look up the modern entry point and, if present, request the
//!    configured version. On success the legacy context is released and
//!    destroyed and the modern one is made current. On absence or failure
//!    the legacy context stays current.
//!
//! Only step 1 can fail window creation.

use tracing::{debug, info};

use crate::config::ContextRequest;
use crate::error::{WindowError, WindowResult};
use crate::logging::targets;

/// Which context a window ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// The legacy context created first. The driver did not expose the
    /// modern entry point, or refused the request.
    Legacy,
    /// A context created through the modern entry point.
    Modern {
        /// Major version that was requested.
        major: u8,
        /// Minor version that was requested.
        minor: u8,
    },
}

impl ContextKind {
    /// Check whether the modern upgrade succeeded.
    pub fn is_modern(&self) -> bool {
        matches!(self, ContextKind::Modern { .. })
    }
}

/// Platform context operations used by [`negotiate`].
///
/// Implemented by the WGL and GLX backends on top of their device (HDC or
/// display + drawable), and by the headless backend.
pub trait ContextApi {
    /// Native context handle.
    type Context: Copy;

    /// Create a context with the platform's legacy entry point.
    fn create_legacy(&mut self) -> WindowResult<Self::Context>;

    /// Make `context` current on the window's drawable, or release the
    /// current context when `None`. Returns `false` if the platform refused.
    fn make_current(&mut self, context: Option<Self::Context>) -> bool;

    /// Look up the modern creation entry point. Returns `false` if the
    /// driver does not expose it.
    fn load_modern_entry_point(&mut self) -> bool;

    /// Create a context through the modern entry point.
    fn create_modern(&mut self, request: &ContextRequest) -> Option<Self::Context>;

    /// Destroy a context that is not current.
    fn destroy(&mut self, context: Self::Context);
}

/// Result of a successful negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedContext<C> {
    /// The adopted context; current on the calling thread.
    pub handle: C,
    /// Whether the adopted context is the legacy or the modern one.
    pub kind: ContextKind,
}

/// Create the legacy context, then try to upgrade to `request`.
///
/// # Errors
///
/// Returns an error only if the legacy context cannot be created or made
/// current. A missing or failing modern entry point is not an error.
pub fn negotiate<A: ContextApi>(
    api: &mut A,
    request: &ContextRequest,
) -> WindowResult<NegotiatedContext<A::Context>> {
    let legacy = api.create_legacy()?;
    if !api.make_current(Some(legacy)) {
        api.destroy(legacy);
        return Err(WindowError::ContextCreation(
            "legacy context could not be made current".into(),
        ));
    }

    if !api.load_modern_entry_point() {
        debug!(
            target: targets::CONTEXT,
            "modern context entry point unavailable, keeping legacy context"
        );
        return Ok(NegotiatedContext {
            handle: legacy,
            kind: ContextKind::Legacy,
        });
    }

    let Some(modern) = api.create_modern(request) else {
        debug!(
            target: targets::CONTEXT,
            major = request.major,
            minor = request.minor,
            profile = ?request.profile,
            "modern context request refused, keeping legacy context"
        );
        return Ok(NegotiatedContext {
            handle: legacy,
            kind: ContextKind::Legacy,
        });
    };

    api.make_current(None);
    api.destroy(legacy);
    if !api.make_current(Some(modern)) {
        // The legacy context is gone; the modern one is all that is left.
        api.destroy(modern);
        return Err(WindowError::ContextCreation(
            "modern context could not be made current".into(),
        ));
    }

    info!(
        target: targets::CONTEXT,
        major = request.major,
        minor = request.minor,
        profile = ?request.profile,
        "upgraded to modern context"
    );

    Ok(NegotiatedContext {
        handle: modern,
        kind: ContextKind::Modern {
            major: request.major,
            minor: request.minor,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        CreateLegacy,
        MakeCurrent(Option<u32>),
        LoadEntry,
        CreateModern,
        Destroy(u32),
    }

    struct Recorder {
        calls: Vec<Call>,
        legacy_fails: bool,
        has_entry: bool,
        modern_ok: bool,
    }

    impl Recorder {
        fn new(has_entry: bool, modern_ok: bool) -> Self {
            Self {
                calls: Vec::new(),
                legacy_fails: false,
                has_entry,
                modern_ok,
            }
        }
    }

    impl ContextApi for Recorder {
        type Context = u32;

        fn create_legacy(&mut self) -> WindowResult<u32> {
            self.calls.push(Call::CreateLegacy);
            if self.legacy_fails {
                Err(WindowError::ContextCreation("no driver".into()))
            } else {
                Ok(1)
            }
        }

        fn make_current(&mut self, context: Option<u32>) -> bool {
            self.calls.push(Call::MakeCurrent(context));
            true
        }

        fn load_modern_entry_point(&mut self) -> bool {
            self.calls.push(Call::LoadEntry);
            self.has_entry
        }

        fn create_modern(&mut self, _request: &ContextRequest) -> Option<u32> {
            self.calls.push(Call::CreateModern);
            self.modern_ok.then_some(2)
        }

        fn destroy(&mut self, context: u32) {
            self.calls.push(Call::Destroy(context));
        }
    }

    #[test]
    fn test_upgrade_sequence() {
        let mut api = Recorder::new(true, true);
        let ctx = negotiate(&mut api, &ContextRequest::default()).unwrap();

        assert_eq!(ctx.handle, 2);
        assert_eq!(ctx.kind, ContextKind::Modern { major: 3, minor: 1 });
        assert_eq!(
            api.calls,
            vec![
                Call::CreateLegacy,
                Call::MakeCurrent(Some(1)),
                Call::LoadEntry,
                Call::CreateModern,
                Call::MakeCurrent(None),
                Call::Destroy(1),
                Call::MakeCurrent(Some(2)),
            ]
        );
    }

    #[test]
    fn test_missing_entry_point_keeps_legacy() {
        let mut api = Recorder::new(false, true);
        let ctx = negotiate(&mut api, &ContextRequest::default()).unwrap();

        assert_eq!(ctx.handle, 1);
        assert_eq!(ctx.kind, ContextKind::Legacy);
        assert!(!api.calls.contains(&Call::CreateModern));
        assert!(!api.calls.iter().any(|c| matches!(c, Call::Destroy(_))));
    }

    #[test]
    fn test_refused_request_keeps_legacy() {
        let mut api = Recorder::new(true, false);
        let ctx = negotiate(&mut api, &ContextRequest::new(4, 6)).unwrap();

        assert_eq!(ctx.kind, ContextKind::Legacy);
        assert_eq!(api.calls.last(), Some(&Call::CreateModern));
    }

    #[test]
    fn test_legacy_failure_is_an_error() {
        let mut api = Recorder::new(true, true);
        api.legacy_fails = true;
        let err = negotiate(&mut api, &ContextRequest::default()).unwrap_err();

        assert!(matches!(err, WindowError::ContextCreation(_)));
        assert_eq!(api.calls, vec![Call::CreateLegacy]);
    }
}
