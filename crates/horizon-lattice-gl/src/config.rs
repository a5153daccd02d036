//! Window configuration and builder.
//!
//! This module provides `WindowConfig`, a builder for configuring native
//! window creation, together with the rendering context and pixel format
//! requests that travel with it.

/// Reserved creation flags.
///
/// No bit is interpreted yet. The value is carried through creation and
/// kept on the window so that future options can be added without changing
/// the creation signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CreateFlags(u32);

impl CreateFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Create flags from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for CreateFlags {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

/// OpenGL context profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlProfile {
    /// Core profile, deprecated functionality removed.
    #[default]
    Core,
    /// Compatibility profile.
    Compatibility,
}

impl GlProfile {
    /// Value of the `*_CONTEXT_PROFILE_MASK_ARB` attribute.
    pub(crate) fn profile_mask(self) -> i32 {
        match self {
            GlProfile::Core => 0x0000_0001,
            GlProfile::Compatibility => 0x0000_0002,
        }
    }
}

/// Parameters of the modern context requested after the legacy context is
/// current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextRequest {
    /// Requested major version.
    pub major: u8,
    /// Requested minor version.
    pub minor: u8,
    /// Requested profile.
    pub profile: GlProfile,
    /// Request a debug context.
    pub debug: bool,
}

impl ContextRequest {
    /// Create a request for the given version with the core profile.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            profile: GlProfile::Core,
            debug: false,
        }
    }

    /// Set the profile.
    pub const fn with_profile(mut self, profile: GlProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set whether a debug context is requested.
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the zero-terminated `*CreateContextAttribsARB` attribute list.
    ///
    /// The attribute names share their values between WGL and GLX.
    pub(crate) fn attrib_list(&self) -> [i32; 9] {
        const CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
        const CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
        const CONTEXT_FLAGS_ARB: i32 = 0x2094;
        const CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;
        const CONTEXT_DEBUG_BIT_ARB: i32 = 0x0001;

        [
            CONTEXT_MAJOR_VERSION_ARB,
            i32::from(self.major),
            CONTEXT_MINOR_VERSION_ARB,
            i32::from(self.minor),
            CONTEXT_FLAGS_ARB,
            if self.debug { CONTEXT_DEBUG_BIT_ARB } else { 0 },
            CONTEXT_PROFILE_MASK_ARB,
            self.profile.profile_mask(),
            0,
        ]
    }
}

impl Default for ContextRequest {
    /// OpenGL 3.1, core profile, no debug flag.
    fn default() -> Self {
        Self::new(3, 1)
    }
}

/// Framebuffer layout requested when choosing a pixel format or visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelFormatRequest {
    /// Bits per color channel (red, green, blue).
    pub color_bits: u8,
    /// Alpha channel bits.
    pub alpha_bits: u8,
    /// Depth buffer bits.
    pub depth_bits: u8,
    /// Stencil buffer bits.
    pub stencil_bits: u8,
    /// Whether a back buffer is requested.
    pub double_buffer: bool,
}

impl Default for PixelFormatRequest {
    /// Double-buffered RGBA8 with a 24-bit depth and 8-bit stencil buffer.
    fn default() -> Self {
        Self {
            color_bits: 8,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
        }
    }
}

/// Configuration for creating a native OpenGL window.
///
/// # Example
///
/// ```
/// use horizon_lattice_gl::{ContextRequest, WindowConfig};
///
/// let config = WindowConfig::new("Viewer")
///     .with_size(1280, 720)
///     .with_visible(true)
///     .with_context(ContextRequest::new(3, 3));
///
/// assert_eq!(config.size(), (1280, 720));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Window title.
    title: String,
    /// Client area width.
    width: u32,
    /// Client area height.
    height: u32,
    /// Reserved creation flags.
    flags: CreateFlags,
    /// Whether the window is shown right after creation.
    visible: bool,
    /// Modern context request.
    context: ContextRequest,
    /// Pixel format request.
    pixel_format: PixelFormatRequest,
}

impl WindowConfig {
    /// Create a new configuration with the given title.
    ///
    /// The client area defaults to 800x600 and the window starts hidden.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 800,
            height: 600,
            flags: CreateFlags::NONE,
            visible: false,
            context: ContextRequest::default(),
            pixel_format: PixelFormatRequest::default(),
        }
    }

    /// Set the client area size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the reserved creation flags.
    pub fn with_flags(mut self, flags: impl Into<CreateFlags>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Set whether the window is shown right after creation.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the modern context request.
    pub fn with_context(mut self, context: ContextRequest) -> Self {
        self.context = context;
        self
    }

    /// Set the pixel format request.
    pub fn with_pixel_format(mut self, pixel_format: PixelFormatRequest) -> Self {
        self.pixel_format = pixel_format;
        self
    }

    /// Get the window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the client area size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the reserved creation flags.
    pub fn flags(&self) -> CreateFlags {
        self.flags
    }

    /// Check whether the window is shown right after creation.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Get the modern context request.
    pub fn context(&self) -> &ContextRequest {
        &self.context
    }

    /// Get the pixel format request.
    pub fn pixel_format(&self) -> &PixelFormatRequest {
        &self.pixel_format
    }

    /// Title with interior NUL characters removed, for C string APIs.
    pub(crate) fn native_title(&self) -> String {
        self.title.replace('\0', "")
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_config_defaults() {
        let config = WindowConfig::new("Test");
        assert_eq!(config.title(), "Test");
        assert_eq!(config.size(), (800, 600));
        assert!(config.flags().is_empty());
        assert!(!config.is_visible());
        assert_eq!(*config.context(), ContextRequest::new(3, 1));
        assert_eq!(config.pixel_format().depth_bits, 24);
        assert_eq!(config.pixel_format().stencil_bits, 8);
        assert!(config.pixel_format().double_buffer);
    }

    #[test]
    fn test_window_config_builders() {
        let config = WindowConfig::new("Builder")
            .with_size(320, 240)
            .with_flags(0x10u32)
            .with_visible(true)
            .with_context(ContextRequest::new(4, 5).with_debug(true));

        assert_eq!(config.size(), (320, 240));
        assert_eq!(config.flags().bits(), 0x10);
        assert!(config.is_visible());
        assert_eq!(config.context().major, 4);
        assert!(config.context().debug);
    }

    #[test]
    fn test_native_title_strips_nul() {
        let config = WindowConfig::new("a\0b");
        assert_eq!(config.native_title(), "ab");
    }

    #[test]
    fn test_default_attrib_list() {
        let attribs = ContextRequest::default().attrib_list();
        assert_eq!(
            attribs,
            [0x2091, 3, 0x2092, 1, 0x2094, 0, 0x9126, 1, 0]
        );
    }

    #[test]
    fn test_compatibility_debug_attrib_list() {
        let attribs = ContextRequest::new(4, 6)
            .with_profile(GlProfile::Compatibility)
            .with_debug(true)
            .attrib_list();
        assert_eq!(attribs[5], 0x0001);
        assert_eq!(attribs[7], 0x0002);
        assert_eq!(attribs[8], 0);
    }
}
