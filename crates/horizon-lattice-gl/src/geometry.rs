//! Window geometry.
//!
//! Native window systems report and accept the *outer* rectangle of a
//! window (client area plus title bar and borders). Requests from callers
//! are made in client-area units, so every backend converts between the two
//! with the decoration insets of the window's style.

/// A rectangle in screen coordinates.
///
/// For windows this is always the outer rectangle, including decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowRect {
    /// X position of the top-left corner.
    pub x: i32,
    /// Y position of the top-left corner.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl WindowRect {
    /// Create a new rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from its edges, as Win32 `RECT` stores it.
    ///
    /// Inverted edges produce an empty rectangle.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right.saturating_sub(left).max(0) as u32,
            height: bottom.saturating_sub(top).max(0) as u32,
        }
    }

    /// Same size, different top-left corner.
    pub const fn with_position(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Same top-left corner, different size.
    pub const fn with_size(self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }
}

/// Thickness of the decorations around a window's client area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameInsets {
    /// Left border.
    pub left: u32,
    /// Title bar plus top border.
    pub top: u32,
    /// Right border.
    pub right: u32,
    /// Bottom border.
    pub bottom: u32,
}

impl FrameInsets {
    /// No decorations.
    pub const NONE: Self = Self::new(0, 0, 0, 0);

    /// Decorations simulated by the headless backend: an 8 pixel frame
    /// with a 31 pixel title bar.
    pub const HEADLESS: Self = Self::new(8, 31, 8, 8);

    /// Create new insets.
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Total horizontal decoration.
    pub const fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    /// Total vertical decoration.
    pub const fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    /// Outer size for a given client size.
    pub fn outer_size(&self, client_width: u32, client_height: u32) -> (u32, u32) {
        (
            client_width.saturating_add(self.horizontal()),
            client_height.saturating_add(self.vertical()),
        )
    }

    /// Client size for a given outer size.
    pub fn client_size(&self, outer_width: u32, outer_height: u32) -> (u32, u32) {
        (
            outer_width.saturating_sub(self.horizontal()),
            outer_height.saturating_sub(self.vertical()),
        )
    }

    /// Outer rectangle of a window whose client area is `client`.
    pub fn outer_rect(&self, client: WindowRect) -> WindowRect {
        let (width, height) = self.outer_size(client.width, client.height);
        WindowRect::new(
            client.x.saturating_sub(self.left as i32),
            client.y.saturating_sub(self.top as i32),
            width,
            height,
        )
    }

    /// Outer rectangle that keeps `outer`'s top-left corner and fits a
    /// client area of `client_width` x `client_height`.
    pub fn resized(&self, outer: WindowRect, client_width: u32, client_height: u32) -> WindowRect {
        let (width, height) = self.outer_size(client_width, client_height);
        outer.with_size(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_edges() {
        let rect = WindowRect::from_edges(-8, -31, 808, 608);
        assert_eq!(rect, WindowRect::new(-8, -31, 816, 639));
    }

    #[test]
    fn test_rect_from_inverted_edges_is_empty() {
        let rect = WindowRect::from_edges(10, 10, 5, 5);
        assert_eq!(rect.width, 0);
        assert_eq!(rect.height, 0);
    }

    #[test]
    fn test_insets_round_trip_sizes() {
        let insets = FrameInsets::HEADLESS;
        assert_eq!(insets.outer_size(800, 600), (816, 639));
        assert_eq!(insets.client_size(816, 639), (800, 600));
        assert_eq!(insets.client_size(4, 4), (0, 0));
    }

    #[test]
    fn test_outer_rect_from_client() {
        let insets = FrameInsets::new(4, 20, 4, 4);
        let outer = insets.outer_rect(WindowRect::new(100, 100, 200, 150));
        assert_eq!(outer, WindowRect::new(96, 80, 208, 174));
    }

    #[test]
    fn test_resized_keeps_top_left() {
        let insets = FrameInsets::HEADLESS;
        let outer = WindowRect::new(50, 60, 100, 100);
        let resized = insets.resized(outer, 640, 480);
        assert_eq!((resized.x, resized.y), (50, 60));
        assert_eq!((resized.width, resized.height), (656, 519));
    }
}
