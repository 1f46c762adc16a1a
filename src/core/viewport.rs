//! # Viewport
//!
//! Classifies the host surface into `mobile` or `desktop` from its logical
//! width. Everything downstream (auto-collapse, which surface renders the
//! tree, whether hover previews are allowed) keys off [`ViewportClass`].

/// Width at which the layout switches from mobile to desktop (logical px).
pub const MOBILE_BREAKPOINT: u32 = 1024;

/// Secondary breakpoint for very narrow phones. Exposed for hosts; the
/// navigation core never branches on it.
pub const COMPACT_BREAKPOINT: u32 = 420;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    /// Anything narrower than [`MOBILE_BREAKPOINT`] is mobile.
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_BREAKPOINT {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        matches!(self, ViewportClass::Mobile)
    }
}

/// Logical viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn class(&self) -> ViewportClass {
        ViewportClass::from_width(self.width)
    }

    /// True below the secondary phone breakpoint.
    pub fn is_compact(&self) -> bool {
        self.width < COMPACT_BREAKPOINT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_is_desktop() {
        assert_eq!(ViewportClass::from_width(1023), ViewportClass::Mobile);
        assert_eq!(ViewportClass::from_width(1024), ViewportClass::Desktop);
    }

    #[test]
    fn test_compact_breakpoint() {
        assert!(Viewport::new(419, 800).is_compact());
        assert!(!Viewport::new(420, 800).is_compact());
        assert!(Viewport::new(420, 800).class().is_mobile());
    }
}
