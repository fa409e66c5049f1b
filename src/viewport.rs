//! Output surface dimensions.

use winit::dpi::PhysicalSize;

/// Pixel dimensions of the output surface.
///
/// Hosts may report a zero-sized viewport (a minimised window, a collapsed
/// container). Everything that derives projection parameters goes through
/// [`Viewport::clamped`] so that the aspect ratio stays finite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Raises each dimension to at least one pixel.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height of the clamped viewport.
    pub fn aspect(&self) -> f64 {
        let clamped = self.clamped();
        clamped.width as f64 / clamped.height as f64
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_height_is_clamped_before_division() {
        let aspect = Viewport::new(0, 600).aspect();
        assert!(aspect.is_finite());
        assert_eq!(Viewport::new(800, 0).aspect(), 800.0);
    }

    #[test]
    fn positive_sizes_are_left_alone() {
        let vp = Viewport::new(1920, 1080);
        assert_eq!(vp.clamped(), vp);
        assert!(!vp.is_degenerate());
    }
}
