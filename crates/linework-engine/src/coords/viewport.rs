/// Viewport size in logical pixels.
///
/// Used as the basis of the orthographic projection handed to line batches.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns a viewport safe to divide by (each side at least one pixel).
    #[inline]
    pub fn clamped(self) -> Self {
        let side = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self::new(side(self.width), side(self.height))
    }
}
