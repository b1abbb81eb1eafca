use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let (x, w) = if self.size.x < 0.0 {
            (self.origin.x + self.size.x, -self.size.x)
        } else {
            (self.origin.x, self.size.x)
        };
        let (y, h) = if self.size.y < 0.0 {
            (self.origin.y + self.size.y, -self.size.y)
        } else {
            (self.origin.y, self.size.y)
        };
        Rect::new(x, y, w, h)
    }

    /// Corners as a closed loop: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let r = self.normalized();
        let (min, max) = (r.min(), r.max());
        [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
    }
}
