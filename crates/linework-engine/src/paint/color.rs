/// Straight-alpha RGBA color, each channel in `[0, 1]`.
///
/// Line batches blend with `src_alpha / one_minus_src_alpha`, so colors are
/// kept unpremultiplied all the way to the fragment shader.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from `0`–`255` channel bytes.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    /// Same color with alpha replaced (clamped to `[0, 1]`).
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Clamps all channels to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Channel array in vertex/uniform order.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_scales_to_unit_range() {
        assert_eq!(Color::from_u8(255, 0, 255, 255), Color::rgb(1.0, 0.0, 1.0));
        assert_eq!(Color::from_u8(0, 0, 0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::RED.with_alpha(2.0).a, 1.0);
        assert_eq!(Color::RED.with_alpha(-1.0).a, 0.0);
        assert_eq!(Color::RED.with_alpha(0.5).r, 1.0);
    }

    #[test]
    fn clamped_limits_every_channel() {
        let c = Color::rgba(1.5, -0.5, 0.25, 3.0).clamped();
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.25, 1.0));
    }
}
