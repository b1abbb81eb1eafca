use crate::coords::Vec2;

/// Closed loop of already-transformed points.
///
/// The last point connects back to the first; do not repeat it.
pub trait PolygonSource {
    fn transformed_points(&self) -> &[Vec2];
}

impl PolygonSource for [Vec2] {
    fn transformed_points(&self) -> &[Vec2] {
        self
    }
}

impl<const N: usize> PolygonSource for [Vec2; N] {
    fn transformed_points(&self) -> &[Vec2] {
        self
    }
}

impl PolygonSource for Vec<Vec2> {
    fn transformed_points(&self) -> &[Vec2] {
        self
    }
}

/// How a polygon outline is decomposed into segments.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum OutlineStyle {
    /// Every edge.
    #[default]
    Solid,
    /// Edges starting at even indices only. With an odd point count the
    /// closing edge `(N-1, 0)` is drawn right next to edge 0.
    Dashed,
}

impl OutlineStyle {
    #[inline]
    pub(super) fn step(self) -> usize {
        match self {
            OutlineStyle::Solid => 1,
            OutlineStyle::Dashed => 2,
        }
    }
}

/// Polygon with model-space points and a cached world-space copy.
///
/// Points are scaled, rotated (radians) and then translated by `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    local: Vec<Vec2>,
    transformed: Vec<Vec2>,

    position: Vec2,
    rotation: f32,
    scale: f32,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        let transformed = points.clone();
        Self {
            local: points,
            transformed,
            position: Vec2::zero(),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    /// Regular polygon with `sides` vertices on a circle of `radius`, first
    /// vertex pointing up. Fewer than 3 sides yields an empty polygon.
    pub fn regular(sides: usize, radius: f32) -> Self {
        if sides < 3 {
            return Self::new(Vec::new());
        }
        let step = core::f32::consts::TAU / sides as f32;
        let start = -core::f32::consts::FRAC_PI_2;
        let points = (0..sides)
            .map(|i| Vec2::from_angle(start + step * i as f32) * radius)
            .collect();
        Self::new(points)
    }

    #[inline]
    pub fn local_points(&self) -> &[Vec2] {
        &self.local
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.local.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Sets the transform and refreshes the transformed points.
    pub fn set_transform(&mut self, position: Vec2, rotation: f32, scale: f32) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;

        self.transformed.clear();
        self.transformed.extend(
            self.local
                .iter()
                .map(|&p| (p * scale).rotated(rotation) + position),
        );
    }
}

impl PolygonSource for Polygon {
    fn transformed_points(&self) -> &[Vec2] {
        &self.transformed
    }
}
