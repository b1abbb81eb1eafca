use nalgebra::Matrix4;

/// Parameters of a color-only line effect.
///
/// Vertices are stored untransformed; the device applies
/// `projection * view * world` when a flush is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectParams {
    pub world: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,

    pub vertex_color_enabled: bool,
    pub texture_enabled: bool,
    pub lighting_enabled: bool,
}

impl EffectParams {
    #[inline]
    pub fn world_view_projection(&self) -> Matrix4<f32> {
        self.projection * self.view * self.world
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self {
            world: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            vertex_color_enabled: false,
            texture_enabled: false,
            lighting_enabled: false,
        }
    }
}

/// Shader/material used to draw a line batch.
///
/// Created by a [`LineDevice`](super::LineDevice) and exclusively owned by the
/// batch. Dropping it releases whatever GPU objects back it.
pub trait LineEffect {
    fn params(&self) -> &EffectParams;
    fn params_mut(&mut self) -> &mut EffectParams;

    /// Number of passes in the active technique. Each flush issues one draw per pass.
    fn pass_count(&self) -> usize;

    /// Enters the active technique before the first pass of a flush.
    fn begin(&mut self) {}

    /// Leaves the active technique after the last pass of a flush.
    fn end(&mut self) {}
}
