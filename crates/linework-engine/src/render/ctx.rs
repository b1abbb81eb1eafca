use nalgebra::Matrix4;

use crate::coords::{ortho_top_left, Viewport};
use crate::device::Gpu;

/// What a line device needs to create GPU resources for the current frame.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Format of the color target the lines are drawn into.
    pub target_format: wgpu::TextureFormat,
    /// Drawable area in logical pixels.
    pub viewport: Viewport,
}

impl<'a> RenderCtx<'a> {
    pub fn from_gpu(gpu: &'a Gpu<'_>, viewport: Viewport) -> Self {
        Self {
            device: gpu.device(),
            queue: gpu.queue(),
            target_format: gpu.surface_format(),
            viewport,
        }
    }

    /// Top-left origin orthographic projection over [`Self::viewport`].
    #[inline]
    pub fn projection(&self) -> Matrix4<f32> {
        ortho_top_left(self.viewport)
    }
}
