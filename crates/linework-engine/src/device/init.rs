/// Surface options for the GPU context.
///
/// Line rendering needs no optional wgpu features and default limits, so only
/// the presentation side is configurable.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when the surface offers one.
    pub prefer_srgb: bool,

    /// Swap behavior. `Fifo` (vsync) is available on every backend.
    pub present_mode: wgpu::PresentMode,

    /// Hint for how many frames may be queued ahead of presentation.
    pub frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            frame_latency: 2,
        }
    }
}
