use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::paint::Color;
use crate::render::RenderCtx;
use crate::time::FrameTime;

use super::app::AppControl;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Window size in logical pixels.
    pub fn viewport(&self) -> Viewport {
        let logical: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        Viewport::new(logical.width as f32, logical.height as f32)
    }

    /// Clears the frame to `clear`, runs `draw` and presents.
    ///
    /// `draw` receives the render context and the frame's target view and
    /// returns command buffers to submit after the clear pass, e.g. the
    /// result of [`WgpuLineDevice::finish_frame`].
    ///
    /// [`WgpuLineDevice::finish_frame`]: crate::render::lines::WgpuLineDevice::finish_frame
    pub fn render<F, I>(&mut self, clear: Color, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &wgpu::TextureView) -> I,
        I: IntoIterator<Item = wgpu::CommandBuffer>,
    {
        let viewport = self.viewport();
        if !viewport.is_valid() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        {
            let _clear = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("linework clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let extra: Vec<_> = {
            let rctx = RenderCtx::from_gpu(self.gpu, viewport);
            draw(&rctx, &frame.view).into_iter().collect()
        };

        self.window.pre_present_notify();
        self.gpu.submit(frame, extra);
        AppControl::Continue
    }
}
