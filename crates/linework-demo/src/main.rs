use anyhow::Result;
use winit::dpi::LogicalSize;

use linework_engine::coords::{Rect, Vec2, Viewport};
use linework_engine::core::{App, AppControl, FrameCtx};
use linework_engine::device::GpuInit;
use linework_engine::logging::{init_logging, LoggingConfig};
use linework_engine::paint::Color;
use linework_engine::render::lines::{
    LineBatch, LineBatchError, LineBatchResult, OutlineStyle, Polygon, WgpuLineDevice,
};
use linework_engine::window::{Runtime, RuntimeConfig};

const GRID_SPACING: f32 = 40.0;
const STARBURST_RAYS: usize = 2000;
const STATS_INTERVAL: f32 = 1.0;

struct Shape {
    polygon: Polygon,
    /// Center as a fraction of the viewport.
    anchor: Vec2,
    spin: f32,
    color: Color,
    style: OutlineStyle,
}

struct Demo {
    batch: Option<LineBatch<WgpuLineDevice>>,
    shapes: Vec<Shape>,
    last_report: f32,
}

impl Demo {
    fn new() -> Self {
        let shape = |sides, radius, anchor: (f32, f32), spin, color, style| Shape {
            polygon: Polygon::regular(sides, radius),
            anchor: Vec2::new(anchor.0, anchor.1),
            spin,
            color,
            style,
        };

        Self {
            batch: None,
            shapes: vec![
                shape(3, 70.0, (0.2, 0.25), 0.8, Color::RED, OutlineStyle::Solid),
                shape(6, 80.0, (0.5, 0.25), -0.5, Color::GREEN, OutlineStyle::Dashed),
                shape(5, 75.0, (0.8, 0.25), 1.3, Color::YELLOW, OutlineStyle::Dashed),
                shape(12, 90.0, (0.2, 0.75), 0.3, Color::BLUE, OutlineStyle::Solid),
                shape(40, 90.0, (0.8, 0.75), -0.2, Color::WHITE, OutlineStyle::Dashed),
            ],
            last_report: 0.0,
        }
    }

    fn update(&mut self, viewport: Viewport, t: f32) {
        for shape in &mut self.shapes {
            let center = Vec2::new(shape.anchor.x * viewport.width, shape.anchor.y * viewport.height);
            let pulse = 1.0 + 0.1 * (t * 2.0).sin();
            shape.polygon.set_transform(center, t * shape.spin, pulse);
        }
    }
}

fn draw_scene(
    batch: &mut LineBatch<WgpuLineDevice>,
    shapes: &[Shape],
    viewport: Viewport,
    t: f32,
) -> LineBatchResult<()> {
    batch.open();

    let grid = Color::rgb(0.3, 0.35, 0.4).with_alpha(0.35);
    let mut x = 0.0;
    while x <= viewport.width {
        batch.draw_line(Vec2::new(x, 0.0), Vec2::new(x, viewport.height), grid)?;
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= viewport.height {
        batch.draw_line(Vec2::new(0.0, y), Vec2::new(viewport.width, y), grid)?;
        y += GRID_SPACING;
    }

    for shape in shapes {
        batch.draw_polygon_outline(&shape.polygon, shape.color, shape.style)?;
    }

    // Enough short rays to overflow the buffer several times per frame.
    let center = Vec2::new(viewport.width * 0.5, viewport.height * 0.75);
    for i in 0..STARBURST_RAYS {
        let f = i as f32 / STARBURST_RAYS as f32;
        let dir = Vec2::from_angle(f * core::f32::consts::TAU + t * 0.25);
        let inner = 20.0 + 10.0 * (f * 50.0 + t * 3.0).sin();
        batch.draw_line_gradient(
            center + dir * inner,
            center + dir * 110.0,
            Color::rgb(1.0, f, 1.0 - f),
            Color::rgb(f, 0.2, 1.0).with_alpha(0.0),
        )?;
    }

    let inset = Rect::new(8.0, 8.0, viewport.width - 16.0, viewport.height - 16.0);
    batch.draw_rect(inset, Color::WHITE.with_alpha(0.6))?;

    batch.close()
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let t = ctx.time.elapsed;
        self.update(ctx.viewport(), t);

        let mut failure: Option<LineBatchError> = None;
        let control = ctx.render(Color::rgb(0.04, 0.05, 0.07), |rctx, view| {
            if self.batch.is_none() {
                match LineBatch::new(WgpuLineDevice::new(rctx)) {
                    Ok(batch) => self.batch = Some(batch),
                    Err(e) => {
                        failure = Some(e);
                        return None;
                    }
                }
            }
            let batch = self.batch.as_mut()?;

            batch.device_mut().begin_frame(view);
            batch.set_projection(rctx.projection());
            if let Err(e) = draw_scene(batch, &self.shapes, rctx.viewport, t) {
                failure = Some(e);
            }
            batch.device_mut().finish_frame()
        });

        if let Some(e) = failure {
            log::error!("line rendering failed: {e}");
            return AppControl::Exit;
        }

        if t - self.last_report >= STATS_INTERVAL {
            if let Some(batch) = self.batch.as_mut() {
                let stats = batch.stats();
                log::info!(
                    "frame {}: {} flushes ({} on overflow), {} draw calls, {:.1} segments/flush",
                    ctx.time.frame_index,
                    stats.flushes,
                    stats.overflow_flushes,
                    stats.draw_calls,
                    stats.avg_segments_per_flush()
                );
            }
            self.last_report = t;
        }
        if let Some(batch) = self.batch.as_mut() {
            batch.reset_stats();
        }

        control
    }
}

impl Drop for Demo {
    fn drop(&mut self) {
        if let Some(batch) = self.batch.as_mut() {
            batch.release();
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "linework demo".to_string(),
        initial_size: LogicalSize::new(1024.0, 768.0),
    };

    Runtime::run(config, GpuInit::default(), Demo::new())
}
