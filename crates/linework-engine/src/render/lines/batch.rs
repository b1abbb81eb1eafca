use nalgebra::Matrix4;

use crate::coords::{forward_view, Rect, Vec2};
use crate::paint::Color;

use super::device::{BlendState, LineDevice, RenderState};
use super::effect::LineEffect;
use super::error::{LineBatchError, LineBatchResult};
use super::polygon::{OutlineStyle, PolygonSource};
use super::stats::BatchStats;
use super::vertex::{LineVertex, VertexLayout};

/// Default vertex capacity: 256 segments per flush.
pub const DEFAULT_CAPACITY: usize = 512;

/// Line batch configuration.
#[derive(Debug, Clone)]
pub struct LineBatchConfig {
    /// Vertex slots in the scratch buffer. Must be even and non-zero.
    pub capacity: usize,
}

impl Default for LineBatchConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Fixed-capacity line batcher.
///
/// Usage per frame: [`open`](Self::open), any number of draws,
/// [`close`](Self::close). When the scratch buffer fills up mid-sequence the
/// batch flushes and reopens itself before appending, so callers can issue an
/// unbounded number of lines without the buffer ever growing.
///
/// Invariant: `vertex_count() == 2 * segment_count() <= capacity()`.
pub struct LineBatch<D: LineDevice> {
    device: D,
    effect: Option<D::Effect>,
    layout: Option<VertexLayout>,

    vertices: Box<[LineVertex]>,
    cursor: usize,
    segments: usize,
    open: bool,

    stats: BatchStats,
    warned_closed_draw: bool,
}

impl<D: LineDevice> LineBatch<D> {
    pub fn new(device: D) -> LineBatchResult<Self> {
        Self::with_config(device, LineBatchConfig::default())
    }

    /// Allocates the scratch buffer and creates the effect on `device`.
    pub fn with_config(mut device: D, config: LineBatchConfig) -> LineBatchResult<Self> {
        if config.capacity == 0 {
            return Err(LineBatchError::InvalidArgument("capacity must be non-zero"));
        }
        if config.capacity % 2 != 0 {
            return Err(LineBatchError::InvalidArgument("capacity must be even"));
        }

        let layout = LineVertex::layout();
        let mut effect = device.create_effect(&layout)?;

        let params = effect.params_mut();
        params.vertex_color_enabled = true;
        params.texture_enabled = false;
        params.lighting_enabled = false;
        params.world = Matrix4::identity();
        params.view = forward_view();

        log::debug!(
            "line batch created: {} vertices ({} segments per flush)",
            config.capacity,
            config.capacity / 2
        );

        Ok(Self {
            device,
            effect: Some(effect),
            layout: Some(layout),
            vertices: vec![LineVertex::default(); config.capacity].into_boxed_slice(),
            cursor: 0,
            segments: 0,
            open: false,
            stats: BatchStats::default(),
            warned_closed_draw: false,
        })
    }

    /// Sets the projection applied at the next submit. No-op after release.
    pub fn set_projection(&mut self, projection: Matrix4<f32>) {
        if let Some(effect) = self.effect.as_mut() {
            effect.params_mut().projection = projection;
        }
    }

    /// Starts a batch, discarding anything not yet submitted.
    pub fn open(&mut self) {
        self.cursor = 0;
        self.segments = 0;
        self.open = true;
    }

    /// Submits buffered segments, one draw call per effect pass.
    ///
    /// Empty batches are skipped without touching the device (and without
    /// changing the open flag). Counters are left as they are; call
    /// [`open`](Self::open) before drawing the next batch.
    pub fn close(&mut self) -> LineBatchResult<()> {
        if self.cursor == 0 {
            return Ok(());
        }

        let (Some(effect), Some(layout)) = (self.effect.as_mut(), self.layout.as_ref()) else {
            return Err(LineBatchError::Released);
        };

        let state = RenderState {
            layout,
            blend: BlendState::ALPHA_BLEND,
        };
        let vertices = &self.vertices[..self.segments * 2];
        let passes = effect.pass_count();

        effect.begin();
        for pass in 0..passes {
            let drawn = self
                .device
                .draw_line_list(effect, pass, &state, vertices, self.segments);
            if let Err(e) = drawn {
                effect.end();
                return Err(e.into());
            }
        }
        effect.end();

        log::trace!("line batch flushed {} segments in {passes} passes", self.segments);

        self.stats.flushes += 1;
        self.stats.draw_calls += passes as u32;
        self.stats.segments_submitted += self.segments as u64;
        self.open = false;
        Ok(())
    }

    /// Draws a single-color segment.
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color) -> LineBatchResult<()> {
        self.draw_line_gradient(start, end, color, color)
    }

    /// Draws a segment with independent endpoint colors.
    pub fn draw_line_gradient(
        &mut self,
        start: Vec2,
        end: Vec2,
        start_color: Color,
        end_color: Color,
    ) -> LineBatchResult<()> {
        self.draw_vertices(
            LineVertex::new(start, start_color),
            LineVertex::new(end, end_color),
        )
    }

    /// Appends one segment, flushing first if the buffer has no room for it.
    pub fn draw_vertices(&mut self, a: LineVertex, b: LineVertex) -> LineBatchResult<()> {
        if !self.open && !self.warned_closed_draw {
            log::debug!("line batch: draw issued while closed; call open() first");
            self.warned_closed_draw = true;
        }

        if self.cursor + 2 > self.vertices.len() {
            self.close()?;
            self.open();
            self.stats.overflow_flushes += 1;
        }

        self.vertices[self.cursor] = a;
        self.vertices[self.cursor + 1] = b;
        self.cursor += 2;
        self.segments += 1;
        Ok(())
    }

    /// Draws the solid outline of `polygon`.
    pub fn draw_polygon<P>(&mut self, polygon: &P, color: Color) -> LineBatchResult<()>
    where
        P: PolygonSource + ?Sized,
    {
        self.draw_polygon_outline(polygon, color, OutlineStyle::Solid)
    }

    /// Draws the outline of `polygon` as a closed loop.
    ///
    /// Fails with `InvalidArgument` (buffer untouched) if it has no points.
    pub fn draw_polygon_outline<P>(
        &mut self,
        polygon: &P,
        color: Color,
        style: OutlineStyle,
    ) -> LineBatchResult<()>
    where
        P: PolygonSource + ?Sized,
    {
        let points = polygon.transformed_points();
        if points.is_empty() {
            return Err(LineBatchError::InvalidArgument("polygon has no points"));
        }
        self.draw_loop(points, color, style)
    }

    /// Draws the outline of an axis-aligned rectangle.
    pub fn draw_rect(&mut self, rect: Rect, color: Color) -> LineBatchResult<()> {
        self.draw_loop(&rect.corners(), color, OutlineStyle::Solid)
    }

    fn draw_loop(&mut self, points: &[Vec2], color: Color, style: OutlineStyle) -> LineBatchResult<()> {
        let n = points.len();
        for i in (0..n).step_by(style.step()) {
            self.draw_vertices(
                LineVertex::new(points[i], color),
                LineVertex::new(points[(i + 1) % n], color),
            )?;
        }
        Ok(())
    }

    /// Drops the effect and vertex layout. Safe to call repeatedly.
    ///
    /// The device is left alone; it is owned by whoever supplied it.
    pub fn release(&mut self) {
        let had_effect = self.effect.take().is_some();
        let had_layout = self.layout.take().is_some();
        if had_effect || had_layout {
            log::debug!("line batch released");
        }
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.effect.is_none() && self.layout.is_none()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Maximum vertices buffered before an automatic flush.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Vertices written since the last open.
    #[inline]
    pub fn buffered(&self) -> &[LineVertex] {
        &self.vertices[..self.cursor]
    }

    #[inline]
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = BatchStats::default();
    }

    #[inline]
    pub fn effect(&self) -> Option<&D::Effect> {
        self.effect.as_ref()
    }

    #[inline]
    pub fn device(&self) -> &D {
        &self.device
    }

    #[inline]
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::lines::testing::{RecordingDevice, Submission};
    use crate::render::lines::DeviceError;

    fn batch(capacity: usize) -> LineBatch<RecordingDevice> {
        LineBatch::with_config(RecordingDevice::default(), LineBatchConfig { capacity })
            .expect("valid config")
    }

    fn p(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn segment_ends(sub: &Submission) -> Vec<(Vec2, Vec2)> {
        sub.vertices
            .chunks(2)
            .map(|pair| (pair[0].position_2d(), pair[1].position_2d()))
            .collect()
    }

    fn assert_invariant(b: &LineBatch<RecordingDevice>) {
        assert_eq!(b.vertex_count(), 2 * b.segment_count());
        assert!(b.vertex_count() <= b.capacity());
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn default_capacity_is_512() {
        let b = LineBatch::new(RecordingDevice::default()).unwrap();
        assert_eq!(b.capacity(), DEFAULT_CAPACITY);
        assert_eq!(b.vertex_count(), 0);
        assert!(!b.is_open());
        assert!(!b.is_released());
    }

    #[test]
    fn rejects_zero_or_odd_capacity() {
        for capacity in [0, 7] {
            let result =
                LineBatch::with_config(RecordingDevice::default(), LineBatchConfig { capacity });
            assert!(matches!(result, Err(LineBatchError::InvalidArgument(_))));
        }
    }

    #[test]
    fn effect_creation_failure_propagates() {
        let device = RecordingDevice {
            fail_create: true,
            ..Default::default()
        };
        let result = LineBatch::new(device);
        assert!(matches!(result, Err(LineBatchError::Device(DeviceError::Backend(_)))));
    }

    #[test]
    fn effect_is_configured_for_unlit_vertex_color() {
        let b = batch(8);
        let params = b.effect().unwrap().params();
        assert!(params.vertex_color_enabled);
        assert!(!params.texture_enabled);
        assert!(!params.lighting_enabled);
        assert_eq!(params.world, Matrix4::identity());
        assert_eq!(params.view, forward_view());
        assert_eq!(b.device().created_layout_stride, Some(28));
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn close_after_open_issues_no_draws() {
        let mut b = batch(8);
        b.open();
        b.close().unwrap();
        assert!(b.device().submissions.is_empty());
        assert_eq!(b.stats(), BatchStats::default());
        // Empty close leaves the open flag alone.
        assert!(b.is_open());
    }

    #[test]
    fn close_submits_and_keeps_counters() {
        let mut b = batch(8);
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 1.0), Color::WHITE).unwrap();
        b.draw_line(p(2.0, 2.0), p(3.0, 3.0), Color::WHITE).unwrap();
        b.close().unwrap();

        let subs = &b.device().submissions;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].primitive_count, 2);
        assert_eq!(subs[0].vertices.len(), 4);
        assert_eq!(subs[0].blend, BlendState::ALPHA_BLEND);
        assert_eq!(subs[0].layout_stride, 28);

        assert!(!b.is_open());
        assert_eq!(b.segment_count(), 2);
        assert_eq!(b.vertex_count(), 4);
    }

    #[test]
    fn open_discards_unsubmitted_segments() {
        let mut b = batch(8);
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();
        b.open();
        assert_eq!(b.segment_count(), 0);
        b.close().unwrap();
        assert!(b.device().submissions.is_empty());
    }

    #[test]
    fn technique_wraps_every_pass() {
        let device = RecordingDevice {
            passes: 2,
            ..Default::default()
        };
        let mut b = LineBatch::with_config(device, LineBatchConfig { capacity: 8 }).unwrap();
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();
        b.close().unwrap();

        let subs = &b.device().submissions;
        assert_eq!(subs.iter().map(|s| s.pass).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(
            b.effect().unwrap().events,
            vec!["begin", "pass 0", "pass 1", "end"]
        );
        assert_eq!(b.stats().draw_calls, 2);
        assert_eq!(b.stats().flushes, 1);
    }

    #[test]
    fn device_error_propagates_and_ends_technique() {
        let mut b = batch(8);
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();
        b.device_mut().fail_draw = true;

        let err = b.close().unwrap_err();
        assert!(matches!(err, LineBatchError::Device(DeviceError::Backend(_))));
        assert_eq!(b.effect().unwrap().events.last(), Some(&"end"));
        assert_eq!(b.segment_count(), 1);
        assert_eq!(b.stats().flushes, 0);
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn projection_applies_at_submit() {
        let mut b = batch(8);
        let projection = Matrix4::new_scaling(0.5);
        b.open();
        b.draw_line(p(2.0, 4.0), p(6.0, 8.0), Color::WHITE).unwrap();
        b.set_projection(projection);
        b.close().unwrap();

        let sub = &b.device().submissions[0];
        assert_eq!(sub.projection, projection);
        // Buffered data is never transformed on the CPU.
        assert_eq!(sub.vertices[0].position, [2.0, 4.0, 0.0]);
    }

    // ── lines ─────────────────────────────────────────────────────────────

    #[test]
    fn gradient_line_keeps_endpoint_colors_in_order() {
        let mut b = batch(8);
        b.open();
        b.draw_line_gradient(p(0.0, 0.0), p(5.0, 0.0), Color::RED, Color::BLUE)
            .unwrap();

        let v = b.buffered();
        assert_eq!(v[0].color(), Color::RED);
        assert_eq!(v[1].color(), Color::BLUE);
        assert_eq!(v[0].position_2d(), p(0.0, 0.0));
        assert_eq!(v[1].position_2d(), p(5.0, 0.0));
    }

    #[test]
    fn overflow_flushes_full_buffer_before_appending() {
        let mut b = batch(8);
        b.open();
        for i in 0..5 {
            b.draw_line(p(i as f32, 0.0), p(i as f32, 1.0), Color::WHITE).unwrap();
            assert_invariant(&b);
        }
        assert_eq!(b.device().submissions.len(), 1);
        assert_eq!(b.segment_count(), 1);
        assert!(b.is_open());

        b.close().unwrap();

        let subs = &b.device().submissions;
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].primitive_count, 4);
        assert_eq!(
            segment_ends(&subs[0]).iter().map(|(a, _)| a.x).collect::<Vec<_>>(),
            vec![0.0, 1.0, 2.0, 3.0]
        );
        assert_eq!(subs[1].primitive_count, 1);
        assert_eq!(segment_ends(&subs[1]), vec![(p(4.0, 0.0), p(4.0, 1.0))]);

        assert_eq!(b.stats().overflow_flushes, 1);
        assert_eq!(b.stats().segments_submitted, 5);
    }

    #[test]
    fn one_automatic_flush_per_half_capacity() {
        let mut b = batch(8);
        b.open();
        for i in 0..20 {
            b.draw_line(p(i as f32, 0.0), p(0.0, i as f32), Color::WHITE).unwrap();
            assert_invariant(&b);
        }
        // Flushes happen on the 5th, 9th, 13th and 17th draws.
        assert_eq!(b.stats().overflow_flushes, 4);
        b.close().unwrap();

        let subs = &b.device().submissions;
        assert_eq!(subs.len(), 5);
        assert!(subs.iter().all(|s| s.primitive_count == 4));
        assert!(subs.iter().all(|s| s.primitive_count <= b.capacity() / 2));
    }

    #[test]
    fn smallest_capacity_flushes_every_segment() {
        let mut b = batch(2);
        b.open();
        for _ in 0..3 {
            b.draw_line(p(0.0, 0.0), p(1.0, 1.0), Color::WHITE).unwrap();
            assert_invariant(&b);
        }
        b.close().unwrap();
        assert_eq!(b.device().submissions.len(), 3);
    }

    #[test]
    fn drawing_while_closed_still_buffers() {
        let mut b = batch(8);
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();
        assert!(!b.is_open());
        assert_eq!(b.segment_count(), 1);
    }

    // ── polygons ──────────────────────────────────────────────────────────

    #[test]
    fn solid_polygon_draws_every_edge() {
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.5, 2.0), p(0.0, 1.0)];
        let mut b = batch(64);
        b.open();
        b.draw_polygon(&pts, Color::GREEN).unwrap();
        b.close().unwrap();

        let sub = &b.device().submissions[0];
        assert_eq!(sub.primitive_count, 5);
        assert_eq!(
            segment_ends(sub),
            vec![
                (pts[0], pts[1]),
                (pts[1], pts[2]),
                (pts[2], pts[3]),
                (pts[3], pts[4]),
                (pts[4], pts[0]),
            ]
        );
        assert!(sub.vertices.iter().all(|v| v.color() == Color::GREEN));
    }

    #[test]
    fn dashed_polygon_even_count_draws_alternate_edges() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let mut b = batch(64);
        b.open();
        b.draw_polygon_outline(&pts, Color::WHITE, OutlineStyle::Dashed).unwrap();

        assert_eq!(b.segment_count(), 2);
        b.close().unwrap();
        assert_eq!(
            segment_ends(&b.device().submissions[0]),
            vec![(pts[0], pts[1]), (pts[2], pts[3])]
        );
    }

    #[test]
    fn dashed_polygon_odd_count_wraps_to_first_point() {
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 1.0), p(1.0, 2.0), p(0.0, 1.0)];
        let mut b = batch(64);
        b.open();
        b.draw_polygon_outline(&pts[..], Color::WHITE, OutlineStyle::Dashed).unwrap();
        b.close().unwrap();

        // ceil(5 / 2) segments; the last one closes the loop next to edge 0.
        assert_eq!(
            segment_ends(&b.device().submissions[0]),
            vec![(pts[0], pts[1]), (pts[2], pts[3]), (pts[4], pts[0])]
        );
    }

    #[test]
    fn polygon_flushes_mid_outline_when_full() {
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0), p(-1.0, 0.5)];
        let mut b = batch(4);
        b.open();
        b.draw_polygon(&pts, Color::WHITE).unwrap();
        b.close().unwrap();

        let counts: Vec<_> = b.device().submissions.iter().map(|s| s.primitive_count).collect();
        assert_eq!(counts, vec![2, 2, 1]);
        let last = b.device().submissions.last().unwrap();
        assert_eq!(segment_ends(last), vec![(pts[4], pts[0])]);
    }

    #[test]
    fn empty_polygon_is_rejected_without_side_effects() {
        let mut b = batch(8);
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();

        let empty: Vec<Vec2> = Vec::new();
        let err = b.draw_polygon(&empty, Color::WHITE).unwrap_err();
        assert!(matches!(err, LineBatchError::InvalidArgument(_)));
        assert_eq!(b.segment_count(), 1);
        assert_eq!(b.vertex_count(), 2);
    }

    #[test]
    fn rect_outline_is_four_segments() {
        let mut b = batch(16);
        b.open();
        b.draw_rect(Rect::new(0.0, 0.0, 2.0, 1.0), Color::WHITE).unwrap();
        b.close().unwrap();

        let sub = &b.device().submissions[0];
        assert_eq!(
            segment_ends(sub),
            vec![
                (p(0.0, 0.0), p(2.0, 0.0)),
                (p(2.0, 0.0), p(2.0, 1.0)),
                (p(2.0, 1.0), p(0.0, 1.0)),
                (p(0.0, 1.0), p(0.0, 0.0)),
            ]
        );
    }

    // ── release ───────────────────────────────────────────────────────────

    #[test]
    fn release_is_idempotent() {
        let mut b = batch(8);
        b.release();
        assert!(b.is_released());
        assert!(b.effect().is_none());

        b.release();
        assert!(b.is_released());
        assert!(b.effect().is_none());
    }

    #[test]
    fn configuration_after_release_is_a_no_op() {
        let mut b = batch(8);
        b.release();
        b.set_projection(Matrix4::new_scaling(3.0));
        b.open();
        b.close().unwrap();
        assert!(b.device().submissions.is_empty());
    }

    #[test]
    fn close_with_data_after_release_fails() {
        let mut b = batch(8);
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();
        b.release();
        assert!(matches!(b.close(), Err(LineBatchError::Released)));
        assert!(b.device().submissions.is_empty());
    }

    #[test]
    fn reset_stats_clears_counters() {
        let mut b = batch(8);
        b.open();
        b.draw_line(p(0.0, 0.0), p(1.0, 0.0), Color::WHITE).unwrap();
        b.close().unwrap();
        assert_eq!(b.stats().flushes, 1);
        b.reset_stats();
        assert_eq!(b.stats(), BatchStats::default());
    }
}
