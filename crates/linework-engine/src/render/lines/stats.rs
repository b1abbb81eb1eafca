/// Counters accumulated by a line batch until [`reset_stats`] is called.
///
/// [`reset_stats`]: super::LineBatch::reset_stats
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct BatchStats {
    /// Non-empty closes, explicit or automatic.
    pub flushes: u32,

    /// Closes triggered by a full buffer.
    pub overflow_flushes: u32,

    /// Device draw calls (one per pass per flush).
    pub draw_calls: u32,

    /// Segments handed to the device, counted once per flush.
    pub segments_submitted: u64,
}

impl BatchStats {
    /// Average segments per flush; 0 when nothing was flushed.
    pub fn avg_segments_per_flush(&self) -> f32 {
        if self.flushes == 0 {
            0.0
        } else {
            self.segments_submitted as f32 / self.flushes as f32
        }
    }
}
