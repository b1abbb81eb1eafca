use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick (clamped).
    pub dt: f32,

    /// Seconds since the clock was created or reset.
    pub elapsed: f32,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Produces one `FrameTime` per presented frame.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// produce a huge step in animations.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts timing, e.g. after the surface was lost for a while.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last = now;
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        let now = Instant::now();
        assert_eq!(clock.tick_at(now).frame_index, 0);
        assert_eq!(clock.tick_at(now).frame_index, 1);
    }

    #[test]
    fn dt_is_clamped_both_ways() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));
        let base = clock.last;

        let fast = clock.tick_at(base);
        assert!((fast.dt - 0.001).abs() < 1e-6);

        let slow = clock.tick_at(base + Duration::from_secs(5));
        assert!((slow.dt - 0.1).abs() < 1e-6);
        assert!((slow.elapsed - 5.0).abs() < 1e-3);
    }
}
