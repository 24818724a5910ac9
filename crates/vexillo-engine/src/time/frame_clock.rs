use std::time::{Duration, Instant};

/// Timing of one presented frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds since the clock started. Drives the flag wave.
    pub elapsed: f32,

    pub now: Instant,

    pub frame_index: u64,
}

/// Produces [`FrameTime`] snapshots for a render loop.
///
/// `dt` is clamped so a stalled or minimized window does not report a huge
/// step. `elapsed` is wall time and is not affected by the clamp.
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
            now,
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
    fn dt_is_clamped_but_elapsed_is_not() {
        let mut clock = FrameClock::new();
        let later = clock.start + Duration::from_secs(2);
        let ft = clock.tick_at(later);
        assert_eq!(ft.dt, 0.25);
        assert_eq!(ft.elapsed, 2.0);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn frame_index_advances() {
        let mut clock = FrameClock::new();
        let t0 = clock.start;
        clock.tick_at(t0 + Duration::from_millis(16));
        let ft = clock.tick_at(t0 + Duration::from_millis(32));
        assert_eq!(ft.frame_index, 1);
        assert!((ft.dt - 0.016).abs() < 1e-6);
    }
}
