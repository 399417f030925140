//! Fixed-timestep clock
//!
//! Frame deltas are accumulated and drained in whole simulation ticks; the
//! leftover fraction is exposed as an interpolation factor for rendering.

use std::time::Duration;

/// Default simulation tick rate.
pub const TICK_RATE_HZ: u32 = 60;

/// Default cap on ticks run for a single frame.
pub const MAX_STEPS_PER_FRAME: u32 = 5;

/// Fixed-update accumulator.
pub struct FixedTimestep {
    step: Duration,
    max_steps: u32,
    accumulator: Duration,
    tick_count: u64,
    total: Duration,
}

impl FixedTimestep {
    /// `tick_rate_hz` ticks per second, at most `max_steps` per frame.
    /// Zero values are raised to one.
    pub fn new(tick_rate_hz: u32, max_steps: u32) -> Self {
        Self {
            step: Duration::from_secs(1) / tick_rate_hz.max(1),
            max_steps: max_steps.max(1),
            accumulator: Duration::ZERO,
            tick_count: 0,
            total: Duration::ZERO,
        }
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    #[inline]
    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Feed one frame's elapsed time and return how many ticks to run now.
    ///
    /// When more than `max_steps` ticks are owed, the surplus is dropped so
    /// a slow frame cannot snowball into ever longer catch-up frames.
    pub fn accumulate(&mut self, frame: Duration) -> u32 {
        self.accumulator += frame;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            self.tick_count += 1;
            self.total += self.step;
            steps += 1;
        }
        if self.accumulator >= self.step {
            tracing::debug!(
                dropped_ms = self.accumulator.as_secs_f64() * 1000.0,
                "fixed timestep fell behind"
            );
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Fraction of a tick left in the accumulator, in `0.0..1.0`.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated time covered by the ticks run so far.
    pub fn total_time(&self) -> Duration {
        self.total
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(TICK_RATE_HZ, MAX_STEPS_PER_FRAME)
    }
}
