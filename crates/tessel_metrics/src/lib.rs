//! Tessel Metrics - frame and phase timing
//!
//! Instrumentation that vanishes without the `metrics` feature: the same
//! types exist either way, but the stubs record nothing.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use tessel_metrics::{FrameTimer, Phase, PhaseProfiler};
//!
//! let mut timer = FrameTimer::new(60);
//! let mut profiler = PhaseProfiler::new();
//! timer.begin();
//! profiler.time_phase(Phase::Draw, || draw());
//! timer.end();
//! ```

#[cfg(not(feature = "metrics"))]
use std::{marker::PhantomData, time::Duration};

#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod phase_profiler;
#[cfg(feature = "metrics")]
mod ring_buffer;

#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;

/// Stage of an engine frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    FixedUpdate,
    Update,
    Draw,
    /// End-of-frame batch flush and buffer swap.
    Present,
}

impl Phase {
    pub const COUNT: usize = 4;
    pub const ALL: [Phase; Phase::COUNT] =
        [Phase::FixedUpdate, Phase::Update, Phase::Draw, Phase::Present];

    pub fn name(self) -> &'static str {
        match self {
            Phase::FixedUpdate => "fixed_update",
            Phase::Update => "update",
            Phase::Draw => "draw",
            Phase::Present => "present",
        }
    }
}

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_window: usize) -> Self {
        Self
    }

    pub fn begin(&mut self) {}

    pub fn end(&mut self) -> Duration {
        Duration::ZERO
    }

    pub fn record(&mut self, _frame: Duration) {}

    pub fn frames(&self) -> u64 {
        0
    }

    pub fn fps(&self) -> f64 {
        0.0
    }

    pub fn frame_time_ms(&self) -> f64 {
        0.0
    }

    pub fn frame_time_range_ms(&self) -> (f64, f64) {
        (0.0, 0.0)
    }
}

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self {
        Self(PhantomData)
    }

    pub fn push(&mut self, _sample: T) {}

    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }
}

#[cfg(not(feature = "metrics"))]
#[derive(Default)]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new() -> Self {
        Self
    }

    pub fn time_phase<F, R>(&mut self, _phase: Phase, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }

    pub fn timing(&self, _phase: Phase) -> Duration {
        Duration::ZERO
    }

    pub fn calls(&self, _phase: Phase) -> u32 {
        0
    }

    pub fn reset(&mut self) {}

    pub fn iter(&self) -> impl Iterator<Item = (Phase, Duration)> + '_ {
        Phase::ALL.iter().map(|&p| (p, Duration::ZERO))
    }
}
