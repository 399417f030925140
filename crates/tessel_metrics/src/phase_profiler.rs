//! Per-phase frame profiling

use std::time::{Duration, Instant};

use crate::Phase;

/// Accumulated wall time per frame phase, reset once per frame.
#[derive(Default)]
pub struct PhaseProfiler {
    timings: [Duration; Phase::COUNT],
    calls: [u32; Phase::COUNT],
}

impl PhaseProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_phase<F, R>(&mut self, phase: Phase, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.timings[phase as usize] += start.elapsed();
        self.calls[phase as usize] += 1;
        result
    }

    pub fn timing(&self, phase: Phase) -> Duration {
        self.timings[phase as usize]
    }

    /// Times `phase` ran since the last reset.
    pub fn calls(&self, phase: Phase) -> u32 {
        self.calls[phase as usize]
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Phase, Duration)> + '_ {
        Phase::ALL.iter().map(|&p| (p, self.timing(p)))
    }
}
