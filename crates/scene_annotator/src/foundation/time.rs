//! Time measurement utilities for sweep progress and ETA reporting

use std::time::{Duration, Instant};

/// Sweep clock: total time since start plus per-step laps
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
    lap_started: Instant,
}

impl Stopwatch {
    /// Clock running from now
    pub fn start_new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            lap_started: now,
        }
    }

    /// Time since the clock started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since the previous lap (or the start); begins a new lap
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.lap_started);
        self.lap_started = now;
        lap
    }
}

/// Linear ETA: the duration of the last step multiplied by the steps left
pub fn estimate_remaining(last_step: Duration, remaining_steps: usize) -> Duration {
    let steps = u32::try_from(remaining_steps).unwrap_or(u32::MAX);
    last_step.saturating_mul(steps)
}

/// Format a duration as `H:MM:SS.s` for progress lines
///
/// Rounds to the nearest tenth of a second before splitting into fields.
pub fn format_duration(duration: Duration) -> String {
    let tenths = (duration.as_millis() + 50) / 100;
    let hours = tenths / 36_000;
    let minutes = tenths / 600 % 60;
    let seconds = tenths % 600;
    format!("{}:{:02}:{:02}.{}", hours, minutes, seconds / 10, seconds % 10)
}
