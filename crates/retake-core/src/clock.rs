//! Restartable elapsed-time counter driven by a fixed-period tick source.
//!
//! The clock itself is a pure state machine: the owner (the app event loop)
//! calls [`Clock::tick`] every [`TICK_PERIOD`] and the clock decides whether
//! the tick counts. Elapsed time is derived from an integer tick count, so
//! long sessions never accumulate floating-point drift.

use std::time::Duration;

/// Fixed real-time period between ticks.
pub const TICK_PERIOD: Duration = Duration::from_millis(10);

/// Seconds added per tick.
pub const TICK_SECS: f64 = 0.01;

/// Stopwatch counting elapsed time in 10ms increments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    ticks: u64,
    running: bool,
}

impl Clock {
    /// Create a stopped clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin counting. No-op if already running.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop counting. Ticks delivered while paused are ignored.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Zero the elapsed time. Valid in any state; does not change `running`.
    pub fn reset(&mut self) {
        self.ticks = 0;
    }

    /// Advance by one tick. Guarded by `running`, so a timer firing
    /// between `pause()` and the owner noticing is harmless.
    pub fn tick(&mut self) {
        if self.running {
            self.ticks += 1;
        }
    }

    /// Elapsed seconds, always a non-negative multiple of [`TICK_SECS`].
    pub fn elapsed_seconds(&self) -> f64 {
        self.ticks as f64 * TICK_SECS
    }

    /// Whether the clock is currently counting.
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Format elapsed seconds as `HH:MM:SS:hh`.
///
/// Every component derives from a rounded centisecond total, which keeps
/// minutes and seconds modulo-correct and gives exact hundredths for
/// tick-derived values: `format_time(65.5) == "00:01:05:50"`.
///
/// Hours pad to two digits but widen past 99 hours rather than misformat.
pub fn format_time(seconds: f64) -> String {
    let centis = (seconds.max(0.0) * 100.0).round() as u64;
    let hundredths = centis % 100;
    let total_secs = centis / 100;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;

    format!("{:02}:{:02}:{:02}:{:02}", hours, mins, secs, hundredths)
}
