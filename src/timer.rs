//! stopwatch used by the examples and benches

use std::time::{Duration, Instant};

/// A simple stopwatch.
///
/// `start` records the current instant, `stop` freezes the measurement,
/// `elapsed` reports the duration between the two.
#[derive(Debug, Default)]
pub struct Timer {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    /// New stopped timer
    pub fn new() -> Self {
        Timer::default()
    }

    /// Record the current instant as the start point.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Freeze the measurement at the current instant.
    pub fn stop(&mut self) {
        if let Some(started) = self.started.take() {
            self.elapsed = started.elapsed();
        }
    }

    /// Duration between the last `start` and `stop`.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
