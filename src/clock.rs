use std::cell::Cell;
use std::time::Instant;

/// Monotonic elapsed-time source read once per frame.
pub trait Clock {
    /// Seconds since the clock started.
    fn elapsed_seconds(&self) -> f32;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_seconds(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Clock advanced explicitly by the caller, used for headless runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: Cell<f32>,
}

impl ManualClock {
    pub fn new(seconds: f32) -> Self {
        Self {
            seconds: Cell::new(seconds),
        }
    }

    /// Moves the clock forward; negative steps are ignored to stay monotonic.
    pub fn advance(&self, delta: f32) {
        if delta > 0.0 {
            self.seconds.set(self.seconds.get() + delta);
        }
    }
}

impl Clock for ManualClock {
    fn elapsed_seconds(&self) -> f32 {
        self.seconds.get()
    }
}
