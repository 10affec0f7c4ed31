use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::traits::FrameClock;

/// Wall clock - just tracks delta time
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for Clock {
    /// Returns delta in seconds and advances the clock
    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    fn reset(&mut self) {
        self.last_tick = Instant::now();
    }
}

/// Hand-driven clock for deterministic frame stepping
///
/// Clones share the pending delta, so a test can keep one clone and give the
/// other to the viewer.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    pending: Rc<Cell<f32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue time to be reported by the next tick
    pub fn advance(&self, seconds: f32) {
        self.pending.set(self.pending.get() + seconds);
    }
}

impl FrameClock for ManualClock {
    fn tick(&mut self) -> f32 {
        self.pending.replace(0.0)
    }

    fn reset(&mut self) {
        self.pending.set(0.0);
    }
}
