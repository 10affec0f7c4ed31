/// Countdown timer - fires once after duration, re-armable
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl Countdown {
    /// Create inactive countdown
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Start (or restart) the countdown from zero
    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.active = true;
    }

    /// Disarm without firing
    pub fn cancel(&mut self) {
        self.elapsed = 0.0;
        self.active = false;
    }

    /// Tick with delta, returns true if completed
    pub fn tick(&mut self, delta: f32) -> bool {
        if !self.active {
            return false;
        }

        self.elapsed += delta;

        if self.elapsed >= self.duration {
            self.active = false;
            true
        } else {
            false
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds until firing, zero when inactive
    pub fn remaining(&self) -> f32 {
        if self.active {
            (self.duration - self.elapsed).max(0.0)
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Takes effect on the next start
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration;
    }

    /// Get progress [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }
}
