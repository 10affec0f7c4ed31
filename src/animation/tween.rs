use super::easing::Easing;
use super::record::Record;

/// How a tween moves from its start record to its end record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Eased interpolation over a fixed wall time
    Timed { duration_ms: f32, easing: Easing },
    /// Fixed distance per advance, regardless of elapsed time
    Stepped { step: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    Pending,
    Running,
    Finished,
}

/// Outcome of one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenStep {
    /// Not running, nothing changed
    Idle,
    Updated,
    /// Reached the end record on this advance
    Finished,
}

#[derive(Debug, Clone)]
pub struct Tween {
    from: Record,
    to: Record,
    current: Record,
    progress: Progress,
    elapsed_ms: f32,
    state: TweenState,
}

impl Tween {
    pub fn new(from: Record, to: Record, progress: Progress) -> Self {
        Self {
            current: from.clone(),
            from,
            to,
            progress,
            elapsed_ms: 0.0,
            state: TweenState::Pending,
        }
    }

    pub fn start(&mut self) {
        if self.state == TweenState::Pending {
            self.state = TweenState::Running;
        }
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TweenState::Running
    }

    pub fn current(&self) -> &Record {
        &self.current
    }

    pub fn from(&self) -> &Record {
        &self.from
    }

    pub fn to(&self) -> &Record {
        &self.to
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }

    /// Advance by `delta_ms`; stepped tweens ignore the delta
    pub fn advance(&mut self, delta_ms: f32) -> TweenStep {
        if self.state != TweenState::Running {
            return TweenStep::Idle;
        }
        self.elapsed_ms += delta_ms.max(0.0);
        let done = match self.progress {
            Progress::Timed {
                duration_ms,
                easing,
            } => {
                let t = if duration_ms <= 0.0 {
                    1.0
                } else {
                    (self.elapsed_ms / duration_ms).min(1.0)
                };
                self.current = self.from.lerp(&self.to, easing.apply(t));
                t >= 1.0
            }
            Progress::Stepped { step } => {
                let done = self.current.distance(&self.to) <= step;
                self.current = self.current.step_toward(&self.to, step);
                done
            }
        };
        if done {
            self.current = self.from.lerp(&self.to, 1.0);
            self.state = TweenState::Finished;
            TweenStep::Finished
        } else {
            TweenStep::Updated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn timed(duration_ms: f32) -> Tween {
        Tween::new(
            Record::new().with("t", 0.0),
            Record::new().with("t", 10.0),
            Progress::Timed {
                duration_ms,
                easing: Easing::Linear,
            },
        )
    }

    #[test]
    fn pending_tween_does_not_move() {
        let mut tween = timed(100.0);
        assert_eq!(tween.advance(50.0), TweenStep::Idle);
        assert_eq!(tween.current().get("t"), Some(0.0));
    }

    #[test]
    fn timed_tween_interpolates_and_finishes() {
        let mut tween = timed(100.0);
        tween.start();
        assert_eq!(tween.advance(25.0), TweenStep::Updated);
        assert_abs_diff_eq!(tween.current().get("t").unwrap(), 2.5, epsilon = 1e-5);
        assert_eq!(tween.advance(100.0), TweenStep::Finished);
        assert_eq!(tween.current().get("t"), Some(10.0));
        assert_eq!(tween.state(), TweenState::Finished);
        assert_eq!(tween.advance(10.0), TweenStep::Idle);
    }

    #[test]
    fn zero_duration_finishes_on_first_advance() {
        let mut tween = timed(0.0);
        tween.start();
        assert_eq!(tween.advance(0.0), TweenStep::Finished);
    }

    #[test]
    fn stepped_tween_moves_fixed_distance() {
        let mut tween = Tween::new(
            Record::new().with("x", 0.0),
            Record::new().with("x", 1.0),
            Progress::Stepped { step: 0.4 },
        );
        tween.start();
        assert_eq!(tween.advance(1000.0), TweenStep::Updated);
        assert_abs_diff_eq!(tween.current().get("x").unwrap(), 0.4, epsilon = 1e-6);
        assert_eq!(tween.advance(0.0), TweenStep::Updated);
        assert_eq!(tween.advance(0.0), TweenStep::Finished);
        assert_eq!(tween.current().get("x"), Some(1.0));
    }
}
