use super::timer::Countdown;

/// Change of the active flag reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Activated,
    Inactivated,
}

/// Decides whether the view needs continuous redraw
///
/// Two states, Idle and Active. Every activation restarts a single idle
/// countdown of `life_time` seconds; while anything is animating the
/// countdown stays disarmed.
#[derive(Debug, Clone)]
pub struct ActivityGovernor {
    active: bool,
    idle_timer: Countdown,
    activations: u64,
}

impl ActivityGovernor {
    /// Start idle
    pub fn new(life_time: f32) -> Self {
        Self {
            active: false,
            idle_timer: Countdown::new(life_time),
            activations: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True while an idle countdown is pending
    pub fn is_armed(&self) -> bool {
        self.idle_timer.is_active()
    }

    /// Seconds left until the pending countdown fires
    pub fn remaining(&self) -> f32 {
        self.idle_timer.remaining()
    }

    pub fn life_time(&self) -> f32 {
        self.idle_timer.duration()
    }

    pub fn set_life_time(&mut self, seconds: f32) {
        self.idle_timer.set_duration(seconds);
    }

    /// Number of activate calls since the last Idle state
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Request continued rendering
    ///
    /// `running` is whether any clip or animation is moving right now; it is
    /// re-evaluated on every call.
    pub fn activate(&mut self, running: bool) -> Transition {
        self.idle_timer.cancel();
        self.activations += 1;

        let transition = if self.active {
            Transition::None
        } else {
            self.active = true;
            log::info!("activate");
            Transition::Activated
        };

        if !running {
            self.idle_timer.start();
        }
        transition
    }

    /// Drop to Idle immediately
    pub fn inactivate(&mut self) -> Transition {
        self.idle_timer.cancel();
        if !self.active {
            return Transition::None;
        }
        self.active = false;
        self.activations = 0;
        log::info!("inactivate");
        Transition::Inactivated
    }

    /// Advance the idle countdown by one frame
    ///
    /// A countdown never completes while `running` holds.
    pub fn advance(&mut self, delta: f32, running: bool) -> Transition {
        if running {
            return Transition::None;
        }
        if self.idle_timer.tick(delta) {
            self.inactivate()
        } else {
            Transition::None
        }
    }
}

impl Default for ActivityGovernor {
    fn default() -> Self {
        Self::new(3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let governor = ActivityGovernor::new(1.0);
        assert!(!governor.is_active());
        assert!(!governor.is_armed());
    }

    #[test]
    fn activation_arms_countdown() {
        let mut governor = ActivityGovernor::new(1.0);
        assert_eq!(governor.activate(false), Transition::Activated);
        assert!(governor.is_armed());
        assert_eq!(governor.remaining(), 1.0);
    }

    #[test]
    fn repeated_activation_reports_single_transition() {
        let mut governor = ActivityGovernor::new(1.0);
        assert_eq!(governor.activate(false), Transition::Activated);
        assert_eq!(governor.activate(false), Transition::None);
        assert_eq!(governor.activations(), 2);
    }

    #[test]
    fn running_activation_leaves_countdown_disarmed() {
        let mut governor = ActivityGovernor::new(1.0);
        governor.activate(false);
        governor.activate(true);
        assert!(governor.is_active());
        assert!(!governor.is_armed());
        assert_eq!(governor.advance(5.0, false), Transition::None);
        assert!(governor.is_active());
    }

    #[test]
    fn countdown_holds_while_running() {
        let mut governor = ActivityGovernor::new(1.0);
        governor.activate(false);
        assert_eq!(governor.advance(2.0, true), Transition::None);
        assert!(governor.is_active());
        assert_eq!(governor.advance(1.0, false), Transition::Inactivated);
    }

    #[test]
    fn inactivate_clears_countdown() {
        let mut governor = ActivityGovernor::new(1.0);
        governor.activate(false);
        assert_eq!(governor.inactivate(), Transition::Inactivated);
        assert!(!governor.is_armed());
        assert_eq!(governor.inactivate(), Transition::None);
    }
}
