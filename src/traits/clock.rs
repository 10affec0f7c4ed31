/// Delta-time source for the frame loop
pub trait FrameClock {
    /// Seconds elapsed since the previous tick
    fn tick(&mut self) -> f32;

    /// Restart measuring from now, so the next tick does not include paused time
    fn reset(&mut self);
}
