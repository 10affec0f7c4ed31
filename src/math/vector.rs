use glam::Vec3;

/// Per-component tolerance used to decide two camera states are the same
pub const EPSILON: f32 = 1e-4;

/// True when every component differs by at most `EPSILON`
pub fn are_close(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() <= EPSILON
}
