use std::f32::consts::PI;

use glam::{Quat, Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::core::Button;

const MIN_POLAR: f32 = 1e-3;
const KEY_PAN_PIXELS: f32 = 7.0;
const CHANGE_EPSILON: f32 = 1e-6;

/// Orbit, dolly and pan around a target point with optional inertia
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enabled: bool,
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            enabled: true,
            target: Vec3::ZERO,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// True while inertia or queued input will still move the camera
    pub fn has_motion(&self) -> bool {
        self.theta_delta.abs() > CHANGE_EPSILON
            || self.phi_delta.abs() > CHANGE_EPSILON
            || (self.scale - 1.0).abs() > CHANGE_EPSILON
            || self.pan_offset.length_squared() > CHANGE_EPSILON * CHANGE_EPSILON
    }

    /// Drag in pixels orbits the camera; a full viewport height is one turn
    pub fn rotate(&mut self, delta: Vec2, viewport_height: u32) {
        if !self.enabled {
            return;
        }
        let h = viewport_height.max(1) as f32;
        self.theta_delta -= 2.0 * PI * delta.x / h * self.rotate_speed;
        self.phi_delta -= 2.0 * PI * delta.y / h * self.rotate_speed;
    }

    /// Positive steps move the camera closer
    pub fn zoom(&mut self, steps: f32) {
        if !self.enabled {
            return;
        }
        self.scale *= 0.95f32.powf(steps * self.zoom_speed);
    }

    /// Drag in pixels slides the target in the view plane
    pub fn pan(&mut self, delta: Vec2, camera: &PerspectiveCamera, viewport_height: u32) {
        if !self.enabled {
            return;
        }
        let h = viewport_height.max(1) as f32;
        let distance = camera.position.distance(self.target);
        let world_per_pixel = 2.0 * distance * (camera.fov.to_radians() * 0.5).tan() / h;
        let right = camera.right();
        let up = right.cross(camera.forward()).normalize_or_zero();
        self.pan_offset += (-right * delta.x + up * delta.y) * world_per_pixel * self.pan_speed;
    }

    pub fn key(&mut self, button: Button, camera: &PerspectiveCamera, viewport_height: u32) {
        let step = match button {
            Button::ArrowUp | Button::KeyW => Vec2::new(0.0, KEY_PAN_PIXELS),
            Button::ArrowDown | Button::KeyS => Vec2::new(0.0, -KEY_PAN_PIXELS),
            Button::ArrowLeft | Button::KeyA => Vec2::new(KEY_PAN_PIXELS, 0.0),
            Button::ArrowRight | Button::KeyD => Vec2::new(-KEY_PAN_PIXELS, 0.0),
            Button::Escape => return,
        };
        self.pan(step, camera, viewport_height);
    }

    fn clear_motion(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }

    /// Apply queued motion to the camera, returns whether it moved
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if !self.enabled || !self.has_motion() {
            // Pending input is dropped while disabled
            if !self.enabled {
                self.clear_motion();
            }
            camera.look_at(self.target);
            return false;
        }

        let factor = if self.enable_damping { self.damping_factor } else { 1.0 };

        // Work in a frame where the camera up is +Y
        let up = camera.up.try_normalize().unwrap_or(Vec3::Y);
        let to_y_up = Quat::from_rotation_arc(up, Vec3::Y);
        let offset = to_y_up * (camera.position - self.target);

        let radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 { (offset.y / radius).clamp(-1.0, 1.0).acos() } else { PI * 0.5 };

        theta += self.theta_delta * factor;
        phi = (phi + self.phi_delta * factor).clamp(MIN_POLAR, PI - MIN_POLAR);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        let previous = camera.position;
        self.target += self.pan_offset * factor;

        let sin_phi = phi.sin();
        let offset = Vec3::new(radius * sin_phi * theta.sin(), radius * phi.cos(), radius * sin_phi * theta.cos());
        camera.position = self.target + to_y_up.inverse() * offset;
        camera.look_at(self.target);

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
        if !self.has_motion() {
            self.clear_motion();
        }

        previous.distance_squared(camera.position) > CHANGE_EPSILON
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_at(position: Vec3) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = position;
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn idle_update_leaves_camera_alone() {
        let mut controls = OrbitControls::new();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 6.0));
        assert!(!controls.update(&mut camera));
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 6.0));
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut controls = OrbitControls::new();
        controls.enable_damping = false;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 6.0));

        controls.rotate(Vec2::new(100.0, 0.0), 400);
        assert!(controls.update(&mut camera));
        assert!((camera.position.length() - 6.0).abs() < 1e-4);
        assert!(camera.position.x.abs() > 1.0);
        assert!(!controls.has_motion());
    }

    #[test]
    fn zoom_in_shrinks_distance() {
        let mut controls = OrbitControls::new();
        controls.enable_damping = false;
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert!((camera.position.z - 9.5).abs() < 1e-3);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut controls = OrbitControls::new();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 6.0));
        controls.rotate(Vec2::new(50.0, 0.0), 400);
        assert!(controls.update(&mut camera));
        assert!(controls.has_motion());
    }

    #[test]
    fn disabled_controls_drop_input() {
        let mut controls = OrbitControls::new();
        let mut camera = camera_at(Vec3::new(0.0, 0.0, 6.0));
        controls.rotate(Vec2::new(50.0, 0.0), 400);
        controls.enabled = false;
        assert!(!controls.update(&mut camera));
        assert!(!controls.has_motion());
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 6.0));
    }
}
