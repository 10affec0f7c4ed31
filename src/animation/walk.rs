use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};

use crate::config::{rgb, WalkOptions};
use crate::scene::{Geometry, LineSet, Material, Mesh, Node, NodeId, Scene, Transform};

use super::engine::{Animation, AnimationDescriptor, AnimationKind, AnimationState};
use super::record::Record;
use super::tween::Progress;

pub const IDLE_CLIP: &str = "Idle";
pub const WALKING_CLIP: &str = "Walking";
pub const RUNNING_CLIP: &str = "Running";

const INDICATOR_COLOR: u32 = 0x00ccff;
const RING_RADIUS: f32 = 0.25;
const RING_HEIGHT: f32 = 0.025;
const RING_SEGMENTS: usize = 24;
const MARKER_SIZE: f32 = 0.125;
const MARKER_TOP: f32 = 0.5;
const MARKER_BOTTOM: f32 = 0.1;
const MARKER_BOB: f32 = 0.01;

/// Walk or run the model across the ground plane to a clicked point
#[derive(Debug, Clone)]
pub struct WalkAnimation {
    destination: Vec3,
    options: WalkOptions,
}

impl WalkAnimation {
    pub fn new(destination: Vec3, options: WalkOptions) -> Self {
        Self {
            destination,
            options,
        }
    }

    pub fn destination(&self) -> Vec3 {
        self.destination
    }

    /// Clip name and time scale for a trip of `distance`
    pub fn gait(&self, distance: f32) -> (&'static str, f32) {
        if distance > self.options.run_threshold {
            (RUNNING_CLIP, 1.0)
        } else {
            (WALKING_CLIP, 2.0)
        }
    }
}

impl Animation for WalkAnimation {
    fn name(&self) -> &str {
        "Animates.Walk"
    }

    fn kind(&self) -> AnimationKind {
        AnimationKind::Locomotion
    }

    fn reconcile(&mut self, state: &mut AnimationState<'_>) -> Option<AnimationDescriptor> {
        let model = state.scene.model_mut()?;
        let root = model.root;
        let from = model.position();
        let offset = Vec2::new(self.destination.x - from.x, self.destination.z - from.z);
        let distance = offset.length();
        if distance <= self.options.speed {
            log::debug!("walk to {}: already there", self.destination);
            return None;
        }

        let heading = Quat::from_rotation_arc(Vec3::Z, Vec3::new(offset.x, 0.0, offset.y) / distance);
        if let Some(node) = model.graph.get_mut(root) {
            node.transform.rotation = heading;
        }

        let (clip, time_scale) = self.gait(distance);
        state.clips.pause_all();
        state.clips.play(clip, time_scale);

        let (ring, marker) = add_indicators(state.scene, self.destination);

        let from = Record::new().with("x", from.x).with("z", from.z);
        let to = Record::new()
            .with("x", self.destination.x)
            .with("z", self.destination.z);
        Some(
            AnimationDescriptor::new(from, to, Progress::Stepped { step: self.options.speed })
                .on_update(move |record, state| {
                    if let Some(model) = state.scene.model_mut() {
                        let root = model.root;
                        if let (Some(node), Some(x), Some(z)) =
                            (model.graph.get_mut(root), record.get("x"), record.get("z"))
                        {
                            node.transform.translation.x = x;
                            node.transform.translation.z = z;
                        }
                    }
                    if let Some(node) = state.scene.overlays_mut().get_mut(marker) {
                        let y = &mut node.transform.translation.y;
                        *y = if *y > MARKER_BOTTOM { *y - MARKER_BOB } else { MARKER_TOP };
                    }
                })
                .on_stop(move |state| {
                    state.clips.pause_all();
                    state.clips.play(IDLE_CLIP, 2.0);
                    state.scene.remove_overlay(ring);
                    state.scene.remove_overlay(marker);
                }),
        )
    }
}

/// Ring on the ground and a marker hovering above the destination
fn add_indicators(scene: &mut Scene, at: Vec3) -> (NodeId, NodeId) {
    let color = rgb(INDICATOR_COLOR);
    let segments = (0..RING_SEGMENTS)
        .map(|i| {
            let a = TAU * i as f32 / RING_SEGMENTS as f32;
            let b = TAU * (i + 1) as f32 / RING_SEGMENTS as f32;
            [
                Vec3::new(a.cos(), 0.0, a.sin()) * RING_RADIUS,
                Vec3::new(b.cos(), 0.0, b.sin()) * RING_RADIUS,
            ]
        })
        .collect();
    let ring = Node::lines("WalkIndicatorRing", LineSet::new(segments, color))
        .with_transform(Transform::from_translation(Vec3::new(at.x, RING_HEIGHT, at.z)));

    let mut material = Material::standard(color);
    material.emissive = color;
    let marker = Node::mesh("WalkIndicatorMarker", Mesh::new(tetrahedron(MARKER_SIZE), material))
        .with_transform(Transform::from_translation(Vec3::new(at.x, MARKER_TOP, at.z)));

    (scene.add_overlay(ring), scene.add_overlay(marker))
}

/// Downward-pointing tetrahedron
fn tetrahedron(size: f32) -> Geometry {
    let positions = vec![
        Vec3::new(0.0, -size, 0.0),
        Vec3::new(size, size, 0.0),
        Vec3::new(-size * 0.5, size, size * 0.866),
        Vec3::new(-size * 0.5, size, -size * 0.866),
    ];
    Geometry::new(positions, Some(vec![0, 1, 2, 0, 2, 3, 0, 3, 1, 1, 3, 2]))
}
