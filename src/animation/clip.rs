use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::scene::{NodeId, SceneGraph, Transform};

/// Seconds a clip takes to fade in on play and out on pause
pub const FADE_DURATION: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Keyframes {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

/// Keyframed property of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub node: NodeId,
    pub times: Vec<f32>,
    pub keyframes: Keyframes,
    pub interpolation: Interpolation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sample {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

impl Channel {
    pub fn duration(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Surrounding keyframe indices and blend factor for `time`
    fn locate(&self, time: f32) -> Option<(usize, usize, f32)> {
        let last = self.times.len().checked_sub(1)?;
        if time <= self.times[0] {
            return Some((0, 0, 0.0));
        }
        if time >= self.times[last] {
            return Some((last, last, 0.0));
        }
        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let factor = if span > 0.0 {
            (time - self.times[prev]) / span
        } else {
            0.0
        };
        match self.interpolation {
            Interpolation::Linear => Some((prev, next, factor)),
            Interpolation::Step => Some((prev, prev, 0.0)),
        }
    }

    fn sample(&self, time: f32) -> Option<Sample> {
        let (a, b, t) = self.locate(time)?;
        match &self.keyframes {
            Keyframes::Translation(values) => {
                Some(Sample::Translation(values.get(a)?.lerp(*values.get(b)?, t)))
            }
            Keyframes::Rotation(values) => {
                Some(Sample::Rotation(values.get(a)?.slerp(*values.get(b)?, t)))
            }
            Keyframes::Scale(values) => Some(Sample::Scale(values.get(a)?.lerp(*values.get(b)?, t))),
        }
    }
}

/// Named keyframe animation shipped with a model
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels.iter().map(Channel::duration).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    elapsed: f32,
}

#[derive(Debug, Clone)]
struct ClipAction {
    clip: usize,
    time: f32,
    time_scale: f32,
    weight: f32,
    fade: Option<Fade>,
    /// Set once a fade-out began; the action is dropped when it ends
    stopping: bool,
}

impl ClipAction {
    fn fade_to(&mut self, to: f32) {
        self.fade = Some(Fade {
            from: self.weight,
            to,
            elapsed: 0.0,
        });
    }

    fn advance(&mut self, delta: f32, duration: f32) {
        self.time += delta * self.time_scale;
        if duration > 0.0 {
            self.time = self.time.rem_euclid(duration);
        } else {
            self.time = 0.0;
        }
        if let Some(fade) = &mut self.fade {
            fade.elapsed += delta;
            let t = (fade.elapsed / FADE_DURATION).min(1.0);
            self.weight = fade.from + (fade.to - fade.from) * t;
            if t >= 1.0 {
                self.fade = None;
            }
        }
    }

    fn finished(&self) -> bool {
        self.stopping && self.fade.is_none()
    }
}

/// Time-based playback of a model's clips with crossfades
#[derive(Debug, Default)]
pub struct ClipMixer {
    clips: Vec<AnimationClip>,
    actions: Vec<ClipAction>,
    running: Vec<String>,
    rest: HashMap<NodeId, Transform>,
}

impl ClipMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every clip; running actions are dropped
    pub fn set_clips(&mut self, clips: Vec<AnimationClip>) {
        self.clear();
        self.clips = clips;
    }

    pub fn clear(&mut self) {
        self.clips.clear();
        self.actions.clear();
        self.running.clear();
        self.rest.clear();
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    pub fn clip_names(&self) -> Vec<String> {
        self.clips.iter().map(|clip| clip.name.clone()).collect()
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Names of clips started and not yet paused
    pub fn running(&self) -> &[String] {
        &self.running
    }

    pub fn is_running(&self) -> bool {
        !self.running.is_empty()
    }

    pub fn is_clip_running(&self, name: &str) -> bool {
        self.running.iter().any(|running| running == name)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|clip| clip.name == name)
    }

    fn action_mut(&mut self, clip: usize) -> Option<&mut ClipAction> {
        self.actions.iter_mut().find(|action| action.clip == clip)
    }

    /// Fade a clip in from its first frame; false when no clip has that name
    pub fn play(&mut self, name: &str, time_scale: f32) -> bool {
        let Some(clip) = self.index_of(name) else {
            return false;
        };
        match self.action_mut(clip) {
            Some(action) => {
                action.time = 0.0;
                action.time_scale = time_scale;
                action.stopping = false;
                action.fade_to(1.0);
            }
            None => {
                let mut action = ClipAction {
                    clip,
                    time: 0.0,
                    time_scale,
                    weight: 0.0,
                    fade: None,
                    stopping: false,
                };
                action.fade_to(1.0);
                self.actions.push(action);
            }
        }
        if !self.is_clip_running(name) {
            self.running.push(name.to_string());
        }
        true
    }

    /// Fade a running clip out, then stop it; false when it was not running
    pub fn pause(&mut self, name: &str) -> bool {
        if !self.is_clip_running(name) {
            return false;
        }
        self.running.retain(|running| running != name);
        if let Some(clip) = self.index_of(name) {
            if let Some(action) = self.action_mut(clip) {
                action.stopping = true;
                action.fade_to(0.0);
            }
        }
        true
    }

    pub fn play_all(&mut self, time_scale: f32) {
        let names = self.clip_names();
        for name in names {
            self.play(&name, time_scale);
        }
    }

    /// Stop every action at once, without fading
    pub fn pause_all(&mut self) {
        self.actions.clear();
        self.running.clear();
    }

    /// Advance action clocks and write blended poses into `graph`
    pub fn update(&mut self, delta: f32, graph: &mut SceneGraph) {
        for action in &mut self.actions {
            let duration = self.clips.get(action.clip).map_or(0.0, |clip| clip.duration);
            action.advance(delta, duration);
        }
        self.actions.retain(|action| !action.finished());

        let mut poses: HashMap<NodeId, Pose> = HashMap::new();
        for action in &self.actions {
            let Some(clip) = self.clips.get(action.clip) else {
                continue;
            };
            if action.weight <= 0.0 {
                continue;
            }
            for channel in &clip.channels {
                if let Some(sample) = channel.sample(action.time) {
                    poses.entry(channel.node).or_default().add(sample, action.weight);
                }
            }
        }

        for (id, pose) in poses {
            let Some(node) = graph.get_mut(id) else {
                continue;
            };
            let rest = *self.rest.entry(id).or_insert(node.transform);
            node.transform = pose.resolve(rest);
        }
    }
}

/// Weighted accumulation of samples for one node
#[derive(Debug, Default)]
struct Pose {
    translation: Option<(Vec3, f32)>,
    rotation: Option<(Quat, f32)>,
    scale: Option<(Vec3, f32)>,
}

impl Pose {
    fn add(&mut self, sample: Sample, weight: f32) {
        match sample {
            Sample::Translation(value) => accumulate_vec(&mut self.translation, value, weight),
            Sample::Scale(value) => accumulate_vec(&mut self.scale, value, weight),
            Sample::Rotation(value) => match &mut self.rotation {
                Some((acc, total)) => {
                    *total += weight;
                    *acc = acc.slerp(value, weight / *total);
                }
                None => self.rotation = Some((value, weight)),
            },
        }
    }

    /// Blend with the rest pose when the total weight is below one
    fn resolve(&self, rest: Transform) -> Transform {
        let mut out = rest;
        if let Some((sum, total)) = self.translation {
            let w = total.min(1.0);
            out.translation = rest.translation.lerp(sum / total, w);
        }
        if let Some((sum, total)) = self.scale {
            let w = total.min(1.0);
            out.scale = rest.scale.lerp(sum / total, w);
        }
        if let Some((value, total)) = self.rotation {
            out.rotation = rest.rotation.slerp(value, total.min(1.0)).normalize();
        }
        out
    }
}

fn accumulate_vec(slot: &mut Option<(Vec3, f32)>, value: Vec3, weight: f32) {
    match slot {
        Some((sum, total)) => {
            *sum += value * weight;
            *total += weight;
        }
        None => *slot = Some((value * weight, weight)),
    }
}
