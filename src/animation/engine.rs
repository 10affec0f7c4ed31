use std::mem;

use crate::camera::PerspectiveCamera;
use crate::controls::OrbitControls;
use crate::scene::Scene;

use super::clip::{AnimationClip, ClipMixer};
use super::record::Record;
use super::tween::{Progress, Tween, TweenState, TweenStep};
use super::walk::IDLE_CLIP;

pub type AnimationId = u64;

/// Time scale used when a clip is started implicitly
pub const DEFAULT_TIME_SCALE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationKind {
    Camera,
    /// Moves the model itself; at most one runs at a time
    Locomotion,
    #[default]
    Custom,
}

/// Viewer state the engine borrows for one call
pub struct AnimationTargets<'a> {
    pub camera: &'a mut PerspectiveCamera,
    pub controls: &'a mut OrbitControls,
    pub scene: &'a mut Scene,
}

impl<'a> AnimationTargets<'a> {
    pub fn new(
        camera: &'a mut PerspectiveCamera,
        controls: &'a mut OrbitControls,
        scene: &'a mut Scene,
    ) -> Self {
        Self {
            camera,
            controls,
            scene,
        }
    }
}

/// Everything an animation callback may read or write
pub struct AnimationState<'a> {
    pub camera: &'a mut PerspectiveCamera,
    pub controls: &'a mut OrbitControls,
    pub scene: &'a mut Scene,
    pub clips: &'a mut ClipMixer,
}

pub type UpdateFn = Box<dyn FnMut(&Record, &mut AnimationState<'_>)>;
pub type FinishFn = Box<dyn FnOnce(&mut AnimationState<'_>)>;

/// Result of a successful reconcile
///
/// `stop` runs whenever the run ends, `complete` additionally when it reached
/// the end record.
pub struct AnimationDescriptor {
    pub from: Record,
    pub to: Record,
    pub progress: Progress,
    pub auto_start: bool,
    pub locks_controls: bool,
    pub update: Option<UpdateFn>,
    pub stop: Option<FinishFn>,
    pub complete: Option<FinishFn>,
}

impl AnimationDescriptor {
    pub fn new(from: Record, to: Record, progress: Progress) -> Self {
        Self {
            from,
            to,
            progress,
            auto_start: true,
            locks_controls: false,
            update: None,
            stop: None,
            complete: None,
        }
    }

    pub fn auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    pub fn locks_controls(mut self, locks: bool) -> Self {
        self.locks_controls = locks;
        self
    }

    pub fn on_update(
        mut self,
        update: impl FnMut(&Record, &mut AnimationState<'_>) + 'static,
    ) -> Self {
        self.update = Some(Box::new(update));
        self
    }

    pub fn on_stop(mut self, stop: impl FnOnce(&mut AnimationState<'_>) + 'static) -> Self {
        self.stop = Some(Box::new(stop));
        self
    }

    pub fn on_complete(
        mut self,
        complete: impl FnOnce(&mut AnimationState<'_>) + 'static,
    ) -> Self {
        self.complete = Some(Box::new(complete));
        self
    }
}

/// A parameterised motion that turns into a tween once reconciled
pub trait Animation {
    fn name(&self) -> &str;

    fn kind(&self) -> AnimationKind {
        AnimationKind::Custom
    }

    /// Compare against the current state; None declines the animation
    fn reconcile(&mut self, state: &mut AnimationState<'_>) -> Option<AnimationDescriptor>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    Started { id: AnimationId, name: String },
    Stopped { id: AnimationId, name: String },
    Completed { id: AnimationId, name: String },
    Declined { id: AnimationId, name: String },
}

impl AnimationEvent {
    pub fn id(&self) -> AnimationId {
        match self {
            AnimationEvent::Started { id, .. }
            | AnimationEvent::Stopped { id, .. }
            | AnimationEvent::Completed { id, .. }
            | AnimationEvent::Declined { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AnimationEvent::Started { name, .. }
            | AnimationEvent::Stopped { name, .. }
            | AnimationEvent::Completed { name, .. }
            | AnimationEvent::Declined { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimateOutcome {
    Scheduled(AnimationId),
    Declined(AnimationId),
}

impl AnimateOutcome {
    pub fn id(self) -> AnimationId {
        match self {
            AnimateOutcome::Scheduled(id) | AnimateOutcome::Declined(id) => id,
        }
    }

    pub fn is_declined(self) -> bool {
        matches!(self, AnimateOutcome::Declined(_))
    }
}

/// Nested disablement of the orbit controls
///
/// The first acquire remembers whether the controls were enabled, the last
/// release restores that value.
#[derive(Debug, Default)]
pub struct ControlsLock {
    depth: usize,
    restore: bool,
}

impl ControlsLock {
    pub fn acquire(&mut self, controls: &mut OrbitControls) {
        if self.depth == 0 {
            self.restore = controls.enabled;
        }
        self.depth += 1;
        controls.enabled = false;
    }

    pub fn release(&mut self, controls: &mut OrbitControls) {
        if self.depth == 0 {
            return;
        }
        self.depth -= 1;
        if self.depth == 0 {
            controls.enabled = self.restore;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.depth > 0
    }
}

struct ActiveAnimation {
    id: AnimationId,
    name: String,
    kind: AnimationKind,
    tween: Tween,
    locks_controls: bool,
    locked: bool,
    update: Option<UpdateFn>,
    stop: Option<FinishFn>,
    complete: Option<FinishFn>,
}

/// Drives user tweens and model clips each frame
#[derive(Default)]
pub struct AnimationEngine {
    next_id: AnimationId,
    active: Vec<ActiveAnimation>,
    mixer: ClipMixer,
    lock: ControlsLock,
    events: Vec<AnimationEvent>,
    activity_requested: bool,
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clips(&self) -> &ClipMixer {
        &self.mixer
    }

    pub fn controls_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Reconcile `animation` and register its tween
    pub fn animate(
        &mut self,
        animation: &mut dyn Animation,
        mut targets: AnimationTargets<'_>,
    ) -> AnimateOutcome {
        self.next_id += 1;
        let id = self.next_id;
        let name = animation.name().to_string();
        let kind = animation.kind();

        if kind == AnimationKind::Locomotion {
            let previous: Vec<AnimationId> = self
                .active
                .iter()
                .filter(|entry| entry.kind == AnimationKind::Locomotion)
                .map(|entry| entry.id)
                .collect();
            for previous in previous {
                let targets = AnimationTargets::new(
                    &mut *targets.camera,
                    &mut *targets.controls,
                    &mut *targets.scene,
                );
                self.stop(previous, targets);
            }
        }

        let Self {
            active,
            mixer,
            lock,
            events,
            activity_requested,
            ..
        } = self;
        let mut state = borrow_state(mixer, &mut targets);

        let Some(descriptor) = animation.reconcile(&mut state) else {
            log::debug!("animation {name} declined: already at its target");
            events.push(AnimationEvent::Declined {
                id,
                name: name.clone(),
            });
            events.push(AnimationEvent::Completed { id, name });
            return AnimateOutcome::Declined(id);
        };

        let mut entry = ActiveAnimation {
            id,
            name,
            kind,
            tween: Tween::new(descriptor.from, descriptor.to, descriptor.progress),
            locks_controls: descriptor.locks_controls,
            locked: false,
            update: descriptor.update,
            stop: descriptor.stop,
            complete: descriptor.complete,
        };
        if descriptor.auto_start {
            begin(&mut entry, lock, &mut state, events);
            *activity_requested = true;
        }
        active.push(entry);
        AnimateOutcome::Scheduled(id)
    }

    /// Start a tween registered without auto-start
    pub fn start(&mut self, id: AnimationId, mut targets: AnimationTargets<'_>) -> bool {
        let Self {
            active,
            mixer,
            lock,
            events,
            activity_requested,
            ..
        } = self;
        let Some(entry) = active.iter_mut().find(|entry| entry.id == id) else {
            return false;
        };
        let mut state = borrow_state(mixer, &mut targets);
        let started = begin(entry, lock, &mut state, events);
        *activity_requested |= started;
        started
    }

    /// Cancel a tween; its stop callback runs, its complete callback never does
    pub fn stop(&mut self, id: AnimationId, mut targets: AnimationTargets<'_>) -> bool {
        let Some(index) = self.active.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = self.active.remove(index);
        let mut state = borrow_state(&mut self.mixer, &mut targets);
        end(entry, false, &mut self.lock, &mut state, &mut self.events);
        self.activity_requested = true;
        true
    }

    pub fn stop_all(&mut self, mut targets: AnimationTargets<'_>) {
        let entries = mem::take(&mut self.active);
        let mut state = borrow_state(&mut self.mixer, &mut targets);
        for entry in entries {
            end(entry, false, &mut self.lock, &mut state, &mut self.events);
        }
        self.activity_requested = true;
    }

    /// Start every registered tween that is still pending
    pub fn play_all_animations(&mut self, mut targets: AnimationTargets<'_>) {
        let Self {
            active,
            mixer,
            lock,
            events,
            activity_requested,
            ..
        } = self;
        let mut state = borrow_state(mixer, &mut targets);
        for entry in active.iter_mut() {
            *activity_requested |= begin(entry, lock, &mut state, events);
        }
    }

    /// Stop every registered tween
    pub fn pause_all_animations(&mut self, targets: AnimationTargets<'_>) {
        self.stop_all(targets);
    }

    /// Advance tweens by `delta` seconds, then the clip mixer
    pub fn render(&mut self, delta: f32, mut targets: AnimationTargets<'_>) {
        let Self {
            active,
            mixer,
            lock,
            events,
            activity_requested,
            ..
        } = self;
        let mut state = borrow_state(mixer, &mut targets);
        let delta_ms = delta * 1000.0;

        let mut index = 0;
        while index < active.len() {
            let entry = &mut active[index];
            let step = entry.tween.advance(delta_ms);
            if step != TweenStep::Idle {
                if let Some(update) = entry.update.as_mut() {
                    update(entry.tween.current(), &mut state);
                }
            }
            if step == TweenStep::Finished {
                let entry = active.remove(index);
                end(entry, true, lock, &mut state, events);
                *activity_requested = true;
                continue;
            }
            index += 1;
        }

        if let Some(model) = state.scene.model_mut() {
            state.clips.update(delta, &mut model.graph);
        }
    }

    /// Load a model's clips; one named `Idle` starts playing right away
    pub fn update_clips(&mut self, clips: Vec<AnimationClip>) {
        self.mixer.set_clips(clips);
        if self.mixer.has_clip(IDLE_CLIP) {
            self.play(IDLE_CLIP, DEFAULT_TIME_SCALE);
        }
    }

    pub fn remove_clips(&mut self) {
        self.mixer.clear();
    }

    pub fn play(&mut self, clip: &str, time_scale: f32) -> bool {
        let played = self.mixer.play(clip, time_scale);
        self.activity_requested |= played;
        played
    }

    pub fn pause(&mut self, clip: &str) -> bool {
        let paused = self.mixer.pause(clip);
        self.activity_requested |= paused;
        paused
    }

    pub fn play_all(&mut self) {
        self.mixer.play_all(DEFAULT_TIME_SCALE);
        self.activity_requested = true;
    }

    pub fn pause_all(&mut self) {
        self.mixer.pause_all();
        self.activity_requested = true;
    }

    pub fn running_actions(&self) -> &[String] {
        self.mixer.running()
    }

    /// Any running clip or tween
    pub fn is_running(&self) -> bool {
        self.mixer.is_running() || self.active.iter().any(|entry| entry.tween.is_running())
    }

    pub fn is_active(&self, id: AnimationId) -> bool {
        self.active.iter().any(|entry| entry.id == id)
    }

    /// Ids and names of the registered tweens, oldest first
    pub fn animations(&self) -> impl Iterator<Item = (AnimationId, &str)> {
        self.active.iter().map(|entry| (entry.id, entry.name.as_str()))
    }

    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        mem::take(&mut self.events)
    }

    /// True once after anything happened that should keep frames coming
    pub fn take_activity_request(&mut self) -> bool {
        mem::take(&mut self.activity_requested)
    }

    pub fn dispose(&mut self, targets: AnimationTargets<'_>) {
        self.stop_all(targets);
        self.mixer.clear();
        self.events.clear();
        self.activity_requested = false;
    }
}

fn borrow_state<'a>(mixer: &'a mut ClipMixer, targets: &'a mut AnimationTargets<'_>) -> AnimationState<'a> {
    AnimationState {
        camera: &mut *targets.camera,
        controls: &mut *targets.controls,
        scene: &mut *targets.scene,
        clips: mixer,
    }
}

fn begin(
    entry: &mut ActiveAnimation,
    lock: &mut ControlsLock,
    state: &mut AnimationState<'_>,
    events: &mut Vec<AnimationEvent>,
) -> bool {
    if entry.tween.state() != TweenState::Pending {
        return false;
    }
    if entry.locks_controls && !entry.locked {
        lock.acquire(state.controls);
        entry.locked = true;
    }
    entry.tween.start();
    events.push(AnimationEvent::Started {
        id: entry.id,
        name: entry.name.clone(),
    });
    true
}

fn end(
    mut entry: ActiveAnimation,
    completed: bool,
    lock: &mut ControlsLock,
    state: &mut AnimationState<'_>,
    events: &mut Vec<AnimationEvent>,
) {
    if entry.locked {
        lock.release(state.controls);
    }
    if let Some(stop) = entry.stop.take() {
        stop(state);
    }
    if completed {
        if let Some(complete) = entry.complete.take() {
            complete(state);
        }
        events.push(AnimationEvent::Completed {
            id: entry.id,
            name: entry.name,
        });
    } else {
        events.push(AnimationEvent::Stopped {
            id: entry.id,
            name: entry.name,
        });
    }
}
