//! Tweens, clip playback and the engine that drives both every frame.

mod clip;
mod easing;
mod engine;
mod record;
mod rotate;
mod tween;
mod walk;

pub use clip::{AnimationClip, Channel, ClipMixer, Interpolation, Keyframes, FADE_DURATION};
pub use easing::Easing;
pub use engine::{
    AnimateOutcome, Animation, AnimationDescriptor, AnimationEngine, AnimationEvent, AnimationId,
    AnimationKind, AnimationState, AnimationTargets, ControlsLock, FinishFn, UpdateFn,
    DEFAULT_TIME_SCALE,
};
pub use record::Record;
pub use rotate::{RotateAnimation, RotateGoal, RotateOptions, UnknownView, ViewDirection};
pub use tween::{Progress, Tween, TweenState, TweenStep};
pub use walk::{WalkAnimation, IDLE_CLIP, RUNNING_CLIP, WALKING_CLIP};
