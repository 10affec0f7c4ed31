use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::math::are_close;

use super::easing::Easing;
use super::engine::{Animation, AnimationDescriptor, AnimationKind, AnimationState};
use super::record::Record;
use super::tween::Progress;

const POSITION: [&str; 3] = ["px", "py", "pz"];
const UP: [&str; 3] = ["ux", "uy", "uz"];
const TARGET: [&str; 3] = ["tx", "ty", "tz"];

/// Named camera viewpoints around the model
///
/// Each one is a viewing direction (from the camera toward the model) and a
/// camera up vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewDirection {
    Top,
    Bottom,
    Front,
    Back,
    Right,
    Left,
    SouthEast,
    SouthWest,
    NorthWest,
    NorthEast,
    BottomFront,
    BottomBack,
    BottomRight,
    BottomLeft,
    BottomSouthEast,
    BottomSouthWest,
    BottomNorthWest,
    BottomNorthEast,
    RoofFront,
    RoofBack,
    RoofRight,
    RoofLeft,
    RoofSouthEast,
    RoofSouthWest,
    RoofNorthWest,
    RoofNorthEast,
    TopTurnRight,
    TopTurnBack,
    TopTurnLeft,
    BottomTurnRight,
    BottomTurnBack,
    BottomTurnLeft,
    FrontTurnTop,
    FrontTurnLeft,
    FrontTurnRight,
    RightTurnTop,
    RightTurnFront,
    RightTurnBack,
    BackTurnTop,
    BackTurnLeft,
    BackTurnRight,
    LeftTurnTop,
    LeftTurnBack,
    LeftTurnFront,
}

type Entry = (ViewDirection, &'static str, [f32; 3], [f32; 3]);

// Same order as the enum so a variant indexes its own row.
const VIEWS: [Entry; 44] = [
    (ViewDirection::Top, "Top", [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]),
    (ViewDirection::Bottom, "Bottom", [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
    (ViewDirection::Front, "Front", [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::Back, "Back", [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::Right, "Right", [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    (ViewDirection::Left, "Left", [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    (ViewDirection::SouthEast, "SouthEast", [-1.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::SouthWest, "SouthWest", [1.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::NorthWest, "NorthWest", [1.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::NorthEast, "NorthEast", [-1.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomFront, "BottomFront", [0.0, 1.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomBack, "BottomBack", [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomRight, "BottomRight", [-1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomLeft, "BottomLeft", [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomSouthEast, "BottomSouthEast", [-1.0, 1.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomSouthWest, "BottomSouthWest", [1.0, 1.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomNorthWest, "BottomNorthWest", [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::BottomNorthEast, "BottomNorthEast", [-1.0, 1.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofFront, "RoofFront", [0.0, -1.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofBack, "RoofBack", [0.0, -1.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofRight, "RoofRight", [-1.0, -1.0, 0.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofLeft, "RoofLeft", [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofSouthEast, "RoofSouthEast", [-1.0, -1.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofSouthWest, "RoofSouthWest", [1.0, -1.0, -1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofNorthWest, "RoofNorthWest", [1.0, -1.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::RoofNorthEast, "RoofNorthEast", [-1.0, -1.0, 1.0], [0.0, 1.0, 0.0]),
    (ViewDirection::TopTurnRight, "TopTurnRight", [0.0, -1.0, 0.0], [-1.0, 0.0, 0.0]),
    (ViewDirection::TopTurnBack, "TopTurnBack", [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
    (ViewDirection::TopTurnLeft, "TopTurnLeft", [0.0, -1.0, 0.0], [1.0, 0.0, 0.0]),
    (ViewDirection::BottomTurnRight, "BottomTurnRight", [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]),
    (ViewDirection::BottomTurnBack, "BottomTurnBack", [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
    (ViewDirection::BottomTurnLeft, "BottomTurnLeft", [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
    (ViewDirection::FrontTurnTop, "FrontTurnTop", [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
    (ViewDirection::FrontTurnLeft, "FrontTurnLeft", [0.0, 0.0, -1.0], [1.0, 0.0, 0.0]),
    (ViewDirection::FrontTurnRight, "FrontTurnRight", [0.0, 0.0, -1.0], [-1.0, 0.0, 0.0]),
    (ViewDirection::RightTurnTop, "RightTurnTop", [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    (ViewDirection::RightTurnFront, "RightTurnFront", [-1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    (ViewDirection::RightTurnBack, "RightTurnBack", [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    (ViewDirection::BackTurnTop, "BackTurnTop", [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
    (ViewDirection::BackTurnLeft, "BackTurnLeft", [0.0, 0.0, 1.0], [-1.0, 0.0, 0.0]),
    (ViewDirection::BackTurnRight, "BackTurnRight", [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
    (ViewDirection::LeftTurnTop, "LeftTurnTop", [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
    (ViewDirection::LeftTurnBack, "LeftTurnBack", [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    (ViewDirection::LeftTurnFront, "LeftTurnFront", [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
];

impl ViewDirection {
    pub fn all() -> impl Iterator<Item = ViewDirection> {
        VIEWS.iter().map(|entry| entry.0)
    }

    fn entry(self) -> &'static Entry {
        &VIEWS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    /// Unit direction the camera looks along
    pub fn direction(self) -> Vec3 {
        Vec3::from(self.entry().2).normalize()
    }

    pub fn up(self) -> Vec3 {
        Vec3::from(self.entry().3)
    }
}

impl fmt::Display for ViewDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view direction `{0}`")]
pub struct UnknownView(pub String);

impl FromStr for ViewDirection {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VIEWS
            .iter()
            .find(|entry| entry.1.eq_ignore_ascii_case(s))
            .map(|entry| entry.0)
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

/// Where the camera should end up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotateGoal {
    View(ViewDirection),
    /// Viewing direction and up vector, not necessarily normalized
    Explicit { direction: Vec3, up: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateOptions {
    pub duration_ms: f32,
    pub easing: Easing,
    pub auto_start: bool,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self {
            duration_ms: 1000.0,
            easing: Easing::SinusoidalInOut,
            auto_start: true,
        }
    }
}

/// Swing the camera around the model to a named or explicit viewpoint
///
/// Position, up and orbit target share one eased parameter, and the orbit
/// controls stay disabled until the swing ends.
#[derive(Debug, Clone)]
pub struct RotateAnimation {
    goal: RotateGoal,
    options: RotateOptions,
}

impl RotateAnimation {
    pub fn new(goal: RotateGoal, options: RotateOptions) -> Self {
        Self { goal, options }
    }

    pub fn to_view(view: ViewDirection) -> Self {
        Self::new(RotateGoal::View(view), RotateOptions::default())
    }

    pub fn goal(&self) -> RotateGoal {
        self.goal
    }

    fn direction_and_up(&self) -> (Vec3, Vec3) {
        match self.goal {
            RotateGoal::View(view) => (view.direction(), view.up()),
            RotateGoal::Explicit { direction, up } => (direction, up),
        }
    }
}

impl Animation for RotateAnimation {
    fn name(&self) -> &str {
        "Animates.Rotate"
    }

    fn kind(&self) -> AnimationKind {
        AnimationKind::Camera
    }

    fn reconcile(&mut self, state: &mut AnimationState<'_>) -> Option<AnimationDescriptor> {
        let model = state.scene.model()?;
        let center = model.bounds.center;
        let distance = model.bounds.fit_distance;

        let (direction, up) = self.direction_and_up();
        let to_position = center - direction.normalize_or_zero() * distance;
        let to_up = up.normalize_or_zero();

        let camera = &*state.camera;
        if are_close(camera.position, to_position) && are_close(camera.up, to_up) {
            log::debug!("rotate to {:?}: camera already there", self.goal);
            return None;
        }

        let from = Record::new()
            .with_vec3(POSITION, camera.position)
            .with_vec3(UP, camera.up)
            .with_vec3(TARGET, state.controls.target);
        let to = Record::new()
            .with_vec3(POSITION, to_position)
            .with_vec3(UP, to_up)
            .with_vec3(TARGET, center);

        let progress = Progress::Timed {
            duration_ms: self.options.duration_ms,
            easing: self.options.easing,
        };
        Some(
            AnimationDescriptor::new(from, to, progress)
                .auto_start(self.options.auto_start)
                .locks_controls(true)
                .on_update(|record, state| {
                    let (Some(position), Some(up), Some(target)) =
                        (record.vec3(POSITION), record.vec3(UP), record.vec3(TARGET))
                    else {
                        return;
                    };
                    state.camera.position = position;
                    state.camera.up = up;
                    state.controls.target = target;
                    state.camera.look_at(target);
                }),
        )
    }
}
