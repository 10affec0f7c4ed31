//! Plugin protocol: the trait every widget implements, the context it is
//! handed on each call, and the registry that broadcasts to all of them.

mod registry;

use std::any::Any;

use anyhow::Result;
use glam::{Vec2, Vec3};

use crate::animation::{Animation, ViewDirection};
use crate::camera::PerspectiveCamera;
use crate::config::ViewerOptions;
use crate::scene::{Bounds, Classification, NodeId, Scene};

pub use registry::{matches_namespace, Dispatch, PluginRegistry};

/// Render surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Snapshot handed to plugins when the model changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneData {
    pub classification: Classification,
    pub bounds: Option<Bounds>,
    pub clip_names: Vec<String>,
}

/// One mesh intersection, nearest first in `CaptureResult::hits`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Picking result for a pointer position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureResult {
    pub ndc: Vec2,
    pub hits: Vec<Hit>,
    /// Intersection with the ground plane, independent of mesh hits
    pub ground_point: Option<Vec3>,
}

impl CaptureResult {
    pub fn nearest(&self) -> Option<&Hit> {
        self.hits.first()
    }
}

/// Requests a plugin can make of the viewer, applied after the current dispatch
pub enum ViewerCommand {
    Activate,
    Animate(Box<dyn Animation>),
    RotateTo(ViewDirection),
    ShowPlugins(String),
    HidePlugins(String),
    RemovePlugin(String),
}

impl std::fmt::Debug for ViewerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerCommand::Activate => write!(f, "Activate"),
            ViewerCommand::Animate(animation) => write!(f, "Animate({})", animation.name()),
            ViewerCommand::RotateTo(view) => write!(f, "RotateTo({view:?})"),
            ViewerCommand::ShowPlugins(prefix) => write!(f, "ShowPlugins({prefix})"),
            ViewerCommand::HidePlugins(prefix) => write!(f, "HidePlugins({prefix})"),
            ViewerCommand::RemovePlugin(name) => write!(f, "RemovePlugin({name})"),
        }
    }
}

/// What a plugin may touch during a call
pub struct PluginContext<'a> {
    pub scene: &'a mut Scene,
    pub camera: &'a PerspectiveCamera,
    pub options: &'a ViewerOptions,
    pub viewport: Viewport,
    commands: &'a mut Vec<ViewerCommand>,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        scene: &'a mut Scene,
        camera: &'a PerspectiveCamera,
        options: &'a ViewerOptions,
        viewport: Viewport,
        commands: &'a mut Vec<ViewerCommand>,
    ) -> Self {
        Self {
            scene,
            camera,
            options,
            viewport,
            commands,
        }
    }

    pub fn request(&mut self, command: ViewerCommand) {
        self.commands.push(command);
    }

    /// Ask for continued rendering
    pub fn activate(&mut self) {
        self.request(ViewerCommand::Activate);
    }
}

/// Optional behaviour attached to the viewer under a dotted name
///
/// `dispose` consumes the plugin, so no call can follow it.
pub trait Plugin: Any {
    fn name(&self) -> &str;

    /// Called once on registration; must be a no-op the second time
    fn initialize(&mut self, ctx: &mut PluginContext<'_>) -> Result<()>;

    /// The model changed
    fn update(&mut self, ctx: &mut PluginContext<'_>, data: &SceneData) -> Result<()>;

    /// Every active frame, after the scene was drawn and animations advanced
    fn render(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        Ok(())
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()>;

    /// Leaves internal resources intact
    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()>;

    fn capture(&mut self, _ctx: &mut PluginContext<'_>, _capture: &CaptureResult) -> Result<()> {
        Ok(())
    }

    fn resize(&mut self, _ctx: &mut PluginContext<'_>, _viewport: Viewport) -> Result<()> {
        Ok(())
    }

    fn dispose(self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
