#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use model_viewer::camera::PerspectiveCamera;
use model_viewer::core::{ManualClock, ManualScheduler};
use model_viewer::loader::{channel, LoadHandle, LoadSender, LoadedScene};
use model_viewer::scene::{
    ColorSpace, EnvironmentTexture, Geometry, Material, Mesh, Node, Scene, SceneGraph,
};
use model_viewer::traits::{AssetLoader, Renderer};
use model_viewer::{EventKind, LoadError, Viewer, ViewerEvent, ViewerOptions};

#[derive(Default)]
pub struct RenderLog {
    pub frames: usize,
    pub sizes: Vec<(u32, u32)>,
    pub disposed: usize,
    pub output_spaces: Vec<ColorSpace>,
}

pub struct MockRenderer(pub Rc<RefCell<RenderLog>>);

impl Renderer for MockRenderer {
    fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) {
        self.0.borrow_mut().frames += 1;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.0.borrow_mut().sizes.push((width, height));
    }

    fn set_output_color_space(&mut self, space: ColorSpace) {
        self.0.borrow_mut().output_spaces.push(space);
    }

    fn dispose(&mut self) {
        self.0.borrow_mut().disposed += 1;
    }
}

/// Scene loads stay open until the test finishes them
#[derive(Clone, Default)]
pub struct Senders {
    pub scenes: Rc<RefCell<Vec<LoadSender<LoadedScene>>>>,
    pub objects: Rc<RefCell<Vec<LoadSender<SceneGraph>>>>,
    pub environments: Rc<RefCell<Vec<LoadSender<EnvironmentTexture>>>>,
}

impl Senders {
    pub fn finish_scene(&self, index: usize, result: Result<LoadedScene, LoadError>) {
        self.scenes.borrow_mut()[index].finish(result);
    }
}

pub struct MockLoader(pub Senders);

impl AssetLoader for MockLoader {
    fn load_scene(&mut self, url: &str) -> LoadHandle<LoadedScene> {
        let (sender, handle) = channel(url, None);
        self.0.scenes.borrow_mut().push(sender);
        handle
    }

    fn load_object(&mut self, url: &str) -> LoadHandle<SceneGraph> {
        let (sender, handle) = channel(url, None);
        self.0.objects.borrow_mut().push(sender);
        handle
    }

    fn load_environment(&mut self, url: &str) -> LoadHandle<EnvironmentTexture> {
        let (sender, handle) = channel(url, None);
        self.0.environments.borrow_mut().push(sender);
        handle
    }
}

pub struct Harness {
    pub viewer: Viewer,
    pub renders: Rc<RefCell<RenderLog>>,
    pub senders: Senders,
    pub scheduler: ManualScheduler,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(options: ViewerOptions) -> Self {
        let renders = Rc::new(RefCell::new(RenderLog::default()));
        let senders = Senders::default();
        let scheduler = ManualScheduler::new();
        let clock = ManualClock::new();
        let viewer = Viewer::new(
            options,
            Box::new(MockRenderer(renders.clone())),
            Box::new(MockLoader(senders.clone())),
            Box::new(scheduler.clone()),
        )
        .unwrap()
        .with_clock(clock.clone());
        Self {
            viewer,
            renders,
            senders,
            scheduler,
            clock,
        }
    }

    /// No plugins, so the scene only holds what the test puts there
    pub fn bare() -> Self {
        Self::new(bare_options())
    }

    /// Advance the clock and run the pending frame, if any
    pub fn step(&mut self, seconds: f32) -> bool {
        self.clock.advance(seconds);
        if self.scheduler.take_pending().is_none() {
            return false;
        }
        self.viewer.frame();
        true
    }

    pub fn frames_drawn(&self) -> usize {
        self.renders.borrow().frames
    }

    /// Record every event of the given kinds
    pub fn record(&mut self, kinds: &[EventKind]) -> Rc<RefCell<Vec<ViewerEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for &kind in kinds {
            let sink = log.clone();
            self.viewer.on(kind, move |event| sink.borrow_mut().push(event.clone()));
        }
        log
    }
}

pub fn bare_options() -> ViewerOptions {
    ViewerOptions {
        plugins: Vec::new(),
        ..ViewerOptions::default()
    }
}

/// Single cube of edge `size` centred on the origin
pub fn cube(size: f32) -> SceneGraph {
    let mut graph = SceneGraph::new();
    graph.add(Node::mesh(
        "cube",
        Mesh::new(Geometry::cuboid(Vec3::splat(size)), Material::default()),
    ));
    graph
}
