//! The viewer: owns the scene, camera and controls and runs the frame loop
//! that ties the activity governor, plugins and animations together.

use std::sync::Arc;

use glam::{Vec2, Vec3};

use crate::animation::{
    AnimateOutcome, Animation, AnimationClip, AnimationEngine, AnimationEvent, AnimationId,
    AnimationTargets, RotateAnimation, RotateGoal, RotateOptions, ViewDirection, WalkAnimation,
};
use crate::camera::PerspectiveCamera;
use crate::config::{rgb, BackgroundOptions, ViewerOptions};
use crate::controls::OrbitControls;
use crate::core::{to_ndc, ActivityGovernor, Button, Clock, PointerButton, PointerTracker, Transition};
use crate::error::{LoadError, Result, ViewerError};
use crate::events::{EventHandlers, EventKind, Generation, ViewerEvent};
use crate::loader::{supported_extension, LoadHandle, LoadedScene};
use crate::math::{moller_trumbore_intersect, Plane};
use crate::plugin::{
    CaptureResult, Dispatch, Hit, Plugin, PluginContext, PluginRegistry, SceneData, ViewerCommand,
    Viewport,
};
use crate::plugins::{self, BackgroundShader};
use crate::scene::{
    Background, Bounds, ColorSpace, EnvironmentTexture, NodeKind, Scene, SceneGraph, SceneHandle,
};
use crate::traits::{AssetLoader, FrameClock, FrameHandle, FrameScheduler, Renderer};

/// Rounds of plugin commands applied before the rest is dropped
const MAX_COMMAND_ROUNDS: usize = 8;

enum PendingLoad {
    Scene {
        generation: Generation,
        handle: LoadHandle<LoadedScene>,
    },
    Object {
        handle: LoadHandle<SceneGraph>,
    },
    Environment {
        handle: LoadHandle<EnvironmentTexture>,
        as_background: bool,
    },
}

pub struct Viewer {
    options: ViewerOptions,
    /// `None` once disposed
    renderer: Option<Box<dyn Renderer>>,
    loader: Box<dyn AssetLoader>,
    scheduler: Box<dyn FrameScheduler>,
    clock: Box<dyn FrameClock>,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    scene: Scene,
    plugins: PluginRegistry,
    animations: AnimationEngine,
    governor: ActivityGovernor,
    events: EventHandlers,
    pointer: PointerTracker,
    viewport: Viewport,
    running: bool,
    pending_frame: Option<FrameHandle>,
    generation: Generation,
    pending: Vec<PendingLoad>,
    commands: Vec<ViewerCommand>,
    walk: Option<AnimationId>,
}

impl Viewer {
    /// Build a viewer and install the plugins named in `options.plugins`
    pub fn new(
        options: ViewerOptions,
        mut renderer: Box<dyn Renderer>,
        loader: Box<dyn AssetLoader>,
        scheduler: Box<dyn FrameScheduler>,
    ) -> Result<Self> {
        options.validate()?;

        let camera = PerspectiveCamera::new(
            options.camera.fov,
            options.camera.near,
            options.camera.far,
            1.0,
        );
        let mut controls = OrbitControls::new();
        controls.enable_damping = options.controls.damping;
        controls.damping_factor = options.controls.damping_factor;

        let mut scene = Scene::new();
        if let Some(colors) = options.background {
            scene.background = Background::Color(rgb(colors.color1));
        }

        renderer.set_output_color_space(options.output_color_space);

        let mut viewer = Self {
            governor: ActivityGovernor::new(options.life_time),
            options,
            renderer: Some(renderer),
            loader,
            scheduler,
            clock: Box::new(Clock::new()),
            camera,
            controls,
            scene,
            plugins: PluginRegistry::new(),
            animations: AnimationEngine::new(),
            events: EventHandlers::new(),
            pointer: PointerTracker::new(),
            viewport: Viewport::default(),
            running: false,
            pending_frame: None,
            generation: 0,
            pending: Vec::new(),
            commands: Vec::new(),
            walk: None,
        };
        viewer.install_plugins();
        Ok(viewer)
    }

    /// Replace the wall clock, for deterministic frame deltas
    pub fn with_clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn install_plugins(&mut self) {
        for name in self.options.plugins.clone() {
            match plugins::create(&name, &self.options) {
                Some(plugin) => self.with_plugins(|registry, ctx| registry.add(plugin, ctx)),
                None => log::warn!("unknown plugin {name}, skipped"),
            }
        }
        self.apply_commands();
    }

    // === Accessors ===

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn model(&self) -> Option<&SceneHandle> {
        self.scene.model()
    }

    pub fn animations(&self) -> &AnimationEngine {
        &self.animations
    }

    pub fn governor(&self) -> &ActivityGovernor {
        &self.governor
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether the frame loop is scheduled
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether frames are being drawn
    pub fn is_active(&self) -> bool {
        self.governor.is_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.renderer.is_none()
    }

    /// Generation of the most recent `load_url`
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Id of the walk in progress
    pub fn walking(&self) -> Option<AnimationId> {
        self.walk
    }

    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&ViewerEvent) + 'static) {
        self.events.on(kind, handler);
    }

    fn emit(&mut self, event: ViewerEvent) {
        self.events.emit(&event);
    }

    // === Plugins ===

    fn with_plugins<R>(&mut self, f: impl FnOnce(&mut PluginRegistry, &mut PluginContext<'_>) -> R) -> R {
        let mut ctx = PluginContext::new(
            &mut self.scene,
            &self.camera,
            &self.options,
            self.viewport,
            &mut self.commands,
        );
        f(&mut self.plugins, &mut ctx)
    }

    fn dispatch(&mut self, method: Dispatch<'_>) -> usize {
        let failures = self.with_plugins(|registry, ctx| registry.dispatch(method, ctx));
        self.apply_commands();
        failures
    }

    /// Register a plugin; with a model loaded it also receives `update` right away
    pub fn add_plugin(&mut self, plugin: Box<dyn Plugin>) {
        let name = plugin.name().to_string();
        self.with_plugins(|registry, ctx| registry.add(plugin, ctx));
        if let Some(data) = self.scene_data() {
            self.with_plugins(|registry, ctx| {
                if let Some(plugin) = registry.get_mut(&name) {
                    if let Err(err) = plugin.update(ctx, &data) {
                        log::error!("[plugin:{name}] update failed: {err:?}");
                    }
                }
            });
        }
        self.apply_commands();
        self.activate();
    }

    pub fn remove_plugin(&mut self, name: &str) -> bool {
        let removed = self.with_plugins(|registry, ctx| registry.remove(name, ctx));
        self.apply_commands();
        if removed {
            self.activate();
        }
        removed
    }

    pub fn show_plugins(&mut self, prefix: &str) {
        self.with_plugins(|registry, ctx| registry.show_namespace(prefix, ctx));
        self.apply_commands();
        self.activate();
    }

    pub fn hide_plugins(&mut self, prefix: &str) {
        self.with_plugins(|registry, ctx| registry.hide_namespace(prefix, ctx));
        self.apply_commands();
        self.activate();
    }

    pub fn plugin_as<T: Plugin>(&self, name: &str) -> Option<&T> {
        self.plugins.get_as::<T>(name)
    }

    pub fn plugin_as_mut<T: Plugin>(&mut self, name: &str) -> Option<&mut T> {
        self.plugins.get_as_mut::<T>(name)
    }

    fn apply_commands(&mut self) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for command in std::mem::take(&mut self.commands) {
                log::trace!("plugin command {command:?}");
                match command {
                    ViewerCommand::Activate => self.activate(),
                    ViewerCommand::Animate(mut animation) => {
                        if let Err(err) = self.animate(animation.as_mut()) {
                            log::warn!("animation {} rejected: {err}", animation.name());
                        }
                    }
                    ViewerCommand::RotateTo(view) => {
                        if let Err(err) = self.rotate_to(view) {
                            log::warn!("rotate to {view} rejected: {err}");
                        }
                    }
                    ViewerCommand::ShowPlugins(prefix) => {
                        self.with_plugins(|registry, ctx| registry.show_namespace(&prefix, ctx));
                    }
                    ViewerCommand::HidePlugins(prefix) => {
                        self.with_plugins(|registry, ctx| registry.hide_namespace(&prefix, ctx));
                    }
                    ViewerCommand::RemovePlugin(name) => {
                        self.with_plugins(|registry, ctx| registry.remove(&name, ctx));
                    }
                }
            }
        }
        if !self.commands.is_empty() {
            log::warn!("dropping {} plugin commands issued in a loop", self.commands.len());
            self.commands.clear();
        }
    }

    // === Loading ===

    fn check_url(url: &str) -> Result<&'static str> {
        supported_extension(url).ok_or_else(|| {
            log::warn!("unsupported file extension: {url}");
            ViewerError::UnsupportedExtension { url: url.to_string() }
        })
    }

    /// Start loading a model; fails before any work for unsupported extensions
    ///
    /// Only the result of the most recent generation is applied.
    pub fn load_url(&mut self, url: &str) -> Result<Generation> {
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }
        Self::check_url(url)?;
        self.generation += 1;
        let generation = self.generation;
        log::info!("load {url} (generation {generation})");
        let handle = self.loader.load_scene(url);
        self.pending.push(PendingLoad::Scene { generation, handle });
        Ok(generation)
    }

    /// Load a model and add it to the current one
    pub fn load_object(&mut self, url: &str) -> Result<()> {
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }
        Self::check_url(url)?;
        log::info!("load object {url}");
        let handle = self.loader.load_object(url);
        self.pending.push(PendingLoad::Object { handle });
        Ok(())
    }

    /// Load an environment map for lighting and optionally the background
    pub fn update_environment(&mut self, url: &str, as_background: bool) -> Result<()> {
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }
        log::info!("load environment {url}");
        let handle = self.loader.load_environment(url);
        self.pending.push(PendingLoad::Environment { handle, as_background });
        Ok(())
    }

    /// Forward progress and apply finished loads, returns how many resolved
    pub fn poll_loads(&mut self) -> usize {
        let mut resolved = 0;
        for load in std::mem::take(&mut self.pending) {
            match load {
                PendingLoad::Scene { generation, mut handle } => {
                    let current = generation == self.generation;
                    if current {
                        self.emit_progress(&mut handle);
                    }
                    let Some(result) = handle.try_poll() else {
                        self.pending.push(PendingLoad::Scene { generation, handle });
                        continue;
                    };
                    resolved += 1;
                    if !current {
                        log::debug!("dropping superseded load of {} (generation {generation})", handle.url());
                        continue;
                    }
                    let url = handle.url().to_string();
                    match result {
                        Ok(loaded) => {
                            if self.update_from(loaded.graph, loaded.clips, Some(url.clone())).is_ok() {
                                self.emit(ViewerEvent::Loaded { url, generation });
                            }
                        }
                        Err(err) => self.report_error(err),
                    }
                }
                PendingLoad::Object { mut handle } => {
                    self.emit_progress(&mut handle);
                    let Some(result) = handle.try_poll() else {
                        self.pending.push(PendingLoad::Object { handle });
                        continue;
                    };
                    resolved += 1;
                    match result {
                        Ok(graph) => self.add_object(graph, handle.url().to_string()),
                        Err(err) => self.report_error(err),
                    }
                }
                PendingLoad::Environment { mut handle, as_background } => {
                    self.emit_progress(&mut handle);
                    let Some(result) = handle.try_poll() else {
                        self.pending.push(PendingLoad::Environment { handle, as_background });
                        continue;
                    };
                    resolved += 1;
                    match result {
                        Ok(texture) => self.apply_environment(texture, as_background),
                        Err(err) => self.report_error(err),
                    }
                }
            }
        }
        resolved
    }

    fn emit_progress<T>(&mut self, handle: &mut LoadHandle<T>) {
        for progress in handle.drain_progress() {
            self.events.emit(&ViewerEvent::Progress {
                url: handle.url().to_string(),
                loaded: progress.loaded,
                total: progress.total,
            });
        }
    }

    fn report_error(&mut self, err: LoadError) {
        log::error!("load of {} failed: {:?} {}", err.url, err.kind, err.detail);
        self.emit(ViewerEvent::Error {
            url: err.url.clone(),
            message: err.message(),
        });
    }

    fn add_object(&mut self, mut graph: SceneGraph, url: String) {
        if self.scene.model().is_none() {
            if let Err(err) = self.update_from(graph, Vec::new(), Some(url)) {
                log::warn!("object dropped: {err}");
            }
            return;
        }
        self.normalize(&mut graph);
        let Some(model) = self.scene.model_mut() else { return };
        let root = model.root;
        model.graph.graft(graph, root);
        model.refresh();
        if let Some(data) = self.scene_data() {
            self.dispatch(Dispatch::Update(&data));
        }
        self.activate();
    }

    fn apply_environment(&mut self, texture: EnvironmentTexture, as_background: bool) {
        let texture = Arc::new(texture);
        self.with_plugins(|registry, ctx| registry.hide_namespace(BackgroundShader::NAME, ctx));
        self.scene.environment = Some(texture.clone());
        self.scene.background = if as_background {
            Background::Environment(texture)
        } else {
            Background::default()
        };
        self.apply_commands();
        self.activate();
    }

    // === Scene ===

    fn scene_data(&self) -> Option<SceneData> {
        let model = self.scene.model()?;
        Some(SceneData {
            classification: model.classification.clone(),
            bounds: Some(model.bounds),
            clip_names: model.clip_names.clone(),
        })
    }

    /// Replace the displayed model
    pub fn update(&mut self, graph: SceneGraph, clips: Vec<AnimationClip>) -> Result<()> {
        self.update_from(graph, clips, None)
    }

    fn update_from(&mut self, mut graph: SceneGraph, clips: Vec<AnimationClip>, source: Option<String>) -> Result<()> {
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }

        self.scene.set_model_visible(false);
        self.animations
            .stop_all(AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.animations.remove_clips();
        self.scene.take_model();
        self.walk = None;

        self.normalize(&mut graph);
        let mut handle = SceneHandle::new(graph, source);
        handle.clip_names = clips.iter().map(|clip| clip.name.clone()).collect();
        log::info!(
            "update: {} meshes, {} lights, {} cameras, {} clips",
            handle.classification.meshes.len(),
            handle.classification.lights.len(),
            handle.classification.cameras.len(),
            handle.clip_names.len()
        );

        self.frame_model(&handle.bounds);
        self.scene.set_model(handle);
        self.animations.update_clips(clips);

        if let Some(data) = self.scene_data() {
            self.dispatch(Dispatch::Update(&data));
        }
        self.scene.set_model_visible(true);
        self.emit(ViewerEvent::Updated);
        self.start();
        self.activate();
        Ok(())
    }

    /// Per-load material and naming fixes
    fn normalize(&self, graph: &mut SceneGraph) {
        let mut cameras = 0;
        for id in graph.depth_first() {
            let Some(node) = graph.get_mut(id) else { continue };
            match &mut node.kind {
                NodeKind::Camera(_) => {
                    cameras += 1;
                    if node.name.is_empty() {
                        node.name = format!("Camera_{cameras}");
                    }
                }
                NodeKind::Mesh(mesh) => {
                    let material = &mut mesh.material;
                    material.depth_write = !material.transparent;
                    material.wireframe = self.options.wireframe;
                    if material.kind.is_lit() {
                        material.emissive = material.color;
                        if material.emissive_map.is_none() {
                            material.emissive_map = material.map.clone();
                        }
                        for texture in material.textures_mut() {
                            texture.color_space = self.options.texture_color_space;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Put the camera at the fit distance in front of the model
    fn frame_model(&mut self, bounds: &Bounds) {
        let center = bounds.center;
        self.camera.position = match self.options.camera.position {
            Some(position) => Vec3::from(position),
            None => center + Vec3::new(0.0, 0.0, bounds.fit_distance),
        };
        self.camera.up = Vec3::Y;
        self.camera.look_at(center);
        self.controls.target = center;
        self.controls.enabled = true;
    }

    /// Drop the model and everything animating it
    pub fn clear(&mut self) {
        if self.scene.model().is_none() {
            return;
        }
        self.animations
            .stop_all(AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.animations.remove_clips();
        self.scene.take_model();
        self.walk = None;
        self.dispatch(Dispatch::Update(&SceneData::default()));
        self.activate();
    }

    pub fn show(&mut self) {
        self.scene.set_model_visible(true);
        self.activate();
    }

    pub fn hide(&mut self) {
        self.scene.set_model_visible(false);
        self.activate();
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.options.wireframe = wireframe;
        if let Some(model) = self.scene.model_mut() {
            for (_, node) in model.graph.iter_mut() {
                if let Some(mesh) = node.as_mesh_mut() {
                    mesh.material.wireframe = wireframe;
                }
            }
        }
        self.activate();
    }

    /// Retag the textures of every lit material, and of later loads
    pub fn set_texture_color_space(&mut self, space: ColorSpace) {
        self.options.texture_color_space = space;
        if let Some(model) = self.scene.model_mut() {
            for (_, node) in model.graph.iter_mut() {
                let Some(mesh) = node.as_mesh_mut() else { continue };
                if mesh.material.kind.is_lit() {
                    for texture in mesh.material.textures_mut() {
                        texture.color_space = space;
                    }
                }
            }
        }
        self.activate();
    }

    /// Colour space the renderer encodes pixels in
    pub fn set_output_color_space(&mut self, space: ColorSpace) {
        self.options.output_color_space = space;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_output_color_space(space);
        }
        self.activate();
    }

    /// Gradient colours for `Shaders.Background`, or a flat colour without it
    pub fn update_background(&mut self, color1: u32, color2: u32) {
        let colors = BackgroundOptions { color1, color2 };
        self.options.background = Some(colors);
        let handled = self.with_plugins(|registry, ctx| {
            let Some(shader) = registry.get_as_mut::<BackgroundShader>(BackgroundShader::NAME) else {
                return false;
            };
            shader.set_colors(ctx.scene, colors);
            if let Err(err) = shader.show(ctx) {
                log::error!("[plugin:{}] show failed: {err:?}", BackgroundShader::NAME);
            }
            true
        });
        if !handled {
            self.scene.background = Background::Color(rgb(color1));
        }
        self.apply_commands();
        self.activate();
    }

    // === Loop and activity ===

    fn schedule(&mut self) {
        if self.pending_frame.is_none() {
            self.pending_frame = Some(self.scheduler.request_frame());
        }
    }

    /// Begin the frame loop; needs a model and does nothing when already running
    pub fn start(&mut self) {
        if self.is_disposed() || self.running || self.scene.model().is_none() {
            return;
        }
        self.running = true;
        self.clock.reset();
        self.schedule();
        log::info!("start");
        self.emit(ViewerEvent::Started);
        self.activate();
    }

    /// Stop the frame loop and go idle
    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            if let Some(handle) = self.pending_frame.take() {
                self.scheduler.cancel_frame(handle);
            }
            log::info!("pause");
            self.emit(ViewerEvent::Paused);
        }
        self.inactivate();
    }

    /// Request continued drawing; the idle countdown restarts unless something animates
    pub fn activate(&mut self) {
        if self.is_disposed() {
            return;
        }
        if self.governor.activate(self.animations.is_running()) == Transition::Activated {
            self.emit(ViewerEvent::Activated);
        }
    }

    pub fn inactivate(&mut self) {
        if self.governor.inactivate() == Transition::Inactivated {
            self.emit(ViewerEvent::Inactivated);
        }
    }

    /// Window occlusion: hidden pauses, shown resumes
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.start();
            self.activate();
        } else {
            self.pause();
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.is_disposed() || width == 0 || height == 0 {
            return;
        }
        let viewport = Viewport::new(width, height);
        self.viewport = viewport;
        self.camera.set_viewport(width, height);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_size(width, height);
        }
        self.dispatch(Dispatch::Resize(viewport));
        self.emit(ViewerEvent::Resized { width, height });
        self.activate();
    }

    /// Run one scheduled frame
    ///
    /// Order: loads, idle countdown, then while active draw, animation
    /// advance, controls and plugin render. Always reschedules while running.
    pub fn frame(&mut self) {
        self.pending_frame = None;
        if self.is_disposed() {
            return;
        }
        let delta = self.clock.tick();
        self.poll_loads();
        if !self.running {
            return;
        }

        if self.governor.advance(delta, self.animations.is_running()) == Transition::Inactivated {
            self.emit(ViewerEvent::Inactivated);
        }

        let mut moved = false;
        if self.governor.is_active() {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.render(&self.scene, &self.camera);
            }
            self.animations.render(
                delta,
                AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene),
            );
            moved = self.controls.update(&mut self.camera);
            self.dispatch(Dispatch::Render);
        }

        let changed = self.scene.take_changed();
        if self.animations.take_activity_request() || changed || moved {
            self.activate();
        }
        self.forward_animation_events();

        if self.running {
            self.schedule();
        }
    }

    // === Animation ===

    fn forward_animation_events(&mut self) {
        for event in self.animations.drain_events() {
            if let AnimationEvent::Stopped { id, .. } | AnimationEvent::Completed { id, .. } = &event {
                if self.walk == Some(*id) {
                    self.walk = None;
                }
            }
            self.emit(ViewerEvent::Animation(event));
        }
    }

    /// Reconcile and schedule an animation against the live camera and scene
    pub fn animate(&mut self, animation: &mut dyn Animation) -> Result<AnimateOutcome> {
        if self.is_disposed() {
            return Err(ViewerError::Disposed);
        }
        let outcome = self.animations.animate(
            animation,
            AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene),
        );
        if self.animations.take_activity_request() {
            self.activate();
        }
        self.forward_animation_events();
        Ok(outcome)
    }

    pub fn rotate_to(&mut self, view: ViewDirection) -> Result<AnimateOutcome> {
        self.animate(&mut RotateAnimation::to_view(view))
    }

    pub fn rotate_with(&mut self, goal: RotateGoal, options: RotateOptions) -> Result<AnimateOutcome> {
        self.animate(&mut RotateAnimation::new(goal, options))
    }

    /// Walk the model to a ground point, replacing any walk in progress
    pub fn walk_to(&mut self, point: Vec3) -> Result<AnimateOutcome> {
        let mut walk = WalkAnimation::new(point, self.options.walk.clone());
        let outcome = self.animate(&mut walk)?;
        if let AnimateOutcome::Scheduled(id) = outcome {
            self.walk = Some(id);
        }
        Ok(outcome)
    }

    pub fn start_animation(&mut self, id: AnimationId) -> bool {
        let started = self
            .animations
            .start(id, AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.after_animation_change();
        started
    }

    pub fn stop_animation(&mut self, id: AnimationId) -> bool {
        let stopped = self
            .animations
            .stop(id, AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.after_animation_change();
        stopped
    }

    pub fn play_all_animations(&mut self) {
        self.animations
            .play_all_animations(AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.after_animation_change();
    }

    pub fn pause_all_animations(&mut self) {
        self.animations
            .pause_all_animations(AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.after_animation_change();
    }

    pub fn play(&mut self, clip: &str, time_scale: f32) -> bool {
        let played = self.animations.play(clip, time_scale);
        self.after_animation_change();
        played
    }

    pub fn pause_clip(&mut self, clip: &str) -> bool {
        let paused = self.animations.pause(clip);
        self.after_animation_change();
        paused
    }

    pub fn play_all(&mut self) {
        self.animations.play_all();
        self.after_animation_change();
    }

    pub fn pause_all(&mut self) {
        self.animations.pause_all();
        self.after_animation_change();
    }

    fn after_animation_change(&mut self) {
        if self.animations.take_activity_request() {
            self.activate();
        }
        self.forward_animation_events();
    }

    // === Picking and input ===

    /// Cast a ray through `ndc` against the visible model and the ground plane
    pub fn capture(&self, ndc: Vec2) -> CaptureResult {
        let ray = self.camera.ray_from_ndc(ndc);
        let mut hits = Vec::new();

        if let Some(model) = self.scene.model().filter(|_| self.scene.is_model_visible()) {
            let matrices = model.graph.world_matrices();
            for (id, node) in model.graph.iter() {
                let NodeKind::Mesh(mesh) = &node.kind else { continue };
                if !model.graph.is_visible(id) {
                    continue;
                }
                let world = matrices[id.index()];
                let reachable = mesh
                    .geometry
                    .bounds()
                    .is_some_and(|bounds| ray.intersect_aabb(&bounds.transformed(&world)).is_some());
                if !reachable {
                    continue;
                }
                let nearest = mesh
                    .geometry
                    .triangles()
                    .filter_map(|[a, b, c]| {
                        moller_trumbore_intersect(
                            &ray,
                            world.transform_point3(a),
                            world.transform_point3(b),
                            world.transform_point3(c),
                        )
                    })
                    .min_by(|x, y| x.t.total_cmp(&y.t));
                if let Some(hit) = nearest {
                    hits.push(Hit {
                        node: id,
                        distance: hit.t,
                        point: ray.at(hit.t),
                        normal: hit.normal,
                    });
                }
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let ground_point = ray
            .intersect_plane(&Plane::ground(Vec3::Y))
            .map(|t| ray.at(t));
        CaptureResult { ndc, hits, ground_point }
    }

    pub fn pointer_down(&mut self, button: PointerButton, position: Vec2) {
        self.pointer.down(button, position);
        self.activate();
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        if let Some(drag) = self.pointer.moved(position) {
            match drag.button {
                PointerButton::Primary => self.controls.rotate(drag.delta, self.viewport.height),
                PointerButton::Secondary | PointerButton::Middle => {
                    self.controls.pan(drag.delta, &self.camera, self.viewport.height)
                }
            }
        }
        self.activate();
    }

    pub fn pointer_up(&mut self, button: PointerButton, position: Vec2) {
        if let Some(at) = self.pointer.up(button, position) {
            if button == PointerButton::Primary {
                self.click(at);
            }
        }
        self.activate();
    }

    /// Positive steps dolly in
    pub fn wheel(&mut self, steps: f32) {
        self.controls.zoom(steps);
        self.activate();
    }

    pub fn key_down(&mut self, button: Button) {
        self.controls.key(button, &self.camera, self.viewport.height);
        self.activate();
    }

    /// Plugins see every click; an empty click on the ground walks there
    /// unless a plugin already turned it into an animation
    fn click(&mut self, position: Vec2) {
        let ndc = to_ndc(position, self.viewport.width, self.viewport.height);
        let capture = self.capture(ndc);
        self.with_plugins(|registry, ctx| registry.dispatch(Dispatch::Capture(&capture), ctx));
        let claimed = self
            .commands
            .iter()
            .any(|command| matches!(command, ViewerCommand::Animate(_) | ViewerCommand::RotateTo(_)));
        self.apply_commands();

        if claimed || !capture.hits.is_empty() || self.scene.model().is_none() {
            return;
        }
        if let Some(point) = capture.ground_point {
            if let Err(err) = self.walk_to(point) {
                log::warn!("walk rejected: {err}");
            }
        }
    }

    // === Teardown ===

    /// Release everything; later calls do nothing
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        log::info!("dispose");
        self.pause();
        self.animations
            .dispose(AnimationTargets::new(&mut self.camera, &mut self.controls, &mut self.scene));
        self.scene.take_model();
        self.pending.clear();
        self.walk = None;
        self.with_plugins(|registry, ctx| registry.dispose(ctx));
        self.commands.clear();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        self.emit(ViewerEvent::Disposed);
        self.events.clear();
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.dispose();
    }
}
