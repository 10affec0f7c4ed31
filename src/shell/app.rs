use std::sync::{Arc, Mutex};
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use super::gpu::GpuSurface;
use super::input::{key_to_button, mouse_to_pointer, scroll_steps};
use super::panel::Panel;
use super::scheduler::{FrameSlot, WindowScheduler};
use crate::config::ViewerOptions;
use crate::events::{EventKind, ViewerEvent};
use crate::loader::FileAssetLoader;
use crate::render::{SharedCanvas, WireframeRenderer};
use crate::viewer::Viewer;

const INITIAL_WINDOW_WIDTH: u32 = 1024;
const INITIAL_WINDOW_HEIGHT: u32 = 768;

/// Wakes the event loop from loader threads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    LoadProgress,
}

/// What to show once the window is up
#[derive(Debug, Clone, Default)]
pub struct Startup {
    pub model: Option<String>,
    pub object: Option<String>,
    pub environment: Option<String>,
    pub environment_background: bool,
    pub show_panel: bool,
}

struct Live {
    window: Arc<Window>,
    gpu: GpuSurface,
    panel: Panel,
    viewer: Viewer,
    canvas: SharedCanvas,
    slot: FrameSlot,
    show_panel: bool,
}

pub struct App {
    options: ViewerOptions,
    startup: Startup,
    proxy: EventLoopProxy<UserEvent>,
    live: Option<Live>,
    cursor: Vec2,
    last_frame: Instant,
}

impl App {
    pub fn new(options: ViewerOptions, startup: Startup, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            options,
            startup,
            proxy,
            live: None,
            cursor: Vec2::ZERO,
            last_frame: Instant::now(),
        }
    }

    fn create(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Live> {
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title("Model Viewer")
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )?,
        );
        let size = window.inner_size();
        let gpu = pollster::block_on(GpuSurface::new(window.clone()))?;
        let panel = Panel::new(&window, gpu.device(), gpu.format());

        let proxy = Mutex::new(self.proxy.clone());
        let waker = Arc::new(move || {
            if let Ok(proxy) = proxy.lock() {
                // Closed loop means shutdown, nothing left to wake
                let _ = proxy.send_event(UserEvent::LoadProgress);
            }
        });

        let canvas = SharedCanvas::new(size.width.max(1), size.height.max(1));
        let slot = FrameSlot::new();
        let mut viewer = Viewer::new(
            self.options.clone(),
            Box::new(WireframeRenderer::new(canvas.clone())),
            Box::new(FileAssetLoader::new().with_waker(waker)),
            Box::new(WindowScheduler::new(window.clone(), slot.clone())),
        )?;
        viewer.on(EventKind::Progress, |event| {
            if let ViewerEvent::Progress { url, loaded, total } = event {
                match total {
                    Some(total) => log::debug!("{url}: {loaded}/{total} bytes"),
                    None => log::debug!("{url}: {loaded} bytes"),
                }
            }
        });
        viewer.on(EventKind::Error, |event| {
            if let ViewerEvent::Error { message, .. } = event {
                eprintln!("{message}");
            }
        });
        viewer.resize(size.width, size.height);

        if let Some(url) = &self.startup.model {
            viewer.load_url(url)?;
        }
        if let Some(url) = &self.startup.object {
            viewer.load_object(url)?;
        }
        if let Some(url) = &self.startup.environment {
            viewer.update_environment(url, self.startup.environment_background)?;
        }

        Ok(Live {
            window,
            gpu,
            panel,
            viewer,
            canvas,
            slot,
            show_panel: self.startup.show_panel,
        })
    }
}

impl Live {
    fn redraw(&mut self, delta: f32) {
        if self.slot.take().is_some() {
            self.viewer.frame();
            self.panel.count_frame(delta);
        }
        if self.canvas.take_dirty() {
            self.gpu.upload(&self.canvas.borrow());
        }

        let (frame, actions) = if self.show_panel {
            let (frame, actions) = self.panel.run(&self.window, &self.viewer);
            (Some(frame), actions)
        } else {
            (None, Vec::new())
        };
        match self.gpu.present(frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(err) => log::error!("present failed: {err}"),
        }
        if !actions.is_empty() {
            for action in actions {
                action.apply(&mut self.viewer);
            }
            self.window.request_redraw();
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.live.is_some() {
            return;
        }
        match self.create(event_loop) {
            Ok(live) => self.live = Some(live),
            Err(err) => {
                log::error!("failed to start viewer: {err:#}");
                event_loop.exit();
            }
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        let Some(live) = self.live.as_mut() else { return };
        match event {
            UserEvent::LoadProgress => {
                live.viewer.poll_loads();
                live.window.request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(live) = self.live.as_mut() else { return };

        if live.show_panel && live.panel.on_window_event(&live.window, &event) {
            live.window.request_redraw();
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                live.viewer.dispose();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => {
                if let Some(button) = key_to_button(code) {
                    live.viewer.key_down(button);
                }
            }
            WindowEvent::Resized(size) => {
                live.gpu.resize(size.width, size.height);
                live.viewer.resize(size.width, size.height);
            }
            WindowEvent::Occluded(occluded) => live.viewer.set_visible(!occluded),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                live.viewer.pointer_move(self.cursor);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = mouse_to_pointer(button) {
                    match state {
                        ElementState::Pressed => live.viewer.pointer_down(button, self.cursor),
                        ElementState::Released => live.viewer.pointer_up(button, self.cursor),
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => live.viewer.wheel(scroll_steps(delta)),
            WindowEvent::DroppedFile(path) => {
                let url = path.to_string_lossy().into_owned();
                if let Err(err) = live.viewer.load_url(&url) {
                    eprintln!("{err}");
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;
                live.redraw(delta);
            }
            _ => {}
        }
    }
}

/// Open a window and run until it closes
pub fn run(options: ViewerOptions, startup: Startup) -> anyhow::Result<()> {
    let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
    let mut app = App::new(options, startup, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;
    Ok(())
}
