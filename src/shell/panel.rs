use egui::{Align2, Color32, FontId, Stroke};
use winit::window::Window;

use crate::animation::ViewDirection;
use crate::plugins::ViewCube;
use crate::viewer::Viewer;

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const HANDLE_RADIUS: f32 = 9.0;

/// Frames per second over a sliding one-second window
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    /// Count a frame; returns the new rate whenever it is recomputed
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += delta;
        if self.elapsed < FPS_UPDATE_INTERVAL {
            return None;
        }
        self.fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// What the user asked for in the panel this frame
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    Rotate(ViewDirection),
    ShowPlugins(String),
    HidePlugins(String),
    Wireframe(bool),
    ModelVisible(bool),
    Play(String),
    PauseClip(String),
    Background(u32, u32),
}

impl PanelAction {
    pub fn apply(self, viewer: &mut Viewer) {
        match self {
            PanelAction::Rotate(view) => {
                if let Err(err) = viewer.rotate_to(view) {
                    log::warn!("rotate to {view} failed: {err}");
                }
            }
            PanelAction::ShowPlugins(prefix) => viewer.show_plugins(&prefix),
            PanelAction::HidePlugins(prefix) => viewer.hide_plugins(&prefix),
            PanelAction::Wireframe(wireframe) => viewer.set_wireframe(wireframe),
            PanelAction::ModelVisible(true) => viewer.show(),
            PanelAction::ModelVisible(false) => viewer.hide(),
            PanelAction::Play(clip) => {
                viewer.play(&clip, 1.0);
            }
            PanelAction::PauseClip(clip) => {
                viewer.pause_clip(&clip);
            }
            PanelAction::Background(color1, color2) => viewer.update_background(color1, color2),
        }
    }
}

/// egui overlay: status readout, toggles and the view cube handles
pub struct Panel {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    fps: FpsCounter,
    helpers: bool,
    model_visible: bool,
}

impl Panel {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
        Self {
            ctx,
            state,
            renderer,
            fps: FpsCounter::default(),
            helpers: true,
            model_visible: true,
        }
    }

    /// Returns true when egui consumed the event
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn count_frame(&mut self, delta: f32) {
        if let Some(fps) = self.fps.tick(delta) {
            log::debug!("fps {fps:.1}");
        }
    }

    /// Lay out the panel for this frame
    pub fn run(&mut self, window: &Window, viewer: &Viewer) -> (PanelFrame<'_>, Vec<PanelAction>) {
        let mut actions = Vec::new();
        let fps = self.fps.fps();
        let helpers = &mut self.helpers;
        let model_visible = &mut self.model_visible;

        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("FPS")
                .title_bar(false)
                .resizable(false)
                .fixed_pos(egui::pos2(10.0, 10.0))
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{fps:.0}"))
                            .size(32.0)
                            .color(Color32::from_rgb(74, 158, 255)),
                    );
                    let status = if viewer.is_active() { "drawing" } else { "idle" };
                    ui.label(egui::RichText::new(status).size(12.0).color(Color32::GRAY));
                });

            egui::Window::new("Viewer")
                .anchor(Align2::LEFT_BOTTOM, [10.0, -10.0])
                .resizable(false)
                .default_open(false)
                .show(ctx, |ui| model_section(ui, viewer, helpers, model_visible, &mut actions));

            draw_view_cube(ctx, viewer);
        });

        self.state.handle_platform_output(window, full_output.platform_output);
        let pixels_per_point = full_output.pixels_per_point;
        let primitives = self.ctx.tessellate(full_output.shapes, pixels_per_point);
        let frame = PanelFrame {
            renderer: &mut self.renderer,
            primitives,
            textures: full_output.textures_delta,
            pixels_per_point,
        };
        (frame, actions)
    }
}

fn model_section(
    ui: &mut egui::Ui,
    viewer: &Viewer,
    helpers: &mut bool,
    model_visible: &mut bool,
    actions: &mut Vec<PanelAction>,
) {
    match viewer.model() {
        Some(model) => {
            ui.label(model.source.as_deref().unwrap_or("(unnamed)"));
            ui.label(format!(
                "{} meshes, {} lights, loaded {}",
                model.classification.meshes.len(),
                model.classification.lights.len(),
                model.loaded_at.format("%H:%M:%S")
            ));
        }
        None => {
            ui.label("No model");
        }
    }

    let mut wireframe = viewer.options().wireframe;
    if ui.checkbox(&mut wireframe, "Wireframe").changed() {
        actions.push(PanelAction::Wireframe(wireframe));
    }
    if ui.checkbox(model_visible, "Model").changed() {
        actions.push(PanelAction::ModelVisible(*model_visible));
    }
    if ui.checkbox(helpers, "Helpers").changed() {
        let prefix = "Helpers".to_string();
        actions.push(if *helpers {
            PanelAction::ShowPlugins(prefix)
        } else {
            PanelAction::HidePlugins(prefix)
        });
    }

    let colors = viewer.options().background.unwrap_or_default();
    let mut top = to_srgb(colors.color1);
    let mut bottom = to_srgb(colors.color2);
    ui.horizontal(|ui| {
        ui.label("Background");
        let changed = ui.color_edit_button_srgb(&mut top).changed();
        if ui.color_edit_button_srgb(&mut bottom).changed() || changed {
            actions.push(PanelAction::Background(from_srgb(top), from_srgb(bottom)));
        }
    });

    ui.collapsing("Views", |ui| {
        ui.horizontal_wrapped(|ui| {
            for view in ViewDirection::all() {
                if ui.small_button(view.name()).clicked() {
                    actions.push(PanelAction::Rotate(view));
                }
            }
        });
    });

    let clips = viewer.model().map(|model| model.clip_names.as_slice()).unwrap_or_default();
    if !clips.is_empty() {
        ui.collapsing("Clips", |ui| {
            let running = viewer.animations().running_actions();
            for clip in clips {
                let playing = running.iter().any(|name| name == clip);
                let label = if playing { format!("Pause {clip}") } else { format!("Play {clip}") };
                if ui.button(label).clicked() {
                    actions.push(if playing {
                        PanelAction::PauseClip(clip.clone())
                    } else {
                        PanelAction::Play(clip.clone())
                    });
                }
            }
        });
    }
}

fn to_srgb(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

fn from_srgb([r, g, b]: [u8; 3]) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

fn axis_color(axis: glam::Vec3) -> Color32 {
    let rgb = axis.abs() * 230.0;
    let color = Color32::from_rgb(rgb.x as u8 + 25, rgb.y as u8 + 25, rgb.z as u8 + 25);
    if axis.max_element() > 0.0 {
        color
    } else {
        color.gamma_multiply(0.45)
    }
}

fn draw_view_cube(ctx: &egui::Context, viewer: &Viewer) {
    let Some(cube) = viewer.plugin_as::<ViewCube>(ViewCube::NAME) else {
        return;
    };
    if !cube.is_visible() || cube.handles().is_empty() {
        return;
    }
    let scale = ctx.pixels_per_point();
    let to_points = |pixel: glam::Vec2| egui::pos2(pixel.x / scale, pixel.y / scale);
    let center = to_points(cube.center(viewer.viewport()));
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Foreground, egui::Id::new("view_cube")));

    for handle in cube.handles() {
        let position = to_points(handle.position);
        let color = axis_color(handle.axis);
        if handle.axis.max_element() > 0.0 {
            painter.line_segment([center, position], Stroke::new(2.0, color));
        }
        painter.circle_filled(position, HANDLE_RADIUS, color);
        if handle.axis.max_element() > 0.0 {
            let label = if handle.axis.x > 0.0 {
                "X"
            } else if handle.axis.y > 0.0 {
                "Y"
            } else {
                "Z"
            };
            painter.text(position, Align2::CENTER_CENTER, label, FontId::proportional(11.0), Color32::BLACK);
        }
    }
}

/// Tessellated panel output waiting to be painted
pub struct PanelFrame<'a> {
    renderer: &'a mut egui_wgpu::Renderer,
    primitives: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl PanelFrame<'_> {
    pub fn paint(
        self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
    ) {
        for (id, delta) in &self.textures.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: self.pixels_per_point,
        };
        self.renderer
            .update_buffers(device, queue, encoder, &self.primitives, &screen);

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            let mut pass = pass.forget_lifetime();
            self.renderer.render(&mut pass, &self.primitives, &screen);
        }

        for id in &self.textures.free {
            self.renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter_reports_once_per_interval() {
        let mut counter = FpsCounter::default();
        assert_eq!(counter.tick(0.25), None);
        assert_eq!(counter.tick(0.25), None);
        assert_eq!(counter.tick(0.5), Some(3.0));
        assert_eq!(counter.fps(), 3.0);
        assert_eq!(counter.tick(0.5), None);
    }

    #[test]
    fn test_hex_colour_round_trip() {
        assert_eq!(to_srgb(0x2f3640), [0x2f, 0x36, 0x40]);
        assert_eq!(from_srgb([0x0c, 0x0e, 0x12]), 0x0c0e12);
    }

    #[test]
    fn test_axis_colors_fade_for_negative_axes() {
        let positive = axis_color(glam::Vec3::X);
        let negative = axis_color(glam::Vec3::NEG_X);
        assert!(positive.r() > negative.r());
        assert_eq!(positive.g(), 25);
    }
}
