use std::any::Any;

use anyhow::Result;
use glam::{Vec2, Vec3};

use crate::animation::ViewDirection;
use crate::camera::PerspectiveCamera;
use crate::plugin::{CaptureResult, Plugin, PluginContext, SceneData, ViewerCommand, Viewport};

/// Axis ends of the gizmo and the view a click on each one requests
const AXIS_VIEWS: [(Vec3, ViewDirection); 6] = [
    (Vec3::X, ViewDirection::Right),
    (Vec3::NEG_X, ViewDirection::Left),
    (Vec3::Y, ViewDirection::Top),
    (Vec3::NEG_Y, ViewDirection::Bottom),
    (Vec3::Z, ViewDirection::Front),
    (Vec3::NEG_Z, ViewDirection::Back),
];

/// One projected axis end of the gizmo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisHandle {
    pub view: ViewDirection,
    pub axis: Vec3,
    /// Pixel position in the viewport
    pub position: Vec2,
    /// Positive when the axis points toward the viewer
    pub depth: f32,
}

/// Orientation gizmo in the top-right corner of the viewport
#[derive(Debug)]
pub struct ViewCube {
    /// Edge of the square gizmo area in pixels
    pub size: f32,
    /// Clicks farther than this from every handle are ignored
    pub pick_radius: f32,
    handles: Vec<AxisHandle>,
    visible: bool,
}

impl Default for ViewCube {
    fn default() -> Self {
        Self {
            size: 150.0,
            pick_radius: 24.0,
            handles: Vec::new(),
            visible: true,
        }
    }
}

impl ViewCube {
    pub const NAME: &'static str = "Helpers.ViewCube";

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Handles as of the last rendered frame, back to front
    pub fn handles(&self) -> &[AxisHandle] {
        &self.handles
    }

    /// Gizmo centre in viewport pixels
    pub fn center(&self, viewport: Viewport) -> Vec2 {
        Vec2::new(viewport.width as f32 - self.size / 2.0, self.size / 2.0)
    }

    pub fn contains(&self, viewport: Viewport, pixel: Vec2) -> bool {
        let min = Vec2::new(viewport.width as f32 - self.size, 0.0);
        pixel.cmpge(min).all() && pixel.x <= viewport.width as f32 && pixel.y <= self.size
    }

    /// Project the six axis ends with the camera's rotation
    pub fn layout(&self, camera: &PerspectiveCamera, viewport: Viewport) -> Vec<AxisHandle> {
        let view = camera.view_matrix();
        let center = self.center(viewport);
        let radius = self.size * 0.4;
        let mut handles: Vec<AxisHandle> = AXIS_VIEWS
            .iter()
            .map(|&(axis, direction)| {
                let v = view.transform_vector3(axis);
                AxisHandle {
                    view: direction,
                    axis,
                    position: center + Vec2::new(v.x, -v.y) * radius,
                    depth: v.z,
                }
            })
            .collect();
        handles.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        handles
    }

    /// Closest handle to a click, front-most on ties
    pub fn pick(&self, camera: &PerspectiveCamera, viewport: Viewport, pixel: Vec2) -> Option<ViewDirection> {
        if !self.contains(viewport, pixel) {
            return None;
        }
        self.layout(camera, viewport)
            .into_iter()
            .map(|h| (h.position.distance(pixel), -h.depth, h.view))
            .filter(|(distance, _, _)| *distance <= self.pick_radius)
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)))
            .map(|(_, _, view)| view)
    }
}

impl Plugin for ViewCube {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut PluginContext<'_>, _data: &SceneData) -> Result<()> {
        self.handles = self.layout(ctx.camera, ctx.viewport);
        Ok(())
    }

    fn render(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        if self.visible {
            self.handles = self.layout(ctx.camera, ctx.viewport);
        }
        Ok(())
    }

    fn show(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = false;
        self.handles.clear();
        Ok(())
    }

    fn capture(&mut self, ctx: &mut PluginContext<'_>, capture: &CaptureResult) -> Result<()> {
        if !self.visible {
            return Ok(());
        }
        let viewport = ctx.viewport;
        let pixel = Vec2::new(
            (capture.ndc.x + 1.0) / 2.0 * viewport.width as f32,
            (1.0 - capture.ndc.y) / 2.0 * viewport.height as f32,
        );
        if let Some(view) = self.pick(ctx.camera, viewport, pixel) {
            log::debug!("[plugin:{}] rotate to {view}", Self::NAME);
            ctx.request(ViewerCommand::RotateTo(view));
        }
        Ok(())
    }

    fn dispose(self: Box<Self>, _ctx: &mut PluginContext<'_>) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::Fixture;

    fn ndc_of(pixel: Vec2, viewport: Viewport) -> Vec2 {
        Vec2::new(
            pixel.x / viewport.width as f32 * 2.0 - 1.0,
            1.0 - pixel.y / viewport.height as f32 * 2.0,
        )
    }

    #[test]
    fn front_view_layout() {
        let fx = Fixture::new();
        let cube = ViewCube::default();
        let handles = cube.layout(&fx.camera, fx.viewport);
        let center = cube.center(fx.viewport);

        let top = handles.iter().find(|h| h.view == ViewDirection::Top).unwrap();
        assert!((top.position - (center + Vec2::new(0.0, -60.0))).length() < 1e-3);
        // +Z points at a camera sitting on +Z, so it is drawn last
        assert_eq!(handles.last().map(|h| h.view), Some(ViewDirection::Front));
    }

    #[test]
    fn click_on_axis_end_requests_rotation() {
        let mut fx = Fixture::new();
        let mut cube = ViewCube::default();
        let right = cube.center(fx.viewport) + Vec2::new(60.0, 0.0);
        let capture = CaptureResult {
            ndc: ndc_of(right, fx.viewport),
            ..CaptureResult::default()
        };

        cube.capture(&mut fx.ctx(), &capture).unwrap();
        assert!(matches!(
            fx.commands.as_slice(),
            [ViewerCommand::RotateTo(ViewDirection::Right)]
        ));
    }

    #[test]
    fn clicks_outside_or_hidden_are_ignored() {
        let mut fx = Fixture::new();
        let mut cube = ViewCube::default();
        let capture = CaptureResult::default();
        cube.capture(&mut fx.ctx(), &capture).unwrap();
        assert!(fx.commands.is_empty());

        cube.hide(&mut fx.ctx()).unwrap();
        let top = CaptureResult {
            ndc: ndc_of(cube.center(fx.viewport) + Vec2::new(0.0, -60.0), fx.viewport),
            ..CaptureResult::default()
        };
        cube.capture(&mut fx.ctx(), &top).unwrap();
        assert!(fx.commands.is_empty());
    }
}
