use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};

use crate::camera::PerspectiveCamera;
use crate::scene::{Background, ColorSpace, NodeKind, Scene, SceneGraph};
use crate::traits::Renderer;

use super::canvas::{Canvas, DrawOp, Rgba};

/// Segments whose projected endpoints land this far outside the view are skipped
const NDC_LIMIT: f32 = 8.0;

/// Canvas shared between the renderer and whatever presents it
#[derive(Debug, Clone)]
pub struct SharedCanvas {
    canvas: Rc<RefCell<Canvas>>,
    dirty: Rc<Cell<bool>>,
}

impl SharedCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Rc::new(RefCell::new(Canvas::new(width, height))),
            dirty: Rc::new(Cell::new(false)),
        }
    }

    pub fn borrow(&self) -> Ref<'_, Canvas> {
        self.canvas.borrow()
    }

    fn borrow_mut(&self) -> RefMut<'_, Canvas> {
        self.canvas.borrow_mut()
    }

    /// True once after each new frame
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }
}

/// Software renderer that draws mesh edges and helper lines over the background
#[derive(Debug)]
pub struct WireframeRenderer {
    target: SharedCanvas,
    output: ColorSpace,
    frames: u64,
    disposed: bool,
}

impl WireframeRenderer {
    pub fn new(target: SharedCanvas) -> Self {
        Self {
            target,
            output: ColorSpace::default(),
            frames: 0,
            disposed: false,
        }
    }

    pub fn target(&self) -> &SharedCanvas {
        &self.target
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn output_color_space(&self) -> ColorSpace {
        self.output
    }
}

impl Renderer for WireframeRenderer {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        if self.disposed {
            return;
        }
        {
            let mut canvas = self.target.borrow_mut();
            canvas.apply(background_op(&scene.background, self.output));
            let projector = Projector::new(camera, canvas.dimensions(), self.output);
            if scene.is_model_visible() {
                if let Some(model) = scene.model() {
                    draw_graph(&mut canvas, &projector, &model.graph);
                }
            }
            draw_graph(&mut canvas, &projector, scene.overlays());
        }
        self.frames += 1;
        self.target.dirty.set(true);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if !self.disposed {
            self.target.borrow_mut().resize(width, height);
        }
    }

    fn set_output_color_space(&mut self, space: ColorSpace) {
        self.output = space;
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.target.borrow_mut().release();
            self.disposed = true;
        }
    }
}

fn background_op(background: &Background, space: ColorSpace) -> DrawOp {
    match background {
        Background::Color(color) => DrawOp::Clear(Rgba::encode(*color, space)),
        Background::Gradient { top, bottom } => DrawOp::Gradient {
            top: Rgba::encode(*top, space),
            bottom: Rgba::encode(*bottom, space),
        },
        Background::Environment(texture) => DrawOp::Clear(Rgba::encode(texture.average_color(), space)),
    }
}

struct Projector {
    view_projection: Mat4,
    near: f32,
    size: Vec2,
    output: ColorSpace,
}

impl Projector {
    fn new(camera: &PerspectiveCamera, (width, height): (u32, u32), output: ColorSpace) -> Self {
        Self {
            view_projection: camera.view_projection(),
            near: camera.near,
            size: Vec2::new(width as f32, height as f32),
            output,
        }
    }

    fn color(&self, color: Vec3) -> Rgba {
        Rgba::encode(color, self.output)
    }

    /// Pixel position of a world point, `None` behind the camera or far off screen
    fn to_pixel(&self, world: Vec3) -> Option<(i32, i32)> {
        let clip = self.view_projection * world.extend(1.0);
        if clip.w <= self.near * 0.5 {
            return None;
        }
        let ndc = Vec2::new(clip.x, clip.y) / clip.w;
        if ndc.abs().max_element() > NDC_LIMIT {
            return None;
        }
        let x = (ndc.x + 1.0) * 0.5 * self.size.x;
        let y = (1.0 - ndc.y) * 0.5 * self.size.y;
        Some((x.round() as i32, y.round() as i32))
    }

    fn segment(&self, a: Vec3, b: Vec3, width: u32, color: Rgba) -> Option<DrawOp> {
        let (x1, y1) = self.to_pixel(a)?;
        let (x2, y2) = self.to_pixel(b)?;
        Some(DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        })
    }
}

fn draw_graph(canvas: &mut Canvas, projector: &Projector, graph: &SceneGraph) {
    let matrices = graph.world_matrices();
    for (id, node) in graph.iter() {
        if !graph.is_visible(id) {
            continue;
        }
        let world = matrices[id.index()];
        match &node.kind {
            NodeKind::Mesh(mesh) => {
                let color = projector.color(mesh.material.color);
                for [a, b, c] in mesh.geometry.triangles() {
                    let (a, b, c) = (
                        world.transform_point3(a),
                        world.transform_point3(b),
                        world.transform_point3(c),
                    );
                    for (from, to) in [(a, b), (b, c), (c, a)] {
                        if let Some(op) = projector.segment(from, to, 1, color) {
                            canvas.apply(op);
                        }
                    }
                }
            }
            NodeKind::Lines(lines) => {
                let color = projector.color(lines.color);
                for [from, to] in &lines.segments {
                    let segment = projector.segment(
                        world.transform_point3(*from),
                        world.transform_point3(*to),
                        lines.width,
                        color,
                    );
                    if let Some(op) = segment {
                        canvas.apply(op);
                    }
                }
            }
            NodeKind::Group | NodeKind::Light(_) | NodeKind::Camera(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{LineSet, Node};

    fn camera() -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::default();
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn draws_background_and_overlay_lines() {
        let target = SharedCanvas::new(64, 64);
        let mut renderer = WireframeRenderer::new(target.clone());
        let mut scene = Scene::new();
        scene.background = Background::Color(Vec3::ZERO);
        scene.add_overlay(Node::lines(
            "axis",
            LineSet::new(vec![[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]], Vec3::X),
        ));

        renderer.render(&scene, &camera());
        assert!(target.take_dirty());
        assert!(!target.take_dirty());

        let canvas = target.borrow();
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::new(0, 0, 0, 255)));
        assert_eq!(canvas.pixel(32, 32), Some(Rgba::new(255, 0, 0, 255)));
    }

    #[test]
    fn hidden_overlays_are_skipped() {
        let target = SharedCanvas::new(32, 32);
        let mut renderer = WireframeRenderer::new(target.clone());
        let mut scene = Scene::new();
        scene.background = Background::Color(Vec3::ZERO);
        let id = scene.add_overlay(Node::lines(
            "axis",
            LineSet::new(vec![[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]], Vec3::X),
        ));
        scene.set_overlay_visible(id, false);

        renderer.render(&scene, &camera());
        assert_eq!(target.borrow().pixel(16, 16), Some(Rgba::new(0, 0, 0, 255)));
    }

    #[test]
    fn output_color_space_controls_encoding() {
        let target = SharedCanvas::new(8, 8);
        let mut renderer = WireframeRenderer::new(target.clone());
        let mut scene = Scene::new();
        scene.background = Background::Color(Vec3::splat(0.5));

        renderer.render(&scene, &camera());
        assert_eq!(target.borrow().pixel(0, 0), Some(Rgba::new(188, 188, 188, 255)));

        renderer.set_output_color_space(ColorSpace::Linear);
        renderer.render(&scene, &camera());
        assert_eq!(target.borrow().pixel(0, 0), Some(Rgba::new(128, 128, 128, 255)));
    }

    #[test]
    fn line_width_is_drawn() {
        let target = SharedCanvas::new(64, 64);
        let mut renderer = WireframeRenderer::new(target.clone());
        let mut scene = Scene::new();
        scene.background = Background::Color(Vec3::ZERO);
        scene.add_overlay(Node::lines(
            "axis",
            LineSet::new(vec![[Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]], Vec3::X).with_width(3),
        ));

        renderer.render(&scene, &camera());
        let canvas = target.borrow();
        assert_eq!(canvas.pixel(32, 31), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(canvas.pixel(32, 33), Some(Rgba::new(255, 0, 0, 255)));
    }

    #[test]
    fn dispose_releases_and_stops_drawing() {
        let target = SharedCanvas::new(8, 8);
        let mut renderer = WireframeRenderer::new(target.clone());
        renderer.dispose();
        renderer.dispose();
        renderer.render(&Scene::new(), &camera());
        assert!(renderer.is_disposed());
        assert_eq!(renderer.frames(), 0);
        assert_eq!(target.borrow().dimensions(), (0, 0));
    }
}
