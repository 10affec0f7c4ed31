mod common;

use common::{bare_options, cube, Harness};
use glam::{Vec2, Vec3};
use model_viewer::core::PointerButton;
use model_viewer::loader::LoadedScene;
use model_viewer::scene::SceneGraph;
use model_viewer::scene::{
    CameraNode, ColorSpace, Geometry, Material, Mesh, Node, NodeKind, TextureRef, Transform,
};
use model_viewer::{EventKind, LoadError, ViewerError, ViewerEvent, ViewerOptions};

#[cfg(test)]
mod viewer_tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn loaded(size: f32) -> LoadedScene {
        LoadedScene {
            graph: cube(size),
            ..LoadedScene::default()
        }
    }

    #[test]
    fn test_cube_is_framed_in_front() {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();

        let camera = h.viewer.camera();
        assert_abs_diff_eq!(camera.position.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.position.y, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.position.z, 6.0, epsilon = 1e-5);
        assert_eq!(camera.up, Vec3::Y);
        assert_eq!(h.viewer.controls().target, Vec3::ZERO);
        assert!(h.viewer.controls().enabled);
    }

    #[test]
    fn test_configured_camera_position_wins() {
        let mut options = bare_options();
        options.camera.position = Some([1.0, 2.0, 3.0]);
        let mut h = Harness::new(options);
        h.viewer.update(cube(2.0), Vec::new()).unwrap();

        assert_eq!(h.viewer.camera().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(h.viewer.camera().target(), Vec3::ZERO);
    }

    #[test]
    fn test_load_reports_progress_then_loaded() {
        let mut h = Harness::bare();
        let events = h.record(&[EventKind::Progress, EventKind::Load, EventKind::Update]);

        let generation = h.viewer.load_url("models/duck.glb").unwrap();
        h.senders.scenes.borrow()[0].progress(10, Some(100));
        h.viewer.poll_loads();
        assert!(h.viewer.model().is_none());

        h.senders.finish_scene(0, Ok(loaded(2.0)));
        assert_eq!(h.viewer.poll_loads(), 1);

        assert_eq!(
            *events.borrow(),
            vec![
                ViewerEvent::Progress {
                    url: "models/duck.glb".into(),
                    loaded: 10,
                    total: Some(100),
                },
                ViewerEvent::Updated,
                ViewerEvent::Loaded {
                    url: "models/duck.glb".into(),
                    generation,
                },
            ]
        );
        assert_eq!(h.viewer.model().unwrap().source.as_deref(), Some("models/duck.glb"));
        assert_eq!(h.viewer.pending_loads(), 0);
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let mut h = Harness::bare();
        let errors = h.record(&[EventKind::Error]);

        h.viewer.load_url("a.glb").unwrap();
        h.senders.finish_scene(0, Ok(loaded(2.0)));
        h.viewer.poll_loads();

        h.viewer.load_url("b.glb").unwrap();
        h.senders
            .finish_scene(1, Err(LoadError::malformed("b.glb", "bad header")));
        h.viewer.poll_loads();

        assert_eq!(
            *errors.borrow(),
            vec![ViewerEvent::Error {
                url: "b.glb".into(),
                message: "Unable to parse file content. Verify that this file is valid. Error: bad header"
                    .into(),
            }]
        );
        assert_eq!(h.viewer.model().unwrap().source.as_deref(), Some("a.glb"));
    }

    #[test]
    fn test_superseded_progress_is_silent() {
        let mut h = Harness::bare();
        let events = h.record(&[EventKind::Progress]);

        h.viewer.load_url("a.glb").unwrap();
        h.viewer.load_url("b.glb").unwrap();
        h.senders.scenes.borrow()[0].progress(5, None);
        h.viewer.poll_loads();

        assert!(events.borrow().is_empty());
        assert_eq!(h.viewer.pending_loads(), 2);
    }

    #[test]
    fn test_extension_check_ignores_case_and_query() {
        let mut h = Harness::bare();
        assert!(h.viewer.load_url("duck.GLB?raw=1").is_ok());
        assert!(h.viewer.load_url("scene.obj").is_ok());
        assert!(matches!(
            h.viewer.load_url("scene.fbx?x=1"),
            Err(ViewerError::UnsupportedExtension { .. })
        ));
        assert!(matches!(
            h.viewer.load_object("notes.txt"),
            Err(ViewerError::UnsupportedExtension { .. })
        ));
        assert_eq!(h.senders.scenes.borrow().len(), 2);
    }

    #[test]
    fn test_object_is_added_to_current_model() {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();

        h.viewer.load_object("extra.obj").unwrap();
        h.senders.objects.borrow_mut()[0].finish(Ok(cube(1.0)));
        h.viewer.poll_loads();

        let model = h.viewer.model().unwrap();
        assert_eq!(model.classification.meshes.len(), 2);
        assert_eq!(model.source, None);
    }

    #[test]
    fn test_added_object_is_normalized() {
        let mut options = bare_options();
        options.wireframe = true;
        let mut h = Harness::new(options);
        h.viewer.update(cube(2.0), Vec::new()).unwrap();

        let mut extra = SceneGraph::new();
        let mut glass = Material::standard(Vec3::new(0.2, 0.4, 0.6));
        glass.transparent = true;
        extra.add(Node::mesh("glass", Mesh::new(Geometry::cuboid(Vec3::ONE), glass)));
        extra.add(Node::new(
            "",
            NodeKind::Camera(CameraNode {
                fov_degrees: 50.0,
                near: 0.1,
                far: 100.0,
            }),
        ));
        h.viewer.load_object("extra.glb").unwrap();
        h.senders.objects.borrow_mut()[0].finish(Ok(extra));
        h.viewer.poll_loads();

        let model = h.viewer.model().unwrap();
        let wireframes: Vec<bool> = model
            .graph
            .iter()
            .filter_map(|(_, node)| node.as_mesh())
            .map(|mesh| mesh.material.wireframe)
            .collect();
        assert_eq!(wireframes, vec![true, true]);

        let glass = model.graph.find_by_name("glass").unwrap();
        let mesh = model.graph.get(glass).unwrap().as_mesh().unwrap();
        assert!(!mesh.material.depth_write);
        assert_eq!(mesh.material.emissive, Vec3::new(0.2, 0.4, 0.6));
        assert!(model.graph.find_by_name("Camera_1").is_some());
    }

    #[test]
    fn test_added_object_grows_bounds() {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();

        let mut far = cube(2.0);
        let root = far.roots()[0];
        if let Some(node) = far.get_mut(root) {
            node.transform = Transform::from_translation(Vec3::new(20.0, 0.0, 0.0));
        }
        h.viewer.load_object("far.obj").unwrap();
        h.senders.objects.borrow_mut()[0].finish(Ok(far));
        h.viewer.poll_loads();

        let bounds = h.viewer.model().unwrap().bounds;
        assert_eq!(bounds.aabb.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.aabb.max, Vec3::new(21.0, 1.0, 1.0));
        assert_eq!(bounds.center, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.size, Vec3::new(22.0, 2.0, 2.0));
    }

    #[test]
    fn test_color_spaces_reach_renderer_and_textures() {
        let mut h = Harness::bare();
        assert_eq!(h.renders.borrow().output_spaces, vec![ColorSpace::Srgb]);

        let mut graph = cube(2.0);
        let mut painted = Material::standard(Vec3::ONE);
        painted.map = Some(TextureRef {
            name: "albedo".into(),
            color_space: ColorSpace::Srgb,
        });
        graph.add(Node::mesh("painted", Mesh::new(Geometry::cuboid(Vec3::ONE), painted)));
        h.viewer.update(graph, Vec::new()).unwrap();

        h.viewer.set_texture_color_space(ColorSpace::Linear);
        h.viewer.set_output_color_space(ColorSpace::Linear);

        let model = h.viewer.model().unwrap();
        let painted = model.graph.find_by_name("painted").unwrap();
        let mesh = model.graph.get(painted).unwrap().as_mesh().unwrap();
        assert_eq!(mesh.material.map.as_ref().map(|t| t.color_space), Some(ColorSpace::Linear));
        assert_eq!(mesh.material.emissive_map.as_ref().map(|t| t.color_space), Some(ColorSpace::Linear));
        assert_eq!(h.viewer.options().output_color_space, ColorSpace::Linear);
        assert_eq!(
            h.renders.borrow().output_spaces,
            vec![ColorSpace::Srgb, ColorSpace::Linear]
        );
    }

    #[test]
    fn test_materials_and_cameras_are_normalized() {
        let mut options = bare_options();
        options.wireframe = true;
        let mut h = Harness::new(options);

        let mut graph = cube(2.0);
        let mut glass = Material::standard(Vec3::new(0.2, 0.4, 0.6));
        glass.transparent = true;
        graph.add(Node::mesh("glass", Mesh::new(Geometry::cuboid(Vec3::ONE), glass)));
        graph.add(Node::new(
            "",
            NodeKind::Camera(CameraNode {
                fov_degrees: 50.0,
                near: 0.1,
                far: 100.0,
            }),
        ));
        h.viewer.update(graph, Vec::new()).unwrap();

        let model = h.viewer.model().unwrap();
        let glass = model.graph.find_by_name("glass").unwrap();
        let NodeKind::Mesh(mesh) = &model.graph.get(glass).unwrap().kind else {
            panic!("glass should stay a mesh");
        };
        assert!(!mesh.material.depth_write);
        assert!(mesh.material.wireframe);
        assert_eq!(mesh.material.emissive, Vec3::new(0.2, 0.4, 0.6));
        assert!(model.graph.find_by_name("Camera_1").is_some());
        assert_eq!(model.classification.cameras.len(), 1);
    }

    #[test]
    fn test_idle_viewer_wakes_on_pointer() {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();
        h.viewer.resize(200, 200);

        assert!(h.step(0.5));
        assert!(h.step(5.0));
        assert!(!h.viewer.is_active());
        let drawn = h.frames_drawn();

        assert!(h.step(0.1));
        assert_eq!(h.frames_drawn(), drawn);

        h.viewer.pointer_move(Vec2::new(10.0, 10.0));
        assert!(h.viewer.is_active());
        assert!(h.step(0.1));
        assert_eq!(h.frames_drawn(), drawn + 1);
    }

    #[test]
    fn test_pause_cancels_and_visibility_resumes() {
        let mut h = Harness::bare();
        let events = h.record(&[EventKind::Start, EventKind::Pause]);
        h.viewer.update(cube(2.0), Vec::new()).unwrap();
        assert!(h.scheduler.has_pending());

        h.viewer.set_visible(false);
        assert!(!h.viewer.is_running());
        assert!(!h.viewer.is_active());
        assert!(!h.scheduler.has_pending());
        assert_eq!(h.scheduler.cancellations(), 1);

        h.viewer.set_visible(true);
        assert!(h.viewer.is_running());
        assert!(h.viewer.is_active());
        assert!(h.scheduler.has_pending());
        assert_eq!(
            *events.borrow(),
            vec![ViewerEvent::Started, ViewerEvent::Paused, ViewerEvent::Started]
        );
    }

    #[test]
    fn test_start_needs_a_model() {
        let mut h = Harness::bare();
        h.viewer.start();
        assert!(!h.viewer.is_running());
        assert!(!h.scheduler.has_pending());
    }

    #[test]
    fn test_resize_ignores_empty_sizes() {
        let mut h = Harness::bare();
        let events = h.record(&[EventKind::Resize]);

        h.viewer.resize(0, 240);
        h.viewer.resize(320, 240);

        assert_eq!(h.renders.borrow().sizes, vec![(320, 240)]);
        assert_eq!(h.viewer.viewport().width, 320);
        assert_eq!(h.viewer.viewport().height, 240);
        assert_eq!(
            *events.borrow(),
            vec![ViewerEvent::Resized {
                width: 320,
                height: 240
            }]
        );
    }

    #[test]
    fn test_ground_click_walks_and_mesh_click_does_not() {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();
        h.viewer.resize(200, 200);

        h.viewer.pointer_down(PointerButton::Primary, Vec2::new(100.0, 100.0));
        h.viewer.pointer_up(PointerButton::Primary, Vec2::new(100.0, 100.0));
        assert!(h.viewer.walking().is_none());

        h.viewer.camera_mut().position = Vec3::new(0.0, 4.0, 6.0);
        h.viewer.camera_mut().look_at(Vec3::ZERO);
        h.viewer.pointer_down(PointerButton::Primary, Vec2::new(100.0, 190.0));
        h.viewer.pointer_up(PointerButton::Primary, Vec2::new(100.0, 190.0));
        assert!(h.viewer.walking().is_some());
    }

    #[test]
    fn test_drag_does_not_click() {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();
        h.viewer.resize(200, 200);
        h.viewer.camera_mut().position = Vec3::new(0.0, 4.0, 6.0);
        h.viewer.camera_mut().look_at(Vec3::ZERO);

        h.viewer.pointer_down(PointerButton::Primary, Vec2::new(100.0, 190.0));
        h.viewer.pointer_move(Vec2::new(140.0, 190.0));
        h.viewer.pointer_up(PointerButton::Primary, Vec2::new(140.0, 190.0));
        assert!(h.viewer.walking().is_none());
    }

    #[test]
    fn test_dispose_runs_once() {
        let mut h = Harness::new(ViewerOptions::default());
        let disposed = h.record(&[EventKind::Dispose]);
        h.viewer.update(cube(2.0), Vec::new()).unwrap();
        h.viewer.load_url("late.glb").unwrap();

        h.viewer.dispose();
        h.viewer.dispose();

        assert_eq!(*disposed.borrow(), vec![ViewerEvent::Disposed]);
        assert_eq!(h.renders.borrow().disposed, 1);
        assert!(h.viewer.plugins().is_empty());
        assert_eq!(h.viewer.pending_loads(), 0);
        assert!(matches!(h.viewer.load_url("again.glb"), Err(ViewerError::Disposed)));
        assert!(matches!(
            h.viewer.update(cube(1.0), Vec::new()),
            Err(ViewerError::Disposed)
        ));
    }
}
