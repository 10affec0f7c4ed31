mod common;

use common::{cube, Harness};
use glam::Vec3;
use model_viewer::animation::{AnimationEvent, Easing, RotateGoal, RotateOptions, ViewDirection};
use model_viewer::{EventKind, ViewerEvent};

#[cfg(test)]
mod animation_tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn loaded() -> Harness {
        let mut h = Harness::bare();
        h.viewer.update(cube(2.0), Vec::new()).unwrap();
        h.viewer.resize(200, 200);
        h
    }

    fn animation_events(events: &[ViewerEvent]) -> Vec<AnimationEvent> {
        events
            .iter()
            .filter_map(|event| match event {
                ViewerEvent::Animation(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    fn linear(duration_ms: f32, auto_start: bool) -> RotateOptions {
        RotateOptions {
            duration_ms,
            easing: Easing::Linear,
            auto_start,
        }
    }

    #[test]
    fn test_rotate_to_top_tweens_and_locks_controls() {
        let mut h = loaded();
        let events = h.record(&[EventKind::Animation]);

        let outcome = h
            .viewer
            .rotate_with(RotateGoal::View(ViewDirection::Top), linear(1000.0, true))
            .unwrap();
        assert!(!outcome.is_declined());
        assert!(!h.viewer.controls().enabled);

        let mut enabled = Vec::new();
        for step in 1..=15 {
            h.step(0.1);
            let running = h.viewer.animations().animations().count() > 0;
            let released = h.viewer.controls().enabled;
            if running {
                assert!(!released, "controls released while rotating at step {step}");
            }
            if step == 5 {
                let position = h.viewer.camera().position;
                assert_abs_diff_eq!(position.x, 0.0, epsilon = 1e-3);
                assert_abs_diff_eq!(position.y, 3.0, epsilon = 1e-3);
                assert_abs_diff_eq!(position.z, 3.0, epsilon = 1e-3);
            }
            enabled.push(released);
        }

        assert!(!enabled[0]);
        let releases = enabled.windows(2).filter(|pair| !pair[0] && pair[1]).count();
        assert_eq!(releases, 1);
        let position = h.viewer.camera().position;
        assert_abs_diff_eq!(position.y, 6.0, epsilon = 1e-3);
        assert_abs_diff_eq!(position.z, 0.0, epsilon = 1e-3);
        assert!(h.viewer.controls().enabled);
        assert_eq!(h.viewer.animations().animations().count(), 0);

        let completed = animation_events(&events.borrow())
            .into_iter()
            .filter(|event| matches!(event, AnimationEvent::Completed { .. }))
            .count();
        assert_eq!(completed, 1);
    }

    #[test]
    fn test_rotate_to_current_view_declines() {
        let mut h = loaded();
        let events = h.record(&[EventKind::Animation]);

        let outcome = h.viewer.rotate_to(ViewDirection::Front).unwrap();
        assert!(outcome.is_declined());
        let id = outcome.id();

        assert_eq!(
            animation_events(&events.borrow()),
            vec![
                AnimationEvent::Declined {
                    id,
                    name: "Animates.Rotate".into()
                },
                AnimationEvent::Completed {
                    id,
                    name: "Animates.Rotate".into()
                },
            ]
        );
        assert_eq!(h.viewer.animations().animations().count(), 0);
        assert!(h.viewer.controls().enabled);
        assert_eq!(h.viewer.camera().position, Vec3::new(0.0, 0.0, 6.0));
    }

    #[test]
    fn test_rotate_without_auto_start_waits() {
        let mut h = loaded();
        let outcome = h
            .viewer
            .rotate_with(RotateGoal::View(ViewDirection::Right), linear(400.0, false))
            .unwrap();
        let id = outcome.id();

        assert!(h.step(0.2));
        assert_eq!(h.viewer.camera().position, Vec3::new(0.0, 0.0, 6.0));
        assert!(h.viewer.controls().enabled);

        assert!(h.viewer.start_animation(id));
        assert!(!h.viewer.controls().enabled);
        assert!(h.step(0.2));
        assert!(h.viewer.camera().position.x > 0.0);
    }

    #[test]
    fn test_stopped_rotation_releases_controls() {
        let mut h = loaded();
        let events = h.record(&[EventKind::Animation]);
        let id = h.viewer.rotate_to(ViewDirection::Back).unwrap().id();
        assert!(h.step(0.1));

        assert!(h.viewer.stop_animation(id));
        assert!(h.viewer.controls().enabled);
        assert!(!h.viewer.stop_animation(id));
        assert!(animation_events(&events.borrow())
            .iter()
            .any(|event| matches!(event, AnimationEvent::Stopped { id: stopped, .. } if *stopped == id)));
    }

    #[test]
    fn test_second_walk_replaces_first() {
        let mut h = loaded();
        let events = h.record(&[EventKind::Animation]);
        let baseline = h.viewer.scene().overlays().len();

        let first = h.viewer.walk_to(Vec3::new(3.0, 0.0, 0.0)).unwrap().id();
        assert_eq!(h.viewer.scene().overlays().len(), baseline + 2);

        let second = h.viewer.walk_to(Vec3::new(0.0, 0.0, 3.0)).unwrap().id();
        assert_eq!(h.viewer.walking(), Some(second));
        assert_eq!(h.viewer.scene().overlays().len(), baseline + 2);
        let walks: Vec<_> = h
            .viewer
            .animations()
            .animations()
            .filter(|(_, name)| *name == "Animates.Walk")
            .map(|(id, _)| id)
            .collect();
        assert_eq!(walks, vec![second]);
        assert!(animation_events(&events.borrow())
            .iter()
            .any(|event| matches!(event, AnimationEvent::Stopped { id, .. } if *id == first)));

        let mut frames = 0;
        while h.viewer.walking().is_some() {
            assert!(h.step(0.016));
            frames += 1;
            assert!(frames < 100, "walk never arrived");
        }

        let position = h.viewer.model().unwrap().position();
        assert_abs_diff_eq!(position.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(position.z, 3.0, epsilon = 1e-4);
        assert_eq!(h.viewer.scene().overlays().len(), baseline);
        assert!(animation_events(&events.borrow())
            .iter()
            .any(|event| matches!(event, AnimationEvent::Completed { id, .. } if *id == second)));
    }

    #[test]
    fn test_short_walk_declines() {
        let mut h = loaded();
        let baseline = h.viewer.scene().overlays().len();
        let outcome = h.viewer.walk_to(Vec3::new(0.1, 0.0, 0.0)).unwrap();

        assert!(outcome.is_declined());
        assert!(h.viewer.walking().is_none());
        assert_eq!(h.viewer.scene().overlays().len(), baseline);
    }

    #[test]
    fn test_new_model_stops_walk() {
        let mut h = loaded();
        let baseline = h.viewer.scene().overlays().len();
        h.viewer.walk_to(Vec3::new(4.0, 0.0, 0.0)).unwrap();
        assert!(h.viewer.walking().is_some());

        h.viewer.update(cube(1.0), Vec::new()).unwrap();
        assert!(h.viewer.walking().is_none());
        assert_eq!(h.viewer.animations().animations().count(), 0);
        assert_eq!(h.viewer.scene().overlays().len(), baseline);
    }
}
