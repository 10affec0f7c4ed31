mod common;

use common::{bare_options, cube, Harness};
use glam::Vec3;
use model_viewer::animation::{AnimationClip, Channel, Interpolation, Keyframes, IDLE_CLIP};
use model_viewer::core::{ActivityGovernor, Transition};
use model_viewer::{EventKind, ViewerEvent};

#[cfg(test)]
mod activity_tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bobbing_idle() -> (model_viewer::scene::SceneGraph, Vec<AnimationClip>) {
        let graph = cube(2.0);
        let node = graph.roots()[0];
        let channel = Channel {
            node,
            times: vec![0.0, 1.0],
            keyframes: Keyframes::Translation(vec![Vec3::ZERO, Vec3::Y]),
            interpolation: Interpolation::Linear,
        };
        (graph, vec![AnimationClip::new(IDLE_CLIP, vec![channel])])
    }

    #[test]
    fn test_bursts_of_activation_inactivate_once() {
        let mut governor = ActivityGovernor::new(1.0);
        let mut inactivations = 0;

        for _ in 0..5 {
            governor.activate(false);
            for _ in 0..3 {
                if governor.advance(0.25, false) == Transition::Inactivated {
                    inactivations += 1;
                }
            }
        }
        assert_eq!(inactivations, 0);
        assert!(governor.is_active());

        let mut steps_after_last = 0;
        while governor.is_active() {
            steps_after_last += 1;
            if governor.advance(0.25, false) == Transition::Inactivated {
                inactivations += 1;
            }
            assert!(steps_after_last <= 8, "countdown never fired");
        }
        assert_eq!(inactivations, 1);
        assert_eq!(steps_after_last, 1);
    }

    #[test]
    fn test_countdown_restarts_from_last_activation() {
        let mut governor = ActivityGovernor::new(1.5);
        governor.activate(false);

        let mut fired_at = None;
        for step in 1..=300u32 {
            if step == 40 {
                governor.activate(false);
            }
            if governor.advance(0.01, false) == Transition::Inactivated {
                fired_at = Some(step as f32 * 0.01);
                break;
            }
        }

        let fired_at = fired_at.unwrap();
        assert_abs_diff_eq!(fired_at, 1.9, epsilon = 0.011);
        assert!(!governor.is_active());
        assert_eq!(governor.activations(), 0);
    }

    #[test]
    fn test_one_second_life_time_with_three_activations() {
        let mut governor = ActivityGovernor::new(1.0);
        let mut inactivations = Vec::new();

        for step in 0..300u32 {
            if matches!(step, 0 | 50 | 90) {
                governor.activate(false);
            }
            if governor.advance(0.01, false) == Transition::Inactivated {
                inactivations.push((step + 1) as f32 * 0.01);
            }
        }

        assert_eq!(inactivations.len(), 1);
        assert_abs_diff_eq!(inactivations[0], 1.9, epsilon = 0.011);
        assert!(!governor.is_active());
    }

    #[test]
    fn test_running_animation_keeps_countdown_disarmed() {
        let mut governor = ActivityGovernor::new(1.0);
        assert_eq!(governor.activate(true), Transition::Activated);
        assert!(!governor.is_armed());

        for _ in 0..10 {
            assert_eq!(governor.advance(100.0, true), Transition::None);
        }
        assert!(governor.is_active());

        governor.activate(false);
        assert!(governor.is_armed());
        assert_eq!(governor.advance(1.0, false), Transition::Inactivated);
    }

    #[test]
    fn test_inactivate_disarms() {
        let mut governor = ActivityGovernor::new(1.0);
        governor.activate(false);
        assert_eq!(governor.inactivate(), Transition::Inactivated);
        assert!(!governor.is_armed());
        assert_eq!(governor.inactivate(), Transition::None);
        assert_eq!(governor.advance(5.0, false), Transition::None);
    }

    #[test]
    fn test_idle_clip_keeps_viewer_drawing() {
        let mut h = Harness::bare();
        let (graph, clips) = bobbing_idle();
        h.viewer.update(graph, clips).unwrap();
        h.viewer.resize(100, 100);

        assert_eq!(h.viewer.animations().running_actions(), [IDLE_CLIP.to_string()]);
        for _ in 0..10 {
            assert!(h.step(10.0));
            assert!(h.viewer.is_active());
        }
        assert_eq!(h.frames_drawn(), 10);
        assert!(!h.viewer.governor().is_armed());
    }

    #[test]
    fn test_paused_clip_lets_viewer_go_idle() {
        let mut h = Harness::bare();
        let events = h.record(&[EventKind::Activate, EventKind::Inactivate]);
        let (graph, clips) = bobbing_idle();
        h.viewer.update(graph, clips).unwrap();

        assert!(h.step(1.0));
        assert!(h.viewer.pause_clip(IDLE_CLIP));
        assert!(!h.viewer.animations().is_running());

        let life_time = bare_options().life_time;
        assert!(h.step(0.01));
        assert!(h.viewer.is_active());
        assert!(h.step(life_time));
        assert!(!h.viewer.is_active());
        assert!(h.scheduler.has_pending());
        assert_eq!(
            *events.borrow(),
            vec![ViewerEvent::Activated, ViewerEvent::Inactivated]
        );
    }
}
