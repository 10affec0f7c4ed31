use glam::Vec2;

/// Keyboard buttons the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Movement within this many pixels still counts as a click
pub const CLICK_SLOP: f32 = 1.0;

#[derive(Debug, Clone, Copy)]
struct Press {
    button: PointerButton,
    start: Vec2,
    last: Vec2,
    dragged: bool,
}

/// Drag delta produced by a pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub button: PointerButton,
    pub delta: Vec2,
}

/// Separates clicks from drags across down/move/up
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    press: Option<Press>,
    position: Option<Vec2>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position in pixels
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn down(&mut self, button: PointerButton, at: Vec2) {
        self.position = Some(at);
        self.press = Some(Press {
            button,
            start: at,
            last: at,
            dragged: false,
        });
    }

    /// Returns the drag step when a button is held
    pub fn moved(&mut self, to: Vec2) -> Option<Drag> {
        self.position = Some(to);
        let press = self.press.as_mut()?;
        let delta = to - press.last;
        press.last = to;
        if press.start.distance(to) > CLICK_SLOP {
            press.dragged = true;
        }
        Some(Drag {
            button: press.button,
            delta,
        })
    }

    /// Returns the click position when the press never turned into a drag
    pub fn up(&mut self, button: PointerButton, at: Vec2) -> Option<Vec2> {
        self.position = Some(at);
        let press = self.press.take()?;
        let same_spot = press.start.distance(at) <= CLICK_SLOP;
        (press.button == button && !press.dragged && same_spot).then_some(at)
    }
}

/// Pixel position to normalized device coordinates, y up
pub fn to_ndc(position: Vec2, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new(position.x / w * 2.0 - 1.0, -(position.y / h * 2.0 - 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_without_motion() {
        let mut tracker = PointerTracker::new();
        tracker.down(PointerButton::Primary, Vec2::new(10.0, 10.0));
        let click = tracker.up(PointerButton::Primary, Vec2::new(10.0, 10.0));
        assert_eq!(click, Some(Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn test_drag_is_not_click() {
        let mut tracker = PointerTracker::new();
        tracker.down(PointerButton::Primary, Vec2::new(10.0, 10.0));
        let drag = tracker.moved(Vec2::new(30.0, 10.0)).unwrap();
        assert_eq!(drag.delta, Vec2::new(20.0, 0.0));
        tracker.moved(Vec2::new(10.0, 10.0));
        assert_eq!(tracker.up(PointerButton::Primary, Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_move_without_press_yields_nothing() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.moved(Vec2::new(5.0, 5.0)).is_none());
        assert_eq!(tracker.position(), Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_mismatched_button_release() {
        let mut tracker = PointerTracker::new();
        tracker.down(PointerButton::Secondary, Vec2::ZERO);
        assert_eq!(tracker.up(PointerButton::Primary, Vec2::ZERO), None);
    }

    #[test]
    fn test_ndc_corners() {
        assert_eq!(to_ndc(Vec2::new(0.0, 0.0), 200, 100), Vec2::new(-1.0, 1.0));
        assert_eq!(to_ndc(Vec2::new(200.0, 100.0), 200, 100), Vec2::new(1.0, -1.0));
        assert_eq!(to_ndc(Vec2::new(100.0, 50.0), 200, 100), Vec2::ZERO);
    }
}
