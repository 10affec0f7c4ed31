//! Notifications the viewer raises toward the embedding application.

use std::collections::HashMap;

use crate::animation::AnimationEvent;

/// Load generation returned by `Viewer::load_url`
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Load,
    Progress,
    Error,
    Update,
    Start,
    Pause,
    Activate,
    Inactivate,
    Resize,
    Dispose,
    Animation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Loaded { url: String, generation: Generation },
    Progress { url: String, loaded: u64, total: Option<u64> },
    /// Human-readable failure; the previous model stays on screen
    Error { url: String, message: String },
    Updated,
    Started,
    Paused,
    Activated,
    Inactivated,
    Resized { width: u32, height: u32 },
    Disposed,
    Animation(AnimationEvent),
}

impl ViewerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewerEvent::Loaded { .. } => EventKind::Load,
            ViewerEvent::Progress { .. } => EventKind::Progress,
            ViewerEvent::Error { .. } => EventKind::Error,
            ViewerEvent::Updated => EventKind::Update,
            ViewerEvent::Started => EventKind::Start,
            ViewerEvent::Paused => EventKind::Pause,
            ViewerEvent::Activated => EventKind::Activate,
            ViewerEvent::Inactivated => EventKind::Inactivate,
            ViewerEvent::Resized { .. } => EventKind::Resize,
            ViewerEvent::Disposed => EventKind::Dispose,
            ViewerEvent::Animation(_) => EventKind::Animation,
        }
    }
}

pub type EventHandler = Box<dyn FnMut(&ViewerEvent)>;

/// Callbacks keyed by event kind, called in subscription order
#[derive(Default)]
pub struct EventHandlers {
    handlers: HashMap<EventKind, Vec<EventHandler>>,
}

impl EventHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&ViewerEvent) + 'static) {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Returns how many handlers saw the event
    pub fn emit(&mut self, event: &ViewerEvent) -> usize {
        let Some(handlers) = self.handlers.get_mut(&event.kind()) else {
            return 0;
        };
        for handler in handlers.iter_mut() {
            handler(event);
        }
        handlers.len()
    }

    pub fn has(&self, kind: EventKind) -> bool {
        self.handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

impl std::fmt::Debug for EventHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self.handlers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventHandlers").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_only_see_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut handlers = EventHandlers::new();
        let sink = seen.clone();
        handlers.on(EventKind::Error, move |event| sink.borrow_mut().push(event.clone()));

        assert_eq!(handlers.emit(&ViewerEvent::Started), 0);
        let error = ViewerEvent::Error {
            url: "a.glb".into(),
            message: "Missing texture: wood.png".into(),
        };
        assert_eq!(handlers.emit(&error), 1);
        assert_eq!(*seen.borrow(), vec![error]);
    }

    #[test]
    fn clear_drops_every_subscription() {
        let mut handlers = EventHandlers::new();
        handlers.on(EventKind::Dispose, |_| {});
        assert!(handlers.has(EventKind::Dispose));
        handlers.clear();
        assert!(!handlers.has(EventKind::Dispose));
        assert_eq!(handlers.emit(&ViewerEvent::Disposed), 0);
    }
}
