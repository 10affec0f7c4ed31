use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use winit::window::Window;

use crate::traits::{FrameHandle, FrameScheduler};

/// Outstanding frame request, shared between the scheduler and the event loop
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    next: Rc<Cell<FrameHandle>>,
    pending: Rc<Cell<Option<FrameHandle>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn request(&self) -> FrameHandle {
        let handle = self.next.get() + 1;
        self.next.set(handle);
        self.pending.set(Some(handle));
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        if self.pending.get() == Some(handle) {
            self.pending.set(None);
        }
    }

    /// Grant the outstanding request; the redraw handler calls this once per redraw
    pub fn take(&self) -> Option<FrameHandle> {
        self.pending.take()
    }
}

/// Frames follow window redraws
pub struct WindowScheduler {
    window: Arc<Window>,
    slot: FrameSlot,
}

impl WindowScheduler {
    pub fn new(window: Arc<Window>, slot: FrameSlot) -> Self {
        Self { window, slot }
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = self.slot.request();
        self.window.request_redraw();
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.slot.cancel(handle);
    }
}
