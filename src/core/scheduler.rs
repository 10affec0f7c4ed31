use std::cell::RefCell;
use std::rc::Rc;

use crate::traits::{FrameHandle, FrameScheduler};

#[derive(Debug, Default)]
struct ManualState {
    next_handle: FrameHandle,
    pending: Option<FrameHandle>,
    requests: usize,
    cancellations: usize,
}

/// Frame scheduler driven by hand, for tests and headless hosts
///
/// Clones share state; the host grants the pending frame with `take_pending`.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the pending request, if any
    pub fn take_pending(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    pub fn requests(&self) -> usize {
        self.state.borrow().requests
    }

    pub fn cancellations(&self) -> usize {
        self.state.borrow().cancellations
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        state.requests += 1;
        let handle = state.next_handle;
        state.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(handle) {
            state.pending = None;
            state.cancellations += 1;
        }
    }
}
