/// Token for one pending frame request
pub type FrameHandle = u64;

/// Display frame-timing primitive (request-animation-frame style)
///
/// The host calls back into the viewer once per granted request.
pub trait FrameScheduler {
    /// Ask for the next display frame
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a pending request
    fn cancel_frame(&mut self, handle: FrameHandle);
}
