//! Frame scheduling boundary
//!
//! The host calls back once per display frame. A loop requests a frame with a
//! token and later receives that token back; tokens let it reject callbacks
//! that were scheduled before a cancel.

/// Host-side handle for a requested frame (e.g. a `requestAnimationFrame` id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Token the loop attaches to a frame request
pub type FrameToken = u64;

/// Display-synchronized callback scheduling
pub trait FrameScheduler {
    /// Request one callback carrying `token`. `None` if the host refused.
    fn request_frame(&mut self, token: FrameToken) -> Option<FrameHandle>;

    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler driven by hand: tests and the native demo fire frames explicitly
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    next_handle: i32,
    pending: Vec<(FrameHandle, FrameToken)>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }

    /// Take every due frame token, in request order
    pub fn take_due(&mut self) -> Vec<FrameToken> {
        self.pending.drain(..).map(|(_, token)| token).collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, token: FrameToken) -> Option<FrameHandle> {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push((handle, token));
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        if self.pending.len() != before {
            self.cancelled += 1;
        }
    }
}
