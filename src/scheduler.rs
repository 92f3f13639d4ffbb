//! Repaint request coalescing.
//!
//! Any number of store mutations between two display refreshes produce one
//! scheduled frame. The host asks [`FrameScheduler::request`] whether it needs
//! to register a refresh callback (true only for the first request) and calls
//! [`FrameScheduler::take`] from that callback.

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

/// Single pending-flag frame scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameScheduler {
    pending: bool,
}

impl FrameScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a frame. Returns true if this call scheduled it, false if one
    /// was already pending.
    pub fn request(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
