//! Cooperative pause/cancel token shared between the run loop and callers.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;

const ACTIVE: u8 = 0;
const PAUSED: u8 = 1;
const CANCELLED: u8 = 2;

/// Why a run stopped before reaching the end of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    /// No further tasks start; the list is kept for a later run.
    Paused,
    /// No further tasks start and the list is cleared.
    Cancelled,
}

/// Cloneable control handle for a running batch.
///
/// The run loop checks the token before each task and around the engine
/// call. A request stays set until a run consumes it, so one made while
/// idle stops the next run before its first task.
#[derive(Debug, Clone, Default)]
pub struct BatchHandle {
    state: Arc<AtomicU8>,
}

impl BatchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop starting new tasks and keep the list.
    pub fn pause(&self) {
        // Cancel wins over pause
        let _ = self
            .state
            .compare_exchange(ACTIVE, PAUSED, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Stop starting new tasks and clear the list when the run unwinds.
    ///
    /// The list is only cleared by a run; use `Orchestrator::cancel` while
    /// idle.
    pub fn cancel(&self) {
        self.state.store(CANCELLED, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> Option<StopReason> {
        match self.state.load(Ordering::SeqCst) {
            PAUSED => Some(StopReason::Paused),
            CANCELLED => Some(StopReason::Cancelled),
            _ => None,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_requested().is_some()
    }

    pub(crate) fn reset(&self) {
        self.state.store(ACTIVE, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_is_active() {
        assert_eq!(BatchHandle::new().stop_requested(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let handle = BatchHandle::new();
        let other = handle.clone();

        other.pause();
        assert_eq!(handle.stop_requested(), Some(StopReason::Paused));

        handle.reset();
        assert!(!other.is_stopped());
    }

    #[test]
    fn test_cancel_overrides_pause_but_not_vice_versa() {
        let handle = BatchHandle::new();
        handle.pause();
        handle.cancel();
        assert_eq!(handle.stop_requested(), Some(StopReason::Cancelled));

        handle.pause();
        assert_eq!(handle.stop_requested(), Some(StopReason::Cancelled));
    }
}
