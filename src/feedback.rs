//! Deferred hiding of UI feedback
//!
//! Each UI element has at most one pending hide. Scheduling a new one for
//! the same element supersedes the old task, so a caption revealed again
//! before its previous timer elapses stays up for the full new delay.
//!
//! Time is virtual: the owner advances the clock from the frame loop and
//! executes whatever falls due.

use std::time::Duration;

use crate::host::UiElement;

/// Fade length of a scheduled hide
pub const HIDE_FADE: Duration = Duration::from_millis(500);

/// Identifier of a scheduled hide
pub type TaskId = u64;

/// A pending fade-to-invisible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideTask {
    pub id: TaskId,
    pub element: UiElement,
    /// Clock time at which the fade starts
    pub due: Duration,
    pub fade: Duration,
}

/// Single-shot, replace-on-reschedule hide timers
#[derive(Debug)]
pub struct TimedFeedbackScheduler {
    now: Duration,
    fade: Duration,
    next_id: TaskId,
    /// Sorted by due time, then by id
    pending: Vec<HideTask>,
}

impl Default for TimedFeedbackScheduler {
    fn default() -> Self {
        Self::new(HIDE_FADE)
    }
}

impl TimedFeedbackScheduler {
    pub fn new(fade: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            fade,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `element` to fade out `after` from now
    ///
    /// Any hide already pending for the element is cancelled.
    pub fn hide(&mut self, element: UiElement, after: Duration) -> TaskId {
        if let Some(old) = self.cancel(element) {
            log::debug!("Hide of {:?} superseded (task {})", element, old.id);
        }

        let task = HideTask {
            id: self.next_id,
            element,
            due: self.now + after,
            fade: self.fade,
        };
        self.next_id += 1;

        let pos = self
            .pending
            .iter()
            .position(|t| t.due > task.due)
            .unwrap_or(self.pending.len());
        self.pending.insert(pos, task);
        task.id
    }

    /// Drop the pending hide for `element`, if any
    pub fn cancel(&mut self, element: UiElement) -> Option<HideTask> {
        let pos = self.pending.iter().position(|t| t.element == element)?;
        Some(self.pending.remove(pos))
    }

    /// Advance the clock and return the tasks that fell due, in due order
    pub fn advance(&mut self, delta: Duration) -> Vec<HideTask> {
        self.now += delta;
        let split = self
            .pending
            .iter()
            .position(|t| t.due > self.now)
            .unwrap_or(self.pending.len());
        self.pending.drain(..split).collect()
    }

    pub fn pending_for(&self, element: UiElement) -> Option<&HideTask> {
        self.pending.iter().find(|t| t.element == element)
    }

    /// Time left until `element` starts fading
    pub fn remaining(&self, element: UiElement) -> Option<Duration> {
        self.pending_for(element)
            .map(|t| t.due.saturating_sub(self.now))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
