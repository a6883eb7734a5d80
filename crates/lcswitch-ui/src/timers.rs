//! Deferred continuations owned by a session.
//!
//! # Design
//! - The queue only stores work; the host decides when to call back in. Browsers use a
//!   single `gloo-timers` timeout rearmed after every drain, the in-memory document a
//!   virtual clock.
//! - Entries are ordered by due time, then by scheduling order.

use serde::Serialize;

/// Timer handle.
pub type TimerId = u64;

/// Toggle debounce for pointer activation of a trigger.
pub const TOGGLE_DEBOUNCE_MS: u64 = 10;
/// Delay before the live region receives its new text.
pub const ANNOUNCE_DELAY_MS: u64 = 10;
/// Delay before page-wide click and Escape listeners are armed after `init`.
pub const GLOBAL_LISTENER_DELAY_MS: u64 = 200;
/// Delay before `anim-options` is added to an opened root.
pub const REVEAL_OPTIONS_MS: u64 = 50;
/// Delay before `show-shadow` is added to an opened root.
pub const REVEAL_SHADOW_MS: u64 = 200;
/// Delay before `show-options` is removed from a closed root.
pub const FINISH_CLOSE_MS: u64 = 600;
/// Delay before a new overlay becomes `active`.
pub const OVERLAY_ACTIVATE_MS: u64 = 10;
/// Fade-out time of a released overlay before removal.
pub const OVERLAY_REMOVE_MS: u64 = 300;
/// Delay before a keyboard-selected language link is followed.
pub const FOLLOW_LINK_MS: u64 = 50;

/// Whose work a timer carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Owner {
    /// Page-wide singletons.
    Session,
    /// Widget at this registry index.
    Widget(usize),
}

/// Deferred work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Task {
    /// Re-check the open state after a trigger click and flip it.
    ToggleCheck,
    /// Add `anim-options`.
    RevealOptions,
    /// Add `show-shadow`.
    RevealShadow,
    /// Remove `show-options`.
    FinishClose,
    /// Mark the overlay `active`.
    ActivateOverlay,
    /// Remove a faded overlay.
    RemoveOverlay,
    /// Install page-wide click and Escape listeners.
    ArmGlobalListeners,
    /// Write a message into the live region.
    Announce(String),
    /// Activate the language link of this option.
    FollowLink {
        /// Option index within the owner.
        option: usize,
    },
}

impl Task {
    /// Presentational stage changes tied to a widget's open state.
    #[must_use]
    pub const fn is_stage(&self) -> bool {
        matches!(self, Self::RevealOptions | Self::RevealShadow | Self::FinishClose)
    }
}

/// One scheduled continuation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Timer {
    /// Handle.
    pub id: TimerId,
    /// Absolute due time in milliseconds.
    pub due: u64,
    /// Owner.
    pub owner: Owner,
    /// Work.
    pub task: Task,
}

/// Pending continuations of one session.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    next_id: TimerId,
    entries: Vec<Timer>,
}

impl TimerQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run `delay` milliseconds after `now`.
    pub fn schedule(&mut self, now: u64, delay: u64, owner: Owner, task: Task) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.push(Timer {
            id,
            due: now.saturating_add(delay),
            owner,
            task,
        });
        id
    }

    /// Drop every entry matching `predicate`; returns how many were dropped.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&Timer) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|timer| !predicate(timer));
        before - self.entries.len()
    }

    /// Whether an entry for `owner` matching `task` is pending.
    #[must_use]
    pub fn has_pending(&self, owner: Owner, task: &Task) -> bool {
        self.entries
            .iter()
            .any(|timer| timer.owner == owner && timer.task == *task)
    }

    /// Remove and return the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<Timer> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(position, _)| position)?;
        Some(self.entries.remove(position))
    }

    /// Due time of the earliest entry.
    #[must_use]
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|timer| timer.due).min()
    }

    /// Number of pending entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
