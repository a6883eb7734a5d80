//! Browser-like event dispatch over the in-memory document.
//!
//! Clicks reach page-level capture listeners first and then bubble from the target;
//! key presses bubble from the target to the page-level listeners. A consumed event
//! stops at the listener that consumed it. Time only moves through [`Switcher::advance`].

use crate::dom::{Dom, EventType};
use crate::dom::memory::{MemoryDom, NodeId};
use crate::events::{Dispatch, Effect, Key, PointerInfo, UiEvent};
use crate::registry::Switcher;

impl Switcher<MemoryDom> {
    /// A user click on `target`.
    pub fn click(&mut self, target: NodeId) -> Dispatch<NodeId> {
        self.click_with(target, PointerInfo::trusted_at(12, 12))
    }

    /// A click on `target` with explicit pointer details.
    pub fn click_with(&mut self, target: NodeId, pointer: PointerInfo) -> Dispatch<NodeId> {
        self.propagate(target, EventType::Click, &UiEvent::click(target, pointer))
    }

    /// A key press on `target`.
    pub fn key_down(&mut self, target: NodeId, key: Key) -> Dispatch<NodeId> {
        self.propagate(target, EventType::KeyDown, &UiEvent::key(target, key))
    }

    /// Resize the viewport, notifying breakpoint listeners when the match flips.
    pub fn resize_viewport(&mut self, width: u16) -> Dispatch<NodeId> {
        let was_mobile = crate::breakpoints::is_mobile_width(self.dom().viewport_width());
        self.dom_mut().set_viewport_width(width);
        let mobile = crate::breakpoints::is_mobile_width(width);
        let mut outcome = Dispatch::ignored();
        if was_mobile == mobile {
            return outcome;
        }
        let event = UiEvent::viewport(mobile);
        for listener in self.dom().viewport_listeners() {
            merge(&mut outcome, self.handle(listener, &event));
        }
        outcome
    }

    /// Move the clock forward by `ms`, running every continuation at its due time.
    pub fn advance(&mut self, ms: u64) -> Vec<Effect<NodeId>> {
        let until = self.dom().now_ms().saturating_add(ms);
        let mut effects = Vec::new();
        while let Some(delay) = self.next_timer_delay() {
            let due = self.dom().now_ms().saturating_add(delay);
            if due > until {
                break;
            }
            self.dom_mut().set_clock(due);
            effects.extend(self.run_due_timers());
        }
        self.dom_mut().set_clock(until);
        effects
    }

    fn propagate(
        &mut self,
        target: NodeId,
        event_type: EventType,
        event: &UiEvent<NodeId>,
    ) -> Dispatch<NodeId> {
        let mut outcome = Dispatch::ignored();
        for listener in self.dom().propagation_path(target, event_type) {
            let dispatch = self.handle(listener, event);
            let stop = dispatch.stop_propagation;
            merge(&mut outcome, dispatch);
            if stop {
                break;
            }
        }
        outcome
    }
}

fn merge(outcome: &mut Dispatch<NodeId>, dispatch: Dispatch<NodeId>) {
    outcome.prevent_default |= dispatch.prevent_default;
    outcome.stop_propagation |= dispatch.stop_propagation;
    outcome.effects.extend(dispatch.effects);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcswitch_config::SwitcherOptions;

    #[test]
    fn advance_moves_the_clock_without_timers() {
        let mut switcher = Switcher::new(MemoryDom::new());
        assert!(switcher.advance(250).is_empty());
        assert_eq!(switcher.dom().now_ms(), 250);
    }

    #[test]
    fn advance_runs_continuations_at_their_due_time() {
        let mut switcher = Switcher::new(MemoryDom::new());
        switcher.init(&SwitcherOptions::default());
        switcher.advance(199);
        assert_eq!(switcher.dom().page_listener_count(), 1);
        switcher.advance(1);
        assert_eq!(switcher.dom().page_listener_count(), 3);
    }

    #[test]
    fn resizing_within_a_breakpoint_is_silent() {
        let mut switcher = Switcher::new(MemoryDom::new());
        switcher.init(&SwitcherOptions::default());
        assert_eq!(switcher.resize_viewport(1024), Dispatch::ignored());
        assert_eq!(switcher.dom().viewport_width(), 1024);
    }
}
