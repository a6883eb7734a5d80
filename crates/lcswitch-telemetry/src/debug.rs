//! Process-wide debug toggle.
//!
//! # Design
//! - Warnings and errors always pass; lower levels pass only while debug is enabled.
//! - The toggle is observational: nothing outside logging reads it.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{Level, Metadata};
use tracing_subscriber::filter::FilterFn;

static DEBUG: AtomicBool = AtomicBool::new(false);

/// Set the debug flag.
pub fn set_debug(enabled: bool) {
    let previous = DEBUG.swap(enabled, Ordering::Relaxed);
    if previous != enabled {
        // FilterFn caches per-callsite interest; flipping the flag invalidates it.
        tracing::callsite::rebuild_interest_cache();
    }
}

/// Turn verbose logging on.
pub fn enable_debug() {
    set_debug(true);
    tracing::debug!("debug logging enabled");
}

/// Turn verbose logging off.
pub fn disable_debug() {
    set_debug(false);
}

/// Whether verbose logging is currently on.
#[must_use]
pub fn debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Whether an event or span with `metadata` passes the debug gate.
#[must_use]
pub fn passes_gate(metadata: &Metadata<'_>) -> bool {
    *metadata.level() <= Level::WARN || debug_enabled()
}

/// Per-layer filter backed by [`passes_gate`].
#[must_use]
pub fn debug_gate() -> FilterFn {
    let gate: fn(&Metadata<'_>) -> bool = passes_gate;
    FilterFn::new(gate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_flips_the_flag() {
        enable_debug();
        assert!(debug_enabled());
        disable_debug();
        assert!(!debug_enabled());
        set_debug(true);
        assert!(debug_enabled());
        set_debug(false);
    }

    #[test]
    fn level_ordering_matches_gate_expectation() {
        assert!(Level::ERROR <= Level::WARN);
        assert!(Level::DEBUG > Level::WARN);
    }
}
