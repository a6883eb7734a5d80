//! Log output for integration suites.

use std::sync::Once;

use lcswitch_telemetry::{LoggingConfig, init_logging};

static INSTALL: Once = Once::new();

/// Install the stderr subscriber once per test binary. Verbose levels still go
/// through the debug gate.
pub fn install() {
    INSTALL.call_once(|| {
        if let Err(err) = init_logging(&LoggingConfig::default()) {
            // A harness that set its own subscriber keeps it.
            tracing::debug!(error = %err, "test logging left to existing subscriber");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        install();
        install();
        assert!(INSTALL.is_completed());
    }
}
