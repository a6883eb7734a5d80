//! Logging setup failures.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised while wiring the log output.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed, or installing one failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Error reported by `tracing-subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}
