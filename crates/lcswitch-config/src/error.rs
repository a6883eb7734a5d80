//! Error types for option decoding.

use thiserror::Error;

/// Errors raised while decoding `init` options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Options payload was not valid JSON for the option model.
    #[error("invalid switcher options payload")]
    InvalidPayload {
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Options payload decoded to something other than an object.
    #[error("switcher options must be an object")]
    NotAnObject {
        /// JSON type name that was received.
        found: &'static str,
    },
}

/// Convenience alias for option decoding results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_error_display_and_source() {
        let invalid = match serde_json::from_str::<serde_json::Value>("{") {
            Ok(_) => panic!("expected invalid json"),
            Err(source) => ConfigError::InvalidPayload { source },
        };
        assert_eq!(invalid.to_string(), "invalid switcher options payload");
        assert!(invalid.source().is_some());

        let shape = ConfigError::NotAnObject { found: "array" };
        assert_eq!(shape.to_string(), "switcher options must be an object");
        assert!(shape.source().is_none());
    }
}
