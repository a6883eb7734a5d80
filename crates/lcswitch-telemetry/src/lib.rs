#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Logging primitives for the switcher.
//!
//! Layout: `init.rs` (subscriber installation), `debug.rs` (process-wide debug flag
//! and the filter gating verbose output on it), `error.rs`.

pub mod debug;
pub mod error;
pub mod init;

pub use debug::{debug_enabled, disable_debug, enable_debug, set_debug};
pub use error::{Result, TelemetryError};
#[cfg(target_arch = "wasm32")]
pub use init::init_console_logging;
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
