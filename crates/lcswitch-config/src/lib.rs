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

//! Option model and normalization for the language/currency switcher.
//!
//! Layout: `model.rs` (typed `init` options and widget configuration), `defaults.rs`
//! (fallback values), `normalize.rs` (option parsing and resolution), `error.rs`.

pub mod defaults;
pub mod error;
pub mod model;
pub mod normalize;

pub use error::{ConfigError, ConfigResult};
pub use model::{SwitchOption, SwitcherOptions, WidgetConfig, WidgetKind};
pub use normalize::{ResolvedOptions, normalize_page_language, parse_options};
