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
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Accessible language and currency dropdown switchers.
//!
//! The engine is host-neutral: [`Switcher`] drives any [`dom::Dom`] implementation.
//! Native hosts and tests use [`dom::memory::MemoryDom`]; wasm32 builds export the
//! browser surface from the `web` module.

mod a11y;
pub mod breakpoints;
mod controller;
pub mod dom;
mod error;
pub mod events;
mod registry;
pub mod resolver;
mod selectors;
mod session;
mod simulate;
pub mod timers;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use a11y::{Announcer, LIVE_REGION_ID};
pub use controller::{
    ANIM_OPTIONS, POSITION_CLASSES, SELECTED, SHOW_OPTIONS, SHOW_SHADOW, WidgetState,
};
pub use error::WiringError;
pub use lcswitch_config::{SwitchOption, SwitcherOptions, WidgetConfig, WidgetKind};
pub use registry::{
    InitReport, Switcher, SwitcherStatus, WidgetSnapshot, disable_debug, enable_debug,
};
pub use selectors::{
    ARROW_CLASS, CURRENCY_TEXT_CLASS, FLAG_CLASS, LINK_CLASS, SR_ONLY_CLASS, TEXT_CLASS,
    arrow_markup, language_href,
};
pub use session::{OVERLAY_ACTIVE, OVERLAY_CLASS};
