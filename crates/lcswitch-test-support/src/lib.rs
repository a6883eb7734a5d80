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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (host page markup over the in-memory document), assert.rs
//! (queries and assertions over rendered switchers), logging.rs (stderr subscriber).

pub mod assert;
pub mod fixtures;
pub mod logging;
