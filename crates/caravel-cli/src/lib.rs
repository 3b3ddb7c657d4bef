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
#![allow(clippy::redundant_pub_crate)]

//! Command-line copilot client for the Caravel demo backend.
//!
//! Layout:
//! - `cli.rs`: argument definitions and command routing
//! - `commands/`: one handler module per command group
//! - `client.rs`: shared dependencies, errors, and telemetry helpers
//! - `output.rs`: renderers for session state and the dispatch log
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::run;
