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

//! Session and authenticated-request layer for the Caravel copilot backend.
//!
//! Layout: `store.rs` (durable token + profile pair), `session.rs`
//! (anonymous/authenticated state machine), `gateway.rs` (endpoint
//! normalization and bearer injection), `dispatch.rs` (backend actions and
//! deliverable downloads), `log.rs` (newest-first output log).

pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod log;
pub mod session;
pub mod store;

pub use dispatch::{Action, Dispatcher};
pub use error::{
    DispatchError, DispatchResult, GatewayError, GatewayResult, SessionError, SessionResult,
    StoreError, StoreResult,
};
pub use gateway::{ApiRequest, Gateway, decode_json};
pub use log::{DownloadControl, EntryBody, OutputEntry, OutputLog};
pub use session::{LoginOutcome, SessionController, SessionState};
pub use store::{Credential, SessionStore};
