//! Command handlers grouped by concern.

pub(crate) mod actions;
pub(crate) mod auth;
pub(crate) mod deliverables;
