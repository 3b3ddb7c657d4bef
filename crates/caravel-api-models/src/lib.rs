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
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Caravel copilot backend.
//!
//! The backend speaks Portuguese field names on the wire (`nome`, `senha`,
//! `cargo`, ...); these types keep the Rust-side names in English and pin the
//! mapping in one place via serde renames. Response types deserialize
//! tolerantly so an unexpected payload shape surfaces as data the session
//! layer can classify instead of a hard decode error.
use serde::{Deserialize, Serialize};

/// Credentials submitted to the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Display name registered with the backend.
    #[serde(rename = "nome")]
    pub name: String,
    /// Password as entered; the backend accepts empty passwords for demo
    /// accounts, so no presence check happens on this side.
    #[serde(rename = "senha")]
    pub password: String,
}

/// Profile of a signed-in user as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Backend identifier for the user.
    pub id: i64,
    /// Display name shown in session output.
    #[serde(rename = "nome")]
    pub display_name: String,
    #[serde(rename = "cargo", default, skip_serializing_if = "Option::is_none")]
    /// Job title, when the backend knows one.
    pub role: Option<String>,
}

impl UserProfile {
    /// Short label combining display name and role for console output.
    #[must_use]
    pub fn display_label(&self) -> String {
        match &self.role {
            Some(role) if !role.trim().is_empty() => {
                format!("{} ({role})", self.display_name)
            }
            _ => self.display_name.clone(),
        }
    }
}

/// Body returned by the login endpoint, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LoginResponse {
    /// Whether the backend accepted the credentials.
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Bearer token issued on success.
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Profile of the authenticated user on success.
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Server-reported reason when the attempt was refused.
    pub error: Option<String>,
}

/// Payload for the proposal generation action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposalRequest {
    /// Client the proposal is issued for.
    #[serde(rename = "id_cliente")]
    pub client_id: i64,
    /// Proposal amount in cents.
    #[serde(rename = "valor")]
    pub amount: i64,
    /// User responsible for the proposal.
    #[serde(rename = "id_responsavel")]
    pub owner_id: i64,
}

/// Payload for the wellbeing registration action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WellbeingRequest {
    /// Employee the event is recorded for.
    #[serde(rename = "id_funcionario")]
    pub employee_id: i64,
    /// Free-text issue description.
    #[serde(rename = "problema")]
    pub issue: String,
}

/// Body returned by the deliverable listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DeliverableListResponse {
    /// Whether the listing succeeded.
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    /// Deliverable filenames, in server order.
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Server-reported reason when the listing failed.
    pub error: Option<String>,
}
