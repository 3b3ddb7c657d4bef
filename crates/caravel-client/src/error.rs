//! Error types for the session and request layer.

use std::io;

use thiserror::Error;

/// Primary error type for the persistent session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed for a reason other than absence.
    #[error("session storage failed during {operation}")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
    /// Profile could not be serialized for persistence.
    #[error("failed to encode stored profile")]
    Encode {
        /// Source serialization error.
        source: serde_json::Error,
    },
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;

/// Primary error type for the authenticated request gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Endpoint could not be resolved against the base URL.
    #[error("invalid endpoint '{endpoint}'")]
    InvalidEndpoint {
        /// Endpoint as supplied by the caller.
        endpoint: String,
    },
    /// Request payload could not be encoded as JSON.
    #[error("failed to encode request payload")]
    EncodePayload {
        /// Source serialization error.
        source: serde_json::Error,
    },
    /// Held credential cannot be carried in an authorization header.
    #[error("stored credential is not header-safe")]
    CredentialHeader,
    /// Transport-level failure; no response was obtained.
    #[error("request to '{endpoint}' failed")]
    Transport {
        /// Endpoint the request was aimed at.
        endpoint: String,
        /// Source transport error.
        source: reqwest::Error,
    },
    /// Response body was not the JSON the endpoint promises.
    #[error("unexpected payload from '{endpoint}'")]
    UnexpectedPayload {
        /// Endpoint the response came from.
        endpoint: String,
        /// Source decode error.
        source: reqwest::Error,
    },
}

/// Convenience alias for gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Primary error type for session transitions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login requires a non-empty name; nothing was sent.
    #[error("name must not be empty")]
    NameRequired,
    /// Login traffic failed at the request layer.
    #[error("authentication request failed")]
    Gateway {
        /// Source gateway error.
        source: GatewayError,
    },
    /// Session persistence failed; the attempted transition did not stick.
    #[error("session persistence failed")]
    Store {
        /// Source store error.
        source: StoreError,
    },
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;

/// Primary error type for dispatched actions.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Action traffic failed at the request layer.
    #[error("action request failed")]
    Gateway {
        /// Source gateway error.
        source: GatewayError,
    },
    /// Backend answered with a logical failure for an action that needs
    /// its payload to proceed.
    #[error("server reported failure: {message}")]
    Backend {
        /// Action label the failure belongs to.
        action: &'static str,
        /// Server-supplied message, or a generic fallback.
        message: String,
    },
    /// Download was refused with a non-success HTTP status.
    #[error("download of '{filename}' failed with status {status}")]
    DownloadRejected {
        /// Deliverable that was requested.
        filename: String,
        /// Numeric HTTP status returned by the backend.
        status: u16,
    },
    /// Downloaded bytes could not be written to the destination.
    #[error("failed to write deliverable '{filename}'")]
    DownloadIo {
        /// Deliverable being materialized.
        filename: String,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for dispatch results.
pub type DispatchResult<T> = Result<T, DispatchError>;
