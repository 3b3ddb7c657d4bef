//! Anonymous/authenticated session state machine.

use caravel_api_models::{LoginRequest, LoginResponse, UserProfile};

use crate::error::{SessionError, SessionResult};
use crate::gateway::{ApiRequest, Gateway, decode_json};
use crate::store::{Credential, SessionStore};

const LOGIN_ENDPOINT: &str = "login";
const GENERIC_REJECTION: &str = "login refused";

/// Authentication state held for one process invocation.
///
/// Partial state is unrepresentable: a credential without a profile, or the
/// reverse, cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No credential held; requests go out unauthenticated.
    Anonymous,
    /// Credential and profile held as an inseparable pair.
    Authenticated {
        /// Bearer credential attached to outgoing requests.
        credential: Credential,
        /// Profile of the signed-in user.
        profile: UserProfile,
    },
}

/// Outcome of a login attempt that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Backend accepted the credentials; the session is now authenticated.
    Accepted,
    /// Backend refused the attempt; the session state did not change.
    Rejected {
        /// Server-reported reason, or a generic fallback.
        message: String,
    },
}

/// Owns the session state and reconciles it with the persistent store.
#[derive(Debug)]
pub struct SessionController {
    store: SessionStore,
    state: SessionState,
}

impl SessionController {
    /// Restores the session from `store` at process start.
    ///
    /// A complete persisted pair is adopted without a validation round-trip;
    /// locally cached credentials are trusted, so a revoked token stays
    /// apparently valid until the backend refuses a later request. A
    /// partial or unreadable pair restores as anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the store cannot be read; an
    /// unreadable store at startup is fatal rather than silently anonymous.
    pub fn bootstrap(store: SessionStore) -> SessionResult<Self> {
        let state = match store
            .load()
            .map_err(|source| SessionError::Store { source })?
        {
            Some((credential, profile)) => {
                tracing::debug!(user = %profile.display_name, "restored persisted session");
                SessionState::Authenticated {
                    credential,
                    profile,
                }
            }
            None => {
                tracing::debug!("no persisted session; starting anonymous");
                SessionState::Anonymous
            }
        };
        Ok(Self { store, state })
    }

    /// Attempts a login through `gateway`.
    ///
    /// The name is trimmed and must be non-empty; the password travels as
    /// entered, empty included. The request goes out deliberately
    /// unauthenticated, even when a stale credential is cached. Only
    /// `{ok:true, token, user}` with a usable token is an acceptance: the
    /// pair is persisted first and adopted after, so a persistence failure
    /// leaves the session unchanged. Any other JSON shape is a rejection
    /// carrying the server's message or a generic fallback.
    ///
    /// # Errors
    ///
    /// [`SessionError::NameRequired`] for a blank name (no request is
    /// sent), [`SessionError::Gateway`] for transport failures or a
    /// non-JSON body, [`SessionError::Store`] when persisting the accepted
    /// pair fails.
    pub async fn login(
        &mut self,
        gateway: &Gateway,
        name: &str,
        password: &str,
    ) -> SessionResult<LoginOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::NameRequired);
        }

        let payload = LoginRequest {
            name: name.to_string(),
            password: password.to_string(),
        };
        let request = ApiRequest::post(LOGIN_ENDPOINT)
            .with_json(&payload)
            .map_err(|source| SessionError::Gateway { source })?;
        let response = gateway
            .send(request, None)
            .await
            .map_err(|source| SessionError::Gateway { source })?;
        let LoginResponse {
            ok,
            token,
            user,
            error,
        } = decode_json(LOGIN_ENDPOINT, response)
            .await
            .map_err(|source| SessionError::Gateway { source })?;

        if ok && let Some((credential, profile)) = token.and_then(Credential::new).zip(user) {
            self.store
                .save(&credential, &profile)
                .map_err(|source| SessionError::Store { source })?;
            tracing::debug!(user = %profile.display_name, "login accepted");
            self.state = SessionState::Authenticated {
                credential,
                profile,
            };
            return Ok(LoginOutcome::Accepted);
        }

        let message = error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| GENERIC_REJECTION.to_string());
        tracing::debug!(%message, "login rejected");
        Ok(LoginOutcome::Rejected { message })
    }

    /// Signs out locally: clears the store and resets to anonymous.
    ///
    /// Memory resets even when the store cannot be cleared, so the running
    /// process never keeps a credential the user asked to drop; the store
    /// error still surfaces. No server call is made, so server-side session
    /// invalidation, if any, is not this component's concern.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when removal fails for a reason
    /// other than absence.
    pub fn logout(&mut self) -> SessionResult<()> {
        let cleared = self.store.clear();
        self.state = SessionState::Anonymous;
        tracing::debug!("session cleared");
        cleared.map_err(|source| SessionError::Store { source })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Credential for request construction, when authenticated.
    #[must_use]
    pub const fn credential(&self) -> Option<&Credential> {
        match &self.state {
            SessionState::Authenticated { credential, .. } => Some(credential),
            SessionState::Anonymous => None,
        }
    }

    /// Profile of the signed-in user, when authenticated.
    #[must_use]
    pub const fn profile(&self) -> Option<&UserProfile> {
        match &self.state {
            SessionState::Authenticated { profile, .. } => Some(profile),
            SessionState::Anonymous => None,
        }
    }

    /// Whether a credential is currently held.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }
}
