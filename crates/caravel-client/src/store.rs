//! Durable persistence for the bearer credential and user profile.
//!
//! The store is a directory with two entries: `token` (raw bearer string)
//! and `user.json` (serialized profile). The pair is saved and cleared
//! together; a partial pair on disk is never surfaced to callers.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use caravel_api_models::UserProfile;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};

const TOKEN_FILE: &str = "token";
const PROFILE_FILE: &str = "user.json";

/// Opaque bearer token issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw token, normalizing surrounding whitespace.
    ///
    /// Returns `None` for a blank token: a credential that cannot appear in
    /// an authorization header is treated as no credential at all.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw token material for header construction.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// File-backed store holding the credential and profile as one unit.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Opens a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persists the credential and profile together.
    ///
    /// The profile lands first and the token last, so an interrupted save
    /// leaves at most a profile-only directory, which [`SessionStore::load`]
    /// reports as no session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when either write fails; persistence failures
    /// are never swallowed.
    pub fn save(&self, credential: &Credential, profile: &UserProfile) -> StoreResult<()> {
        let encoded =
            serde_json::to_vec_pretty(profile).map_err(|source| StoreError::Encode { source })?;
        atomic_write(&self.profile_path(), &encoded, "profile write")?;
        atomic_write(
            &self.token_path(),
            credential.expose().as_bytes(),
            "token write",
        )?;
        Ok(())
    }

    /// Loads the persisted pair.
    ///
    /// Returns `Ok(None)` when no session was saved, when either entry is
    /// missing, or when the stored data is unreadable (corrupt profile JSON,
    /// non-UTF-8 or blank token). A partial pair is never returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only for IO failures other than absence.
    pub fn load(&self) -> StoreResult<Option<(Credential, UserProfile)>> {
        let Some(raw_token) = read_optional(&self.token_path(), "token read")? else {
            return Ok(None);
        };
        let Some(raw_profile) = read_optional(&self.profile_path(), "profile read")? else {
            return Ok(None);
        };

        let Ok(token) = String::from_utf8(raw_token) else {
            tracing::warn!("stored token is not valid UTF-8; treating session as absent");
            return Ok(None);
        };
        let Some(credential) = Credential::new(token) else {
            tracing::warn!("stored token is blank; treating session as absent");
            return Ok(None);
        };

        match serde_json::from_slice::<UserProfile>(&raw_profile) {
            Ok(profile) => Ok(Some((credential, profile))),
            Err(err) => {
                tracing::warn!(error = %err, "stored profile is corrupt; treating session as absent");
                Ok(None)
            }
        }
    }

    /// Removes both entries. Clearing an empty store is a no-op.
    ///
    /// The token goes first so an interrupted clear leaves a profile-only
    /// directory, which loads as no session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for IO failures other than absence.
    pub fn clear(&self) -> StoreResult<()> {
        remove_optional(&self.token_path(), "token remove")?;
        remove_optional(&self.profile_path(), "profile remove")?;
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn profile_path(&self) -> PathBuf {
        self.dir.join(PROFILE_FILE)
    }
}

/// Writes `data` to `path` via a tempfile in the same directory, so readers
/// observe either the old content or the new, never a partial write.
fn atomic_write(path: &Path, data: &[u8], operation: &'static str) -> StoreResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| StoreError::Io { operation, source })?;
    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|source| StoreError::Io { operation, source })?;
    tmp.write_all(data)
        .map_err(|source| StoreError::Io { operation, source })?;
    tmp.persist(path).map_err(|err| StoreError::Io {
        operation,
        source: err.error,
    })?;
    Ok(())
}

fn read_optional(path: &Path, operation: &'static str) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io { operation, source }),
    }
}

fn remove_optional(path: &Path, operation: &'static str) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Io { operation, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile() -> UserProfile {
        UserProfile {
            id: 7,
            display_name: "Ana".to_string(),
            role: Some("Gerente".to_string()),
        }
    }

    fn credential() -> Credential {
        Credential::new("tok-1").expect("non-blank token")
    }

    #[test]
    fn credential_rejects_blank_tokens() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        let trimmed = Credential::new("  abc  ").expect("non-blank token");
        assert_eq!(trimmed.expose(), "abc");
    }

    #[test]
    fn save_then_load_returns_the_pair() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("save");

        let (loaded_credential, loaded_profile) =
            store.load().expect("load").expect("pair present");
        assert_eq!(loaded_credential, credential());
        assert_eq!(loaded_profile, profile());
    }

    #[test]
    fn load_without_prior_save_is_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path().join("never-created"));
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn token_without_profile_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("save");
        fs::remove_file(dir.path().join(PROFILE_FILE)).expect("drop profile");

        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn profile_without_token_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("save");
        fs::remove_file(dir.path().join(TOKEN_FILE)).expect("drop token");

        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn corrupt_profile_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("save");
        fs::write(dir.path().join(PROFILE_FILE), b"not json").expect("corrupt profile");

        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn blank_stored_token_loads_as_none() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("save");
        fs::write(dir.path().join(TOKEN_FILE), b"   ").expect("blank token");

        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_overwrites_the_previous_pair() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("first save");

        let next_credential = Credential::new("tok-2").expect("non-blank token");
        let next_profile = UserProfile {
            id: 8,
            display_name: "Bruno".to_string(),
            role: None,
        };
        store
            .save(&next_credential, &next_profile)
            .expect("second save");

        let (loaded_credential, loaded_profile) =
            store.load().expect("load").expect("pair present");
        assert_eq!(loaded_credential.expose(), "tok-2");
        assert_eq!(loaded_profile, next_profile);
    }

    #[test]
    fn clear_removes_both_and_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::new(dir.path());
        store.save(&credential(), &profile()).expect("save");

        store.clear().expect("first clear");
        assert!(store.load().expect("load").is_none());
        assert!(!dir.path().join(TOKEN_FILE).exists());
        assert!(!dir.path().join(PROFILE_FILE).exists());

        store.clear().expect("second clear");
    }
}
