//! Session state and token persistence.
//!
//! The session is an explicit object shared as `Arc<Session>` by every
//! client that needs the bearer token. Exactly one opaque token string is
//! persisted, under the key `token`.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ecotachos_models::{TokenProvider, Usuario};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::metrics::record_session_invalidation;

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
}

/// JSON file holding the persisted token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the token. A missing or unreadable file means no token.
    pub fn load(&self) -> Option<String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return None;
            }
        };

        match serde_json::from_str::<StoredToken>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Some(stored.token),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> ApiResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string(&StoredToken {
            token: token.to_string(),
        })?;
        std::fs::write(&self.path, body)?;
        debug!(path = %self.path.display(), "Session token saved");
        Ok(())
    }

    pub fn clear(&self) -> ApiResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<Usuario>,
}

/// Current authentication state.
#[derive(Debug)]
pub struct Session {
    store: Option<TokenStore>,
    state: RwLock<SessionState>,
}

impl Session {
    /// Open a session backed by `store`, picking up a persisted token.
    ///
    /// The user is unknown until [`ApiClient::restore_session`](crate::ApiClient::restore_session)
    /// confirms the token.
    pub fn open(store: TokenStore) -> Self {
        let token = store.load();
        if token.is_some() {
            debug!(path = %store.path().display(), "Found persisted session token");
        }
        Self {
            store: Some(store),
            state: RwLock::new(SessionState { token, user: None }),
        }
    }

    /// A session that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            store: None,
            state: RwLock::new(SessionState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a successful login and persist the token.
    pub fn login(&self, user: Usuario, token: String) -> ApiResult<()> {
        if let Some(store) = &self.store {
            store.save(&token)?;
        }
        info!(user_id = user.id, rol = ?user.rol, "Logged in");
        let mut state = self.write();
        state.token = Some(token);
        state.user = Some(user);
        Ok(())
    }

    /// Forget the token and user, locally and on disk.
    pub fn logout(&self) -> ApiResult<()> {
        {
            let mut state = self.write();
            state.token = None;
            state.user = None;
        }
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }

    pub fn set_user(&self, user: Usuario) {
        self.write().user = Some(user);
    }

    pub fn current_user(&self) -> Option<Usuario> {
        self.read().user.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.read().user.as_ref().is_some_and(|u| u.rol.is_admin())
    }
}

impl TokenProvider for Session {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }

    fn invalidate(&self) {
        let had_token = self.read().token.is_some();
        if let Err(e) = self.logout() {
            warn!(error = %e, "Failed to clear persisted session");
        }
        if had_token {
            record_session_invalidation();
            info!("Session invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecotachos_models::Rol;

    fn user(rol: Rol) -> Usuario {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "nombre": "Ana",
            "email": "ana@example.com",
            "rol": rol,
        }))
        .unwrap()
    }

    #[test]
    fn test_store_roundtrip_uses_token_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested/session.json"));
        assert_eq!(store.load(), None);

        store.save("tok-1").unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, r#"{"token":"tok-1"}"#);
        assert_eq!(store.load().as_deref(), Some("tok-1"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(TokenStore::new(&path).load(), None);
    }

    #[test]
    fn test_login_persists_and_invalidate_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let session = Session::open(TokenStore::new(&path));
        assert!(!session.is_authenticated());

        session.login(user(Rol::Admin), "abc".into()).unwrap();
        assert!(session.is_admin());
        assert_eq!(session.bearer_token().as_deref(), Some("abc"));

        let reopened = Session::open(TokenStore::new(&path));
        assert_eq!(reopened.token().as_deref(), Some("abc"));
        assert!(reopened.current_user().is_none());

        session.invalidate();
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_in_memory_session() {
        let session = Session::in_memory();
        session.login(user(Rol::User), "t".into()).unwrap();
        assert!(!session.is_admin());
        session.logout().unwrap();
        assert!(session.token().is_none());
    }
}
