use std::sync::{Arc, RwLock};

use entity::{Role, User};
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{Change, KeyValueStore, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const RESULT_KEY: &str = "result_data";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("cannot encode user profile: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("login response carried an empty token")]
    EmptyToken,
}

/// Authenticated identity: profile plus the bearer token issued with it.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn role(&self) -> Role {
        self.user.role
    }
}

/// Current identity, mirrored into durable storage.
///
/// Cloning is cheap; clones share the same state. `user` and `token` are
/// always written and cleared in one storage batch.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    current: Arc<RwLock<Option<Session>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("role", &self.role())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Loads the persisted session. Anything other than a parseable user
    /// together with a non-empty token clears the persisted state and
    /// leaves the store signed out.
    pub fn restore(&self) -> Result<Option<Session>, SessionError> {
        let token = self.storage.get(TOKEN_KEY);
        let user = self.storage.get(USER_KEY);
        let restored = match (token, user) {
            (Ok(Some(token)), Ok(Some(user))) if !token.is_empty() => {
                match serde_json::from_str::<User>(&user) {
                    Ok(user) => Some(Session { user, token }),
                    Err(err) => {
                        warn!(error = %err, "stored user profile unreadable; clearing session");
                        self.clear_persisted()?;
                        None
                    }
                }
            }
            (Ok(None), Ok(None)) => None,
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "session storage unreadable; clearing session");
                self.clear_persisted()?;
                None
            }
            _ => {
                warn!("persisted session incomplete; clearing session");
                self.clear_persisted()?;
                None
            }
        };
        if let Some(session) = &restored {
            info!(role = %session.role(), user = %session.user.name, "session restored");
        }
        *self.write() = restored.clone();
        Ok(restored)
    }

    pub fn login(&self, user: User, token: String) -> Result<Session, SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let encoded = serde_json::to_string(&user)?;
        self.storage.apply(&[
            Change::Set(TOKEN_KEY.to_string(), token.clone()),
            Change::Set(USER_KEY.to_string(), encoded),
        ])?;
        let session = Session { user, token };
        info!(role = %session.role(), user = %session.user.name, "signed in");
        *self.write() = Some(session.clone());
        Ok(session)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        let result = self.clear_persisted();
        // Drop the in-memory identity even when storage refuses the write.
        *self.write() = None;
        info!("signed out");
        result
    }

    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.read().as_ref().map(Session::role)
    }

    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<User> {
        self.read().as_ref().map(|s| s.user.clone())
    }

    pub fn storage(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.storage)
    }

    fn clear_persisted(&self) -> Result<(), SessionError> {
        self.storage.apply(&[
            Change::Remove(TOKEN_KEY.to_string()),
            Change::Remove(USER_KEY.to_string()),
            Change::Remove(RESULT_KEY.to_string()),
        ])?;
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};

    fn hr_user() -> User {
        User {
            id: Some("u1".into()),
            employee_id: "EMP0001".into(),
            name: "Asha".into(),
            email: Some("asha@example.com".into()),
            role: Role::Hr,
        }
    }

    fn store() -> (Arc<MemoryStore>, SessionStore) {
        let storage = Arc::new(MemoryStore::new());
        let session = SessionStore::new(storage.clone());
        (storage, session)
    }

    #[test]
    fn login_persists_both_fields() {
        let (storage, session) = store();
        session.login(hr_user(), "t1".into()).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
        assert!(storage.get(USER_KEY).unwrap().unwrap().contains("\"HR\""));
        assert_eq!(session.role(), Some(Role::Hr));
    }

    #[test]
    fn logout_clears_both_fields_and_cached_result() {
        let (storage, session) = store();
        session.login(hr_user(), "t1".into()).unwrap();
        storage.set(RESULT_KEY, "{}").unwrap();
        session.logout().unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(storage.get(RESULT_KEY).unwrap(), None);
        assert_eq!(session.role(), None);
    }

    #[test]
    fn empty_token_is_refused() {
        let (storage, session) = store();
        assert!(matches!(
            session.login(hr_user(), String::new()),
            Err(SessionError::EmptyToken)
        ));
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn restore_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let first = SessionStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        first.login(hr_user(), "t1".into()).unwrap();

        let second = SessionStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        let restored = second.restore().unwrap().unwrap();
        assert_eq!(restored.user, hr_user());
        assert_eq!(second.token().as_deref(), Some("t1"));
    }

    #[test]
    fn restore_fails_closed_on_garbage_profile() {
        let (storage, session) = store();
        storage.set(TOKEN_KEY, "t1").unwrap();
        storage.set(USER_KEY, "{oops").unwrap();
        assert_eq!(session.restore().unwrap(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn restore_clears_half_written_state() {
        let (storage, session) = store();
        storage.set(TOKEN_KEY, "t1").unwrap();
        assert_eq!(session.restore().unwrap(), None);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);

        let user = serde_json::to_string(&hr_user()).unwrap();
        storage.set(USER_KEY, &user).unwrap();
        assert_eq!(session.restore().unwrap(), None);
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn clones_share_identity() {
        let (_, session) = store();
        let view = session.clone();
        session.login(hr_user(), "t1".into()).unwrap();
        assert_eq!(view.user().map(|u| u.name), Some("Asha".into()));
    }
}
