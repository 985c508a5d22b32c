/// Token Store
///
/// Owns the process-wide session. Every change goes through
/// `set_session`/`clear_session` and is published on a watch channel, so
/// subscribers always see a whole session, never a partial update.

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::session::Session;
use crate::auth::storage::RefreshTokenStorage;
use crate::error::{SessionError, StorageError};

pub struct TokenStore {
    state: watch::Sender<Session>,
    storage: Arc<dyn RefreshTokenStorage>,
}

impl TokenStore {
    /// Create a store holding the anonymous session
    pub fn new(storage: Arc<dyn RefreshTokenStorage>) -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self { state, storage }
    }

    /// Replace the session with one built from a token exchange response
    ///
    /// The refresh token is persisted only when it is non-empty. Subscribers
    /// observe the new session before this returns.
    ///
    /// # Errors
    /// Returns error if the access token cannot be decoded or the refresh
    /// token cannot be persisted; the previous session is kept in both cases
    pub fn set_session(&self, access: &str, refresh: &str) -> Result<Session, SessionError> {
        let session = Session::from_tokens(access, refresh)?;

        if !refresh.is_empty() {
            self.storage.save(refresh)?;
        }

        self.state.send_replace(session.clone());
        tracing::info!(
            user_id = %session.user_id(),
            username = %session.username(),
            "Session established"
        );

        Ok(session)
    }

    /// Forget the persisted refresh token and reset to the anonymous session
    ///
    /// The in-memory session is reset even when the token cannot be removed.
    ///
    /// # Errors
    /// Returns error if the persisted refresh token is still on disk, in
    /// which case the next start would restore the session from it
    pub fn clear_session(&self) -> Result<(), StorageError> {
        let removed = self.storage.remove();

        let anonymous = Session::anonymous();
        let cleared = self.state.send_if_modified(|current| {
            if *current == anonymous {
                return false;
            }
            *current = anonymous.clone();
            true
        });

        if cleared {
            tracing::info!("Session cleared");
        }
        if let Err(e) = &removed {
            tracing::warn!(error = %e, "Failed to remove persisted refresh token");
        }

        removed
    }

    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn stored_refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.storage.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::decode_access_token;
    use crate::auth::storage::MemoryStorage;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory slot whose writes can be switched to fail
    #[derive(Default)]
    struct FailingStorage {
        inner: MemoryStorage,
        fail_save: AtomicBool,
        fail_remove: AtomicBool,
    }

    fn denied() -> io::Error {
        io::Error::from(io::ErrorKind::PermissionDenied)
    }

    impl RefreshTokenStorage for FailingStorage {
        fn load(&self) -> Result<Option<String>, StorageError> {
            self.inner.load()
        }

        fn save(&self, token: &str) -> Result<(), StorageError> {
            if self.fail_save.load(Ordering::SeqCst) {
                return Err(StorageError::Write {
                    path: PathBuf::from("refresh"),
                    source: denied(),
                });
            }
            self.inner.save(token)
        }

        fn remove(&self) -> Result<(), StorageError> {
            if self.fail_remove.load(Ordering::SeqCst) {
                return Err(StorageError::Remove {
                    path: PathBuf::from("refresh"),
                    source: denied(),
                });
            }
            self.inner.remove()
        }
    }

    fn access_token(user_id: &str, username: &str) -> String {
        encode(
            &Header::default(),
            &json!({"userId": user_id, "username": username}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    fn store() -> (TokenStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (TokenStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_starts_anonymous() {
        let (store, _) = store();
        assert_eq!(store.session(), Session::anonymous());
    }

    #[test]
    fn test_set_session_matches_decoded_claim() {
        let (store, storage) = store();
        let access = access_token("11", "erin");

        store.set_session(&access, "refresh-1").unwrap();
        let session = store.session();

        assert_eq!(session.user(), &decode_access_token(&access).unwrap());
        assert_eq!(session.access_token(), access);
        assert_eq!(storage.load().unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_empty_refresh_keeps_persisted_token() {
        let (store, storage) = store();
        store.set_session(&access_token("1", "a"), "refresh-1").unwrap();
        store.set_session(&access_token("1", "a"), "").unwrap();

        assert_eq!(store.session().refresh_token(), "");
        assert_eq!(storage.load().unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_malformed_access_token_keeps_previous_session() {
        let (store, storage) = store();
        store.set_session(&access_token("1", "a"), "refresh-1").unwrap();
        let before = store.session();

        let result = store.set_session("not.a.token", "refresh-2");

        assert!(matches!(result, Err(SessionError::Decode(_))));
        assert_eq!(store.session(), before);
        assert_eq!(storage.load().unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let (store, storage) = store();
        store.set_session(&access_token("1", "a"), "refresh-1").unwrap();

        store.clear_session().unwrap();
        let once = store.session();
        store.clear_session().unwrap();

        assert_eq!(once, Session::anonymous());
        assert_eq!(store.session(), once);
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_subscribers_see_changes_before_return() {
        let (store, _) = store();
        let mut rx = store.subscribe();

        store.set_session(&access_token("3", "frank"), "refresh-1").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().username(), "frank");

        store.clear_session().unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_anonymous());

        store.clear_session().unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_failed_save_keeps_previous_session() {
        let storage = Arc::new(FailingStorage::default());
        let store = TokenStore::new(storage.clone());
        store.set_session(&access_token("1", "a"), "refresh-1").unwrap();
        let before = store.session();

        storage.fail_save.store(true, Ordering::SeqCst);
        let result = store.set_session(&access_token("2", "b"), "refresh-2");

        assert!(matches!(
            result,
            Err(SessionError::Storage(StorageError::Write { .. }))
        ));
        assert_eq!(store.session(), before);
        assert_eq!(storage.load().unwrap().as_deref(), Some("refresh-1"));
    }

    #[test]
    fn test_failed_remove_still_resets_session_and_reports() {
        let storage = Arc::new(FailingStorage::default());
        let store = TokenStore::new(storage.clone());
        let mut rx = store.subscribe();
        store.set_session(&access_token("1", "a"), "refresh-1").unwrap();
        let _ = rx.borrow_and_update();

        storage.fail_remove.store(true, Ordering::SeqCst);
        let result = store.clear_session();

        assert!(matches!(result, Err(StorageError::Remove { .. })));
        assert!(store.session().is_anonymous());
        assert!(rx.has_changed().unwrap());
        // still persisted
        assert_eq!(storage.load().unwrap().as_deref(), Some("refresh-1"));
    }
}
