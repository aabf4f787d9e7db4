//! Session Store
//!
//! The authenticated admin's identity, token and id, kept under the same
//! keys the web dashboard used so an existing storage file stays readable.

use std::sync::Arc;

use super::error::SessionResult;
use super::storage::StoragePort;
use crate::api::{AdminIdentity, AuthGrant};

/// Storage keys
pub mod keys {
    /// Identity JSON of the logged-in admin
    pub const CURRENT_USER: &str = "currentUser";
    /// Bearer token for profile calls
    pub const ADMIN_TOKEN: &str = "adminToken";
    /// Id used for appointment and chat calls
    pub const ADMIN_ID: &str = "adminId";
    /// Chat transcript JSON
    pub const CHAT_HISTORY: &str = "adminChatHistory";
}

/// Client-held proof of authentication
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub admin: AdminIdentity,
    pub token: Option<String>,
    pub admin_id: Option<String>,
}

impl Session {
    /// Session for a successful login or registration
    pub fn from_grant(grant: AuthGrant) -> Self {
        let admin_id = grant.admin.id().map(str::to_string);
        Self {
            admin: grant.admin,
            token: grant.token,
            admin_id,
        }
    }
}

/// Reads and writes the session; every call goes to storage
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn StoragePort>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    /// Persist all three session keys
    pub fn save(&self, session: &Session) -> SessionResult<()> {
        let identity = serde_json::to_string(&session.admin)?;
        self.storage.set_item(keys::CURRENT_USER, &identity)?;

        match &session.token {
            Some(token) => self.storage.set_item(keys::ADMIN_TOKEN, token)?,
            None => self.storage.remove_item(keys::ADMIN_TOKEN)?,
        }
        match &session.admin_id {
            Some(id) => self.storage.set_item(keys::ADMIN_ID, id)?,
            None => self.storage.remove_item(keys::ADMIN_ID)?,
        }

        tracing::info!(admin_id = ?session.admin_id, "Session saved");
        Ok(())
    }

    /// Current session, or `None` when storage is empty, unreadable or malformed
    pub fn read(&self) -> Option<Session> {
        let admin = self.identity()?;
        Some(Session {
            admin,
            token: self.token(),
            admin_id: self.admin_id(),
        })
    }

    /// Remove identity, token and admin id
    pub fn clear(&self) -> SessionResult<()> {
        self.storage.remove_item(keys::CURRENT_USER)?;
        self.storage.remove_item(keys::ADMIN_TOKEN)?;
        self.storage.remove_item(keys::ADMIN_ID)?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn identity(&self) -> Option<AdminIdentity> {
        let raw = self.get(keys::CURRENT_USER)?;
        match serde_json::from_str::<Option<AdminIdentity>>(&raw) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed stored identity");
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.get(keys::ADMIN_TOKEN)
    }

    pub fn admin_id(&self) -> Option<String> {
        self.get(keys::ADMIN_ID)
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Storage read failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStorage;

    fn store() -> (SessionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (SessionStore::new(storage.clone()), storage)
    }

    fn session() -> Session {
        Session::from_grant(AuthGrant {
            admin: serde_json::from_str(r#"{"name":"A","adminId":"1"}"#).unwrap(),
            token: Some("tok".to_string()),
        })
    }

    #[test]
    fn test_save_then_read() {
        let (store, storage) = store();
        store.save(&session()).unwrap();

        assert_eq!(store.read(), Some(session()));
        assert_eq!(storage.get_item(keys::ADMIN_ID).unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get_item(keys::ADMIN_TOKEN).unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_read_empty_storage() {
        let (store, _) = store();
        assert!(store.read().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_read_malformed_identity() {
        let (store, storage) = store();
        storage.set_item(keys::CURRENT_USER, "{not json").unwrap();
        storage.set_item(keys::ADMIN_ID, "1").unwrap();
        assert!(store.read().is_none());

        storage.set_item(keys::CURRENT_USER, "null").unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_clear_keeps_transcript() {
        let (store, storage) = store();
        store.save(&session()).unwrap();
        storage.set_item(keys::CHAT_HISTORY, "[]").unwrap();

        store.clear().unwrap();

        assert!(store.read().is_none());
        assert!(store.admin_id().is_none());
        assert!(store.token().is_none());
        assert_eq!(storage.get_item(keys::CHAT_HISTORY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_save_without_token_removes_stale_token() {
        let (store, _) = store();
        store.save(&session()).unwrap();

        let mut next = session();
        next.token = None;
        store.save(&next).unwrap();

        assert!(store.token().is_none());
        assert_eq!(store.read().unwrap().admin_id.as_deref(), Some("1"));
    }
}
