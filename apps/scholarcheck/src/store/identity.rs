use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::store::durable::{DurableStorage, StorageError};

/// Durable keys of one identity namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub token_key: &'static str,
    pub identity_key: &'static str,
}

pub const USER_NAMESPACE: Namespace = Namespace {
    token_key: "access_token",
    identity_key: "auth-storage",
};

pub const ADMIN_NAMESPACE: Namespace = Namespace {
    token_key: "admin_token",
    identity_key: "admin-auth-storage",
};

/// Identity record + bearer token for one namespace.
///
/// Hydrated once from durable storage; afterwards memory is authoritative and
/// every mutation writes through.
pub struct IdentityStore<T> {
    namespace: Namespace,
    storage: Arc<dyn DurableStorage>,
    identity: Option<T>,
    token: Option<String>,
}

impl<T> IdentityStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn hydrate(
        namespace: Namespace,
        storage: Arc<dyn DurableStorage>,
    ) -> Result<Self, StorageError> {
        let token = storage
            .get(namespace.token_key)?
            .filter(|t| !t.trim().is_empty());

        let identity = match storage.get(namespace.identity_key)? {
            Some(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    // A stale shape from an older client is dropped, not fatal.
                    warn!(key = namespace.identity_key, "discarding unreadable identity: {e}");
                    None
                }
            },
            None => None,
        };

        debug!(
            namespace = namespace.identity_key,
            has_token = token.is_some(),
            has_identity = identity.is_some(),
            "hydrated identity store"
        );

        Ok(Self {
            namespace,
            storage,
            identity,
            token,
        })
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn identity(&self) -> Option<&T> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Derived: an identity record is present.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn set_identity(&mut self, identity: Option<T>) -> Result<(), StorageError> {
        match &identity {
            Some(value) => {
                let raw = serde_json::to_string(value).map_err(|source| StorageError::Value {
                    key: self.namespace.identity_key.to_string(),
                    source,
                })?;
                self.storage.set(self.namespace.identity_key, &raw)?;
            }
            None => {
                self.storage.remove(self.namespace.identity_key)?;
            }
        }
        self.identity = identity;
        Ok(())
    }

    /// An empty or absent token removes the durable key.
    pub fn set_token(&mut self, token: Option<String>) -> Result<(), StorageError> {
        match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                self.storage.set(self.namespace.token_key, &token)?;
                self.token = Some(token);
            }
            None => {
                self.storage.remove(self.namespace.token_key)?;
                self.token = None;
            }
        }
        Ok(())
    }

    pub fn login(&mut self, identity: T, token: String) -> Result<(), StorageError> {
        self.set_token(Some(token))?;
        self.set_identity(Some(identity))?;
        info!(namespace = self.namespace.identity_key, "logged in");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.set_token(None)?;
        self.set_identity(None)?;
        info!(namespace = self.namespace.identity_key, "logged out");
        Ok(())
    }

    /// Drops the token and the identity it vouched for after a 401/403.
    /// Returns whether a token was removed, so repeated rejections remove it
    /// only once.
    pub fn invalidate_token(&mut self) -> Result<bool, StorageError> {
        if self.token.is_none() {
            return Ok(false);
        }
        // Storage before memory, so a failed removal keeps both in step.
        self.storage.remove(self.namespace.token_key)?;
        self.token = None;
        if self.identity.is_some() {
            self.storage.remove(self.namespace.identity_key)?;
            self.identity = None;
        }
        warn!(namespace = self.namespace.identity_key, "token rejected by server; cleared");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::AdminUser;
    use crate::store::durable::testing::MemoryStorage;

    fn admin() -> AdminUser {
        AdminUser {
            id: "a1".to_string(),
            username: "root".to_string(),
            name: Some("Root".to_string()),
        }
    }

    #[test]
    fn test_login_persists_and_hydrates() {
        let storage = Arc::new(MemoryStorage::default());
        let mut store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();
        assert!(!store.is_authenticated());

        store.login(admin(), "jwt".to_string()).unwrap();

        let rehydrated: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();
        assert!(rehydrated.is_authenticated());
        assert_eq!(rehydrated.token(), Some("jwt"));
        assert_eq!(rehydrated.identity(), Some(&admin()));
    }

    #[test]
    fn test_empty_token_removes_key() {
        let storage = Arc::new(MemoryStorage::default());
        let mut store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();

        store.set_token(Some("jwt".to_string())).unwrap();
        assert_eq!(storage.raw("admin_token").as_deref(), Some("jwt"));

        store.set_token(Some("  ".to_string())).unwrap();
        assert_eq!(storage.raw("admin_token"), None);
        assert!(!store.has_token());
    }

    #[test]
    fn test_authenticated_flag_follows_identity() {
        let storage = Arc::new(MemoryStorage::default());
        let mut store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage).unwrap();

        store.set_identity(Some(admin())).unwrap();
        assert!(store.is_authenticated());
        store.set_identity(None).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_invalidate_removes_token_exactly_once() {
        let storage = Arc::new(MemoryStorage::default());
        let mut store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();
        store.set_token(Some("jwt".to_string())).unwrap();

        assert!(store.invalidate_token().unwrap());
        assert!(!store.invalidate_token().unwrap());
        assert_eq!(storage.removals_of("admin_token"), 1);
    }

    #[test]
    fn test_invalidate_clears_identity_too() {
        let storage = Arc::new(MemoryStorage::default());
        let mut store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();
        store.login(admin(), "jwt".to_string()).unwrap();

        assert!(store.invalidate_token().unwrap());
        assert!(!store.is_authenticated());
        assert_eq!(storage.raw("admin-auth-storage"), None);
    }

    #[test]
    fn test_failed_removal_keeps_token_in_memory() {
        let storage = Arc::new(MemoryStorage::default());
        let mut store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();
        store.set_token(Some("jwt".to_string())).unwrap();

        storage.fail_removals(true);
        assert!(store.invalidate_token().is_err());
        assert_eq!(store.token(), Some("jwt"));
        assert_eq!(storage.raw("admin_token").as_deref(), Some("jwt"));

        storage.fail_removals(false);
        assert!(store.invalidate_token().unwrap());
        assert_eq!(store.token(), None);
        assert_eq!(storage.raw("admin_token"), None);
    }

    #[test]
    fn test_namespaces_do_not_share_keys() {
        let storage = Arc::new(MemoryStorage::default());
        let mut admin_store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage.clone()).unwrap();
        admin_store.set_token(Some("admin-jwt".to_string())).unwrap();

        let user_store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(USER_NAMESPACE, storage).unwrap();
        assert_eq!(user_store.token(), None);
    }

    #[test]
    fn test_unreadable_identity_is_discarded() {
        let storage = Arc::new(MemoryStorage::default());
        storage.set("admin-auth-storage", "{\"unexpected\":true}").unwrap();
        let store: IdentityStore<AdminUser> =
            IdentityStore::hydrate(ADMIN_NAMESPACE, storage).unwrap();
        assert!(!store.is_authenticated());
    }
}
