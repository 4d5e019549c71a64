// Client-side state: two durable identity stores and the session-only check store.
// Hydrated once into `Session`; memory is authoritative afterwards.

pub mod check;
pub mod durable;
pub mod identity;

use std::sync::{Arc, Mutex, MutexGuard};

pub use check::CheckStore;
pub use durable::{DurableStorage, FileStorage, StorageError};
pub use identity::{IdentityStore, ADMIN_NAMESPACE, USER_NAMESPACE};

use crate::models::user::{AdminUser, User};

/// Which token namespace a request belongs to. The two are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    User,
    Admin,
}

/// All client state for one process.
pub struct Session {
    user: Mutex<IdentityStore<User>>,
    admin: Mutex<IdentityStore<AdminUser>>,
    check: Mutex<CheckStore>,
}

impl Session {
    pub fn hydrate(storage: Arc<dyn DurableStorage>) -> Result<Self, StorageError> {
        Ok(Self {
            user: Mutex::new(IdentityStore::hydrate(USER_NAMESPACE, storage.clone())?),
            admin: Mutex::new(IdentityStore::hydrate(ADMIN_NAMESPACE, storage)?),
            check: Mutex::new(CheckStore::default()),
        })
    }

    pub fn user(&self) -> MutexGuard<'_, IdentityStore<User>> {
        lock(&self.user)
    }

    pub fn admin(&self) -> MutexGuard<'_, IdentityStore<AdminUser>> {
        lock(&self.admin)
    }

    pub fn check(&self) -> MutexGuard<'_, CheckStore> {
        lock(&self.check)
    }

    pub fn token(&self, scope: TokenScope) -> Option<String> {
        match scope {
            TokenScope::User => self.user().token().map(str::to_string),
            TokenScope::Admin => self.admin().token().map(str::to_string),
        }
    }

    pub fn invalidate(&self, scope: TokenScope) -> Result<bool, StorageError> {
        match scope {
            TokenScope::User => self.user().invalidate_token(),
            TokenScope::Admin => self.admin().invalidate_token(),
        }
    }
}

// Guards are only held for synchronous sections, so a poisoned lock still
// holds consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
