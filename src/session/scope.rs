//! Lifetime scope of the session store

use tracing::debug;

use super::SessionStore;
use crate::storage::SessionStorage;

/// Error raised when the session is accessed outside its lifetime
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session store accessed outside of a mounted wizard session")]
    NoActiveSession,
}

/// Owner of the one session store a mounted wizard uses
///
/// The store exists between [`SessionScope::mount`] and
/// [`SessionScope::unmount`]. Access outside that window returns
/// [`SessionError::NoActiveSession`] rather than a default store.
#[derive(Debug, Default)]
pub struct SessionScope {
    store: Option<SessionStore>,
}

impl SessionScope {
    /// An unmounted scope
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope mounted over `storage`
    pub fn mounted(storage: impl SessionStorage + 'static) -> Self {
        let mut scope = Self::new();
        scope.mount(storage);
        scope
    }

    /// Hydrate a fresh store from `storage`, replacing any mounted one
    pub fn mount(&mut self, storage: impl SessionStorage + 'static) -> &mut SessionStore {
        debug!("Mounting session store");
        self.store.insert(SessionStore::new(storage))
    }

    /// Drop the mounted store, returning it
    ///
    /// Persisted keys are left in storage so a later mount hydrates them.
    pub fn unmount(&mut self) -> Option<SessionStore> {
        debug!("Unmounting session store");
        self.store.take()
    }

    pub fn is_mounted(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Result<&SessionStore, SessionError> {
        self.store.as_ref().ok_or(SessionError::NoActiveSession)
    }

    pub fn store_mut(&mut self) -> Result<&mut SessionStore, SessionError> {
        self.store.as_mut().ok_or(SessionError::NoActiveSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DataSourceKind;
    use crate::storage::MemorySessionStorage;

    #[test]
    fn test_unmounted_access_fails() {
        let mut scope = SessionScope::new();
        assert_eq!(scope.store().unwrap_err(), SessionError::NoActiveSession);
        assert_eq!(
            scope.store_mut().unwrap_err(),
            SessionError::NoActiveSession
        );
    }

    #[test]
    fn test_remount_hydrates_from_storage() {
        let storage = MemorySessionStorage::new();
        let mut scope = SessionScope::mounted(storage.clone());
        scope
            .store_mut()
            .unwrap()
            .set_data_source(DataSourceKind::FlatFile);

        assert!(scope.unmount().is_some());
        assert!(!scope.is_mounted());
        assert!(scope.store().is_err());

        scope.mount(storage);
        assert_eq!(
            scope.store().unwrap().data_source(),
            DataSourceKind::FlatFile
        );
    }
}
