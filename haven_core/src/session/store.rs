//! Session store - keyed storage for live sessions.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

use super::{Session, SessionId};
use crate::config::SessionsConfig;

/// Session store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Session store is full ({0} sessions)")]
    CapacityExceeded(usize),
    #[error("Internal store error: {0}")]
    Internal(String),
}

/// Storage capability for sessions, injected into the orchestrator.
pub trait SessionStore: Send + Sync {
    /// Fetch a session by ID.
    fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError>;

    /// Insert or replace a session.
    fn put(&self, session: Session) -> Result<(), StoreError>;

    /// Remove a session. Returns whether it existed.
    fn delete(&self, id: &SessionId) -> Result<bool, StoreError>;
}

/// In-memory store for a single process.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    max_sessions: Option<usize>,
}

impl InMemorySessionStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: None,
        }
    }

    /// Create a store that refuses new sessions past `max_sessions`.
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: Some(max_sessions.max(1)),
        }
    }

    pub fn from_config(config: &SessionsConfig) -> Self {
        match config.max_sessions {
            Some(max) => Self::with_max_sessions(max),
            None => Self::new(),
        }
    }

    /// Number of stored sessions.
    pub fn len(&self) -> Result<usize, StoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sessions.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sessions.get(id).cloned())
    }

    fn put(&self, session: Session) -> Result<(), StoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        if let Some(max) = self.max_sessions {
            if sessions.len() >= max && !sessions.contains_key(&session.id) {
                return Err(StoreError::CapacityExceeded(max));
            }
        }

        sessions.insert(session.id, session);
        Ok(())
    }

    fn delete(&self, id: &SessionId) -> Result<bool, StoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        Ok(sessions.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let store = InMemorySessionStore::new();
        let session = Session::new();
        let id = session.id;

        assert!(store.get(&id).unwrap().is_none());

        store.put(session.clone()).unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(session));
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_put_replaces() {
        let store = InMemorySessionStore::new();
        let mut session = Session::new();
        store.put(session.clone()).unwrap();

        session.flags.sensors_dead_discovered = true;
        store.put(session.clone()).unwrap();

        let stored = store.get(&session.id).unwrap().unwrap();
        assert!(stored.flags.sensors_dead_discovered);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let store = InMemorySessionStore::with_max_sessions(2);
        let first = Session::new();
        store.put(first.clone()).unwrap();
        store.put(Session::new()).unwrap();

        let result = store.put(Session::new());
        assert!(matches!(result, Err(StoreError::CapacityExceeded(2))));

        // Updating an existing session still works when full
        store.put(first.clone()).unwrap();

        store.delete(&first.id).unwrap();
        store.put(Session::new()).unwrap();
    }

    #[test]
    fn test_from_config() {
        let store = InMemorySessionStore::from_config(&SessionsConfig {
            max_sessions: Some(1),
        });
        store.put(Session::new()).unwrap();
        assert!(store.put(Session::new()).is_err());

        let unbounded = InMemorySessionStore::from_config(&SessionsConfig::default());
        for _ in 0..10 {
            unbounded.put(Session::new()).unwrap();
        }
        assert_eq!(unbounded.len().unwrap(), 10);
    }
}
