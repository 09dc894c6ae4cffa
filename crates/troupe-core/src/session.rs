//! Session identity and per-conversation state.
//!
//! A session is identified by the (application, user, session) triple and
//! owns a mutable key→value state mapping shared between the orchestrator
//! and stateful tools. State follows last-write-wins semantics per key;
//! callers that run concurrent turns against the same triple must serialize
//! them externally.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::identifiers::{AppId, SessionId, StateKey, UserId};

/// Identity triple of one conversation.
///
/// # Examples
///
/// ```rust
/// use troupe_core::identifiers::{AppId, SessionId, UserId};
/// use troupe_core::session::SessionKey;
///
/// let key = SessionKey::new(
///     AppId::parse("weather_tutorial_app").unwrap(),
///     UserId::parse("user_1").unwrap(),
///     SessionId::parse("session_001").unwrap(),
/// );
/// assert_eq!(key.to_string(), "weather_tutorial_app/user_1/session_001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    app: AppId,
    user: UserId,
    session: SessionId,
}

impl SessionKey {
    /// Build a session key from its three identity parts.
    pub fn new(app: AppId, user: UserId, session: SessionId) -> Self {
        Self { app, user, session }
    }

    /// The application this session belongs to.
    pub fn app(&self) -> &AppId {
        &self.app
    }

    /// The user this session belongs to.
    pub fn user(&self) -> &UserId {
        &self.user
    }

    /// The conversation identifier within the application/user pair.
    pub fn session(&self) -> &SessionId {
        &self.session
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app, self.user, self.session)
    }
}

#[derive(Debug)]
struct StateInner {
    values: HashMap<StateKey, String>,
    last_update: DateTime<Utc>,
}

/// Shared read/write view of one session's state mapping.
///
/// Handed to stateful tools through the tool context. Clones share the
/// underlying map, so a write through one handle is immediately visible
/// through every other handle on the same session.
#[derive(Debug, Clone)]
pub struct SessionState {
    inner: Arc<RwLock<StateInner>>,
}

impl SessionState {
    /// Create an empty state mapping.
    pub fn new() -> Self {
        Self::with_values(HashMap::new())
    }

    /// Create a state mapping seeded with initial values.
    pub fn with_values(values: HashMap<StateKey, String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateInner {
                values,
                last_update: Utc::now(),
            })),
        }
    }

    /// Read the value stored under `key`, if any.
    pub fn get(&self, key: &StateKey) -> Result<Option<String>, SessionStoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| SessionStoreError::LockPoisoned {
                reason: format!("Lock poisoned: {}", e),
            })?;
        Ok(inner.values.get(key).cloned())
    }

    /// Write `value` under `key`, overwriting any prior value.
    pub fn set(&self, key: StateKey, value: impl Into<String>) -> Result<(), SessionStoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| SessionStoreError::LockPoisoned {
                reason: format!("Lock poisoned: {}", e),
            })?;
        let value = value.into();
        debug!(state_key = %key, "Session state updated");
        inner.values.insert(key, value);
        inner.last_update = Utc::now();
        Ok(())
    }

    /// Copy of the full state mapping at this moment.
    pub fn snapshot(&self) -> Result<HashMap<StateKey, String>, SessionStoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| SessionStoreError::LockPoisoned {
                reason: format!("Lock poisoned: {}", e),
            })?;
        Ok(inner.values.clone())
    }

    /// Timestamp of the most recent write (or of creation if never written).
    pub fn last_update(&self) -> Result<DateTime<Utc>, SessionStoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| SessionStoreError::LockPoisoned {
                reason: format!("Lock poisoned: {}", e),
            })?;
        Ok(inner.last_update)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// One conversation: identity plus its mutable state.
///
/// Sessions are cheap to clone; clones share the same state mapping.
#[derive(Debug, Clone)]
pub struct Session {
    key: SessionKey,
    state: SessionState,
    created_at: DateTime<Utc>,
}

impl Session {
    fn new(key: SessionKey, initial_state: HashMap<StateKey, String>) -> Self {
        Self {
            key,
            state: SessionState::with_values(initial_state),
            created_at: Utc::now(),
        }
    }

    /// The identity triple of this session.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Shared handle to this session's state mapping.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// When this session was created in its store.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Errors surfaced by session stores and state handles.
#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    /// A session already exists under the given triple.
    #[error("Session already exists for '{key}'")]
    DuplicateSession {
        /// The conflicting identity triple
        key: SessionKey,
    },
    /// No session exists under the given triple.
    #[error("No session found for '{key}'")]
    SessionNotFound {
        /// The missing identity triple
        key: SessionKey,
    },
    /// The shared state lock was poisoned by a panicking writer.
    #[error("Session state unavailable: {reason}")]
    LockPoisoned {
        /// Description of the lock failure
        reason: String,
    },
}

/// Storage of sessions keyed by their identity triple.
///
/// Exactly one session exists per triple within a store instance.
/// Re-creating an existing triple is rejected rather than treated as reset.
pub trait SessionStore: Send + Sync {
    /// Create a new session seeded with `initial_state`.
    ///
    /// Fails with [`SessionStoreError::DuplicateSession`] if the triple is
    /// already present.
    fn create_session(
        &self,
        key: SessionKey,
        initial_state: HashMap<StateKey, String>,
    ) -> Result<Session, SessionStoreError>;

    /// Look up the session stored under `key`.
    ///
    /// Fails with [`SessionStoreError::SessionNotFound`] if the triple is
    /// absent.
    fn get_session(&self, key: &SessionKey) -> Result<Session, SessionStoreError>;
}

/// In-memory session store backed by a shared hash map.
///
/// Sessions live for the lifetime of the store; no expiry.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, Session>>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn create_session(
        &self,
        key: SessionKey,
        initial_state: HashMap<StateKey, String>,
    ) -> Result<Session, SessionStoreError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| SessionStoreError::LockPoisoned {
                reason: format!("Lock poisoned: {}", e),
            })?;

        if sessions.contains_key(&key) {
            return Err(SessionStoreError::DuplicateSession { key });
        }

        let session = Session::new(key.clone(), initial_state);
        sessions.insert(key, session.clone());
        info!(session = %session.key(), "Session created");
        Ok(session)
    }

    fn get_session(&self, key: &SessionKey) -> Result<Session, SessionStoreError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| SessionStoreError::LockPoisoned {
                reason: format!("Lock poisoned: {}", e),
            })?;

        sessions
            .get(key)
            .cloned()
            .ok_or_else(|| SessionStoreError::SessionNotFound { key: key.clone() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(session: &str) -> SessionKey {
        SessionKey::new(
            AppId::new_unchecked("weather_tutorial_app"),
            UserId::new_unchecked("user_1"),
            SessionId::new_unchecked(session),
        )
    }

    #[test]
    fn create_then_get_returns_same_session() {
        let store = InMemorySessionStore::new();
        let key = test_key("session_001");

        let created = store
            .create_session(key.clone(), HashMap::new())
            .expect("Create should succeed");
        let fetched = store.get_session(&key).expect("Get should succeed");

        assert_eq!(created.key(), fetched.key());
    }

    #[test]
    fn duplicate_triple_is_rejected() {
        let store = InMemorySessionStore::new();
        let key = test_key("session_001");

        store
            .create_session(key.clone(), HashMap::new())
            .expect("First create should succeed");

        let second = store.create_session(key.clone(), HashMap::new());
        assert!(matches!(
            second,
            Err(SessionStoreError::DuplicateSession { .. })
        ));
    }

    #[test]
    fn missing_triple_is_not_found() {
        let store = InMemorySessionStore::new();
        let result = store.get_session(&test_key("nope"));

        assert!(matches!(
            result,
            Err(SessionStoreError::SessionNotFound { .. })
        ));
    }

    #[test]
    fn state_round_trip_preserves_value() {
        let store = InMemorySessionStore::new();
        let session = store
            .create_session(test_key("session_001"), HashMap::new())
            .expect("Create should succeed");

        let key = StateKey::new_unchecked("user_preference_temperature_unit");
        session
            .state()
            .set(key.clone(), "Fahrenheit")
            .expect("Set should succeed");

        let value = session.state().get(&key).expect("Get should succeed");
        assert_eq!(value.as_deref(), Some("Fahrenheit"));
    }

    #[test]
    fn initial_state_is_seeded() {
        let store = InMemorySessionStore::new();
        let unit_key = StateKey::new_unchecked("user_preference_temperature_unit");
        let mut initial = HashMap::new();
        initial.insert(unit_key.clone(), "Celsius".to_string());

        let session = store
            .create_session(test_key("stateful"), initial)
            .expect("Create should succeed");

        assert_eq!(
            session.state().get(&unit_key).unwrap().as_deref(),
            Some("Celsius")
        );
    }

    #[test]
    fn clones_share_state_writes() {
        let store = InMemorySessionStore::new();
        let key = test_key("shared");
        store
            .create_session(key.clone(), HashMap::new())
            .expect("Create should succeed");

        let first = store.get_session(&key).expect("Get should succeed");
        let second = store.get_session(&key).expect("Get should succeed");

        let state_key = StateKey::new_unchecked("last_city_checked_stateful");
        first
            .state()
            .set(state_key.clone(), "London")
            .expect("Set should succeed");

        assert_eq!(
            second.state().get(&state_key).unwrap().as_deref(),
            Some("London")
        );
    }

    #[test]
    fn writes_refresh_last_update() {
        let state = SessionState::new();
        let before = state.last_update().expect("Timestamp should be readable");

        state
            .set(StateKey::new_unchecked("k"), "v")
            .expect("Set should succeed");

        let after = state.last_update().expect("Timestamp should be readable");
        assert!(after >= before);
    }

    #[test]
    fn last_write_wins_per_key() {
        let state = SessionState::new();
        let key = StateKey::new_unchecked("last_weather_report");

        state.set(key.clone(), "first").expect("Set should succeed");
        state.set(key.clone(), "second").expect("Set should succeed");

        assert_eq!(state.get(&key).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn poisoned_lock_surfaces_as_an_error_instead_of_panicking() {
        let state = SessionState::new();
        let key = StateKey::new_unchecked("last_weather_report");

        // Panic while holding the write guard so the lock poisons.
        let writer = state.clone();
        let poisoner = std::thread::spawn(move || {
            let _guard = writer.inner.write().expect("Lock should be healthy");
            panic!("writer died mid-update");
        });
        assert!(poisoner.join().is_err());

        assert!(matches!(
            state.get(&key),
            Err(SessionStoreError::LockPoisoned { .. })
        ));
        assert!(matches!(
            state.set(key, "ignored"),
            Err(SessionStoreError::LockPoisoned { .. })
        ));
        assert!(matches!(
            state.snapshot(),
            Err(SessionStoreError::LockPoisoned { .. })
        ));
    }
}
