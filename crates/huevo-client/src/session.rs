//! # Session Store
//!
//! Holds the local copy of the logged-in user and tells every screen when
//! it changes.
//!
//! ## Store Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SessionStore                                    │
//! │                                                                         │
//! │   get() ──► RwLock<Resolution>     Loading │ Resolved(Session)         │
//! │                                                                         │
//! │   set(session) ──┬──► SessionStorage::save   usuarioId / rol           │
//! │                  └──► broadcast SessionEvent::Changed                  │
//! │                                                                         │
//! │   clear() ───────┬──► SessionStorage::clear  all four keys             │
//! │                  └──► broadcast SessionEvent::Cleared                  │
//! │                                                                         │
//! │   resolve(client):                                                     │
//! │     cached usuarioId + known rol ──► Resolved(cached)                  │
//! │     otherwise session_info ──► parse ──► set()                         │
//! │     session_info failed ──► Resolved(empty), cache cleared             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Other processes signal changes through the backend's `SessionUpdated`
//! frame; [`SessionStore::invalidate`] drops the cached value so the next
//! [`SessionStore::resolve`] asks the backend again.

use huevo_core::session::{parse_session_info, Resolution, Session, SESSION_KEYS};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::invoke::{CommandClient, NoArgs};

// =============================================================================
// Storage Backends
// =============================================================================

/// Persistent key/value store for the session keys.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> ClientResult<BTreeMap<String, String>>;
    fn save(&self, entries: &BTreeMap<String, String>) -> ClientResult<()>;
}

/// TOML file of string keys.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStorage { path: path.into() }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::StorageFailed(e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ClientError::StorageFailed(e.to_string()))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::StorageFailed(e.to_string()))?;
        }
        let contents =
            toml::to_string(entries).map_err(|e| ClientError::StorageFailed(e.to_string()))?;
        std::fs::write(&self.path, contents).map_err(|e| ClientError::StorageFailed(e.to_string()))
    }
}

/// Process-local storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .map_err(|e| ClientError::StorageFailed(e.to_string()))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| ClientError::StorageFailed(e.to_string()))?;
        *guard = entries.clone();
        Ok(())
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Change notifications for subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Changed(Session),
    Cleared,
}

/// Explicit session state with change broadcast.
#[derive(Clone)]
pub struct SessionStore {
    resolution: Arc<RwLock<Resolution>>,
    storage: Arc<dyn SessionStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (events, _) = broadcast::channel(16);
        SessionStore {
            resolution: Arc::new(RwLock::new(Resolution::Loading)),
            storage,
            events,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub async fn get(&self) -> Resolution {
        *self.resolution.read().await
    }

    /// The resolved session, or empty while loading.
    pub async fn current(&self) -> Session {
        match *self.resolution.read().await {
            Resolution::Resolved(session) => session,
            Resolution::Loading => Session::empty(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stores and persists a resolved session.
    pub async fn set(&self, session: Session) -> ClientResult<()> {
        let mut entries = self.storage.load().unwrap_or_default();
        for key in SESSION_KEYS {
            entries.remove(key);
        }
        for (key, value) in session.to_cache() {
            entries.insert(key.to_string(), value);
        }
        self.storage.save(&entries)?;

        *self.resolution.write().await = Resolution::Resolved(session);
        let _ = self.events.send(SessionEvent::Changed(session));
        debug!(usuario_id = ?session.usuario_id, rol = ?session.rol, "Session stored");
        Ok(())
    }

    /// Removes every session key and resolves to "nobody".
    pub async fn clear(&self) -> ClientResult<()> {
        *self.resolution.write().await = Resolution::Resolved(Session::empty());
        let mut entries = self.storage.load().unwrap_or_default();
        for key in SESSION_KEYS {
            entries.remove(key);
        }
        let saved = self.storage.save(&entries);
        let _ = self.events.send(SessionEvent::Cleared);
        saved
    }

    /// Forgets the in-memory value so the next resolve goes to the backend.
    pub async fn invalidate(&self) {
        *self.resolution.write().await = Resolution::Loading;
        let mut entries = self.storage.load().unwrap_or_default();
        for key in SESSION_KEYS {
            entries.remove(key);
        }
        if let Err(e) = self.storage.save(&entries) {
            warn!(error = %e, "Failed to drop cached session");
        }
    }

    /// Resolves the session: cache first, then `session_info`.
    ///
    /// A failed backend lookup leaves the session explicitly empty.
    pub async fn resolve(&self, client: &CommandClient) -> Session {
        if let Resolution::Resolved(session) = self.get().await {
            return session;
        }

        match self.storage.load() {
            Ok(entries) => {
                if let Some(cached) = Session::from_cache(&entries) {
                    debug!(usuario_id = ?cached.usuario_id, "Session from cache");
                    *self.resolution.write().await = Resolution::Resolved(cached);
                    return cached;
                }
            }
            Err(e) => warn!(error = %e, "Session cache unreadable"),
        }

        self.refresh(client).await
    }

    /// Asks the backend, ignoring the cache.
    pub async fn refresh(&self, client: &CommandClient) -> Session {
        match client.call::<_, Value>("session_info", &NoArgs {}).await {
            Ok(info) => {
                let session = parse_session_info(&info);
                let stored = if session.is_authenticated() {
                    self.set(session).await
                } else {
                    self.clear().await
                };
                if let Err(e) = stored {
                    warn!(error = %e, "Failed to persist session");
                }
                info!(usuario_id = ?session.usuario_id, rol = ?session.rol, "Session resolved");
                session
            }
            Err(e) => {
                warn!(error = %e, "session_info failed, treating as logged out");
                if let Err(e) = self.clear().await {
                    warn!(error = %e, "Failed to clear session");
                }
                Session::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeBackend;
    use huevo_core::session::Role;

    #[tokio::test]
    async fn test_resolve_prefers_valid_cache() {
        let storage = MemoryStorage::new();
        let mut entries = BTreeMap::new();
        entries.insert("usuarioId".to_string(), "7".to_string());
        entries.insert("rol".to_string(), " ADMIN ".to_string());
        storage.save(&entries).unwrap();

        let store = SessionStore::new(Arc::new(storage));
        let fake = FakeBackend::new();
        let session = store.resolve(&fake.client()).await;

        assert_eq!(session, Session::new(7, Role::Admin));
        assert_eq!(fake.call_count("session_info"), 0);
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_session_info() {
        let fake = FakeBackend::new();
        fake.set_session(3, "Operador");
        let store = SessionStore::in_memory();

        let session = store.resolve(&fake.client()).await;
        assert_eq!(session, Session::new(3, Role::Operador));
        assert_eq!(fake.call_count("session_info"), 1);

        let entries = store.storage.load().unwrap();
        assert_eq!(entries.get("rol").map(String::as_str), Some("operador"));
    }

    #[tokio::test]
    async fn test_unknown_role_resolves_without_role() {
        let fake = FakeBackend::new();
        fake.set_session(3, "supervisor");
        let store = SessionStore::in_memory();

        let session = store.resolve(&fake.client()).await;
        assert_eq!(session.usuario_id, Some(3));
        assert_eq!(session.rol, None);
    }

    #[tokio::test]
    async fn test_failed_lookup_leaves_session_empty() {
        let fake = FakeBackend::new();
        fake.fail_command("session_info", "db locked");
        let store = SessionStore::in_memory();

        let session = store.resolve(&fake.client()).await;
        assert!(!session.is_authenticated());
        assert_eq!(store.get().await, Resolution::Resolved(Session::empty()));
    }

    #[tokio::test]
    async fn test_clear_removes_all_keys_and_broadcasts() {
        let storage = MemoryStorage::new();
        let mut entries = BTreeMap::new();
        for key in SESSION_KEYS {
            entries.insert(key.to_string(), "x".to_string());
        }
        entries.insert("tema".to_string(), "oscuro".to_string());
        storage.save(&entries).unwrap();

        let store = SessionStore::new(Arc::new(storage.clone()));
        let mut events = store.subscribe();
        store.clear().await.unwrap();

        let left = storage.load().unwrap();
        assert_eq!(left.len(), 1);
        assert!(left.contains_key("tema"));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Cleared);
    }

    #[tokio::test]
    async fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("sub").join("session.toml"));
        assert!(storage.load().unwrap().is_empty());

        let store = SessionStore::new(Arc::new(storage.clone()));
        store.set(Session::new(11, Role::Operador)).await.unwrap();

        let entries = storage.load().unwrap();
        assert_eq!(Session::from_cache(&entries), Some(Session::new(11, Role::Operador)));
    }

    #[tokio::test]
    async fn test_invalidate_forces_backend_lookup() {
        let fake = FakeBackend::new();
        fake.set_session(2, "admin");
        let store = SessionStore::in_memory();
        store.set(Session::new(9, Role::Operador)).await.unwrap();

        store.invalidate().await;
        assert_eq!(store.get().await, Resolution::Loading);
        assert_eq!(store.resolve(&fake.client()).await, Session::new(2, Role::Admin));
    }
}
