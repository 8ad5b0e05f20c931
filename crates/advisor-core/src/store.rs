// Session store
//
// Owns the registry of conversation sessions and enforces time-based expiry.
// Eviction is pull-based: checked on `get`, and swept opportunistically
// before creating a new session. There is no background timer.
//
// Concurrency: the registry lock only guards membership; each entry hands out
// an `Arc<Mutex<Session>>` so turns for one session serialize FIFO on the
// per-session mutex while turns for different sessions proceed concurrently.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{AdvisorError, Result};
use crate::session::Session;

/// Handle to a stored session, locked per turn
pub type SharedSession = Arc<Mutex<Session>>;

struct SessionEntry {
    created_at: DateTime<Utc>,
    session: SharedSession,
}

impl SessionEntry {
    fn is_expired(&self, ttl: chrono::Duration) -> bool {
        Utc::now() - self.created_at > ttl
    }
}

/// In-memory session registry with time-based expiry
pub struct SessionStore {
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    /// Create a store with the standard 1-hour session time-to-live
    pub fn new() -> Self {
        Self::with_ttl(chrono::Duration::hours(1))
    }

    /// Create a store with a custom time-to-live
    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a freshly created session and return its shared handle
    pub async fn insert(&self, session: Session) -> SharedSession {
        let id = session.id;
        let entry = SessionEntry {
            created_at: session.created_at,
            session: Arc::new(Mutex::new(session)),
        };
        let handle = entry.session.clone();
        self.sessions.write().await.insert(id, entry);
        handle
    }

    /// Look up a session by id.
    ///
    /// An expired session is evicted as a side effect and reported exactly
    /// like one that never existed.
    pub async fn get(&self, id: Uuid) -> Result<SharedSession> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(entry) if !entry.is_expired(self.ttl) => {
                    return Ok(entry.session.clone());
                }
                Some(_) => {}
                None => return Err(AdvisorError::SessionNotFound(id)),
            }
        }

        // Expired: evict under the write lock, re-checking in case another
        // task already removed it.
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get(&id) {
            if entry.is_expired(self.ttl) {
                sessions.remove(&id);
                tracing::debug!(session_id = %id, "evicted expired session");
            } else {
                return Ok(entry.session.clone());
            }
        }
        Err(AdvisorError::SessionNotFound(id))
    }

    /// Remove a session by id
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(&id) {
            Some(entry) if !entry.is_expired(self.ttl) => Ok(()),
            _ => Err(AdvisorError::SessionNotFound(id)),
        }
    }

    /// Best-effort scan removing all expired sessions; returns the count
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, entry| !entry.is_expired(ttl));
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(count = removed, "cleaned up expired sessions");
        }
        removed
    }

    /// Number of live registry entries (expired-but-unswept included)
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
