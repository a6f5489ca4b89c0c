//! In-process session store.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Session, SessionError, SessionStore};

/// Session store backed by a `HashMap`.
///
/// Every write first purges the entries whose time to live has passed, so
/// sessions that are never presented again do not accumulate. Reads skip
/// expired entries. Suitable for tests and single-instance deployments;
/// sessions do not survive a restart and are not shared between processes.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
    sessions: HashMap<String, (Session, Instant)>,
    /// `(deadline, id)` for every entry in `sessions`, earliest first.
    deadlines: BTreeSet<(Instant, String)>,
}

impl Entries {
    fn insert(&mut self, id: &str, session: Session, deadline: Instant) {
        if let Some((_, old)) = self.sessions.insert(id.to_string(), (session, deadline)) {
            self.deadlines.remove(&(old, id.to_string()));
        }
        self.deadlines.insert((deadline, id.to_string()));
    }

    fn remove(&mut self, id: &str) -> Option<(Session, Instant)> {
        let removed = self.sessions.remove(id)?;
        self.deadlines.remove(&(removed.1, id.to_string()));
        Some(removed)
    }

    /// Drops every entry whose deadline is not after `now`.
    fn purge(&mut self, now: Instant) {
        while let Some((deadline, _)) = self.deadlines.first() {
            if *deadline > now {
                break;
            }
            if let Some((_, id)) = self.deadlines.pop_first() {
                self.sessions.remove(&id);
            }
        }
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionError> {
        {
            let inner = self.inner.read().await;
            match inner.sessions.get(id) {
                None => return Ok(None),
                Some((session, deadline)) if Instant::now() < *deadline => {
                    return Ok(Some(session.clone()))
                }
                Some(_) => {}
            }
        }

        let mut inner = self.inner.write().await;
        inner.purge(Instant::now());
        Ok(inner.sessions.get(id).map(|(session, _)| session.clone()))
    }

    async fn save(&self, session: &Session, ttl: Duration) -> Result<(), SessionError> {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner.purge(now);
        inner.insert(session.id(), session.clone(), now + ttl);
        Ok(())
    }

    async fn expire(&self, id: &str, ttl: Duration) -> Result<bool, SessionError> {
        let now = Instant::now();
        let mut inner = self.inner.write().await;
        inner.purge(now);
        let Some((session, _)) = inner.remove(id) else {
            return Ok(false);
        };
        inner.insert(id, session, now + ttl);
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.write().await;
        inner.remove(id);
        inner.purge(Instant::now());
        Ok(())
    }
}
