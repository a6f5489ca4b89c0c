//! Cache-backed sessions.
//!
//! # Structure
//!
//! - [`Session`]: the record kept in the cache (id, owner, timestamps).
//! - [`SessionStore`]: the key-value persistence seam (get, set with TTL, expire, delete).
//! - [`MemorySessionStore`] and, with the `redis-store` feature, [`RedisSessionStore`].
//! - [`SessionManager`]: creates, resolves, touches and destroys sessions,
//!   bounding every store call with a timeout.
//!
//! Sessions use an idle timeout: every successful request moves the expiry
//! forward. An expired session is treated exactly like a missing one.
//!
//! # Shiro Equivalent
//! `DefaultWebSessionManager` + `SessionDAO`

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use derive_more::{Display, Error};
use log::{debug, info, warn};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::http::security::user::User;

mod cookie;
mod memory;
#[cfg(feature = "redis-store")]
mod redis_store;

pub use cookie::{SessionCookie, DEFAULT_COOKIE_NAME};
pub use memory::MemorySessionStore;
#[cfg(feature = "redis-store")]
pub use redis_store::RedisSessionStore;

/// Default idle timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default bound on a single store round-trip.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default prefix for session keys in shared caches.
pub const DEFAULT_KEY_PREFIX: &str = "user_sessions:";

const SESSION_ID_LEN: usize = 32;
const MAX_SESSION_ID_LEN: usize = 128;

/// Touches closer together than this only refresh the TTL.
const TOUCH_WRITE_INTERVAL_MS: u64 = 1000;

// =============================================================================
// Session
// =============================================================================

/// A logged-in session.
///
/// Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: String,
    user: User,
    created_at: u64,
    last_access: u64,
    timeout_ms: u64,
}

impl Session {
    /// Creates a session with a fresh random id.
    pub fn new(user: User, timeout: Duration) -> Self {
        let now = now_millis();
        Session {
            id: generate_session_id(),
            user,
            created_at: now,
            last_access: now,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// Overrides the last access time, e.g. when importing sessions.
    pub fn last_accessed_at(mut self, millis: u64) -> Self {
        self.last_access = millis;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The owner of this session.
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn last_access(&self) -> u64 {
        self.last_access
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// When the session expires if it is not touched again.
    pub fn expires_at(&self) -> u64 {
        self.last_access.saturating_add(self.timeout_ms)
    }

    pub fn is_expired_at(&self, now_millis: u64) -> bool {
        now_millis >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }

    /// Records an access now, extending the expiry.
    pub fn touch(&mut self) {
        self.last_access = now_millis();
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn generate_session_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Ids from cookies are untrusted input and end up in cache keys.
fn is_well_formed_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

// =============================================================================
// Session Store
// =============================================================================

/// Key-value persistence for sessions.
///
/// Every call is an independent operation; stores give no transactional
/// guarantees beyond those of the underlying cache. Implementations
/// should report backend failures as [`SessionError::Unavailable`] rather
/// than panicking.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session by id. `Ok(None)` if absent or already evicted.
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionError>;

    /// Stores (or replaces) a session and sets its time to live.
    async fn save(&self, session: &Session, ttl: Duration) -> Result<(), SessionError>;

    /// Resets the time to live of a stored session without rewriting it.
    /// Returns `false` if the id is unknown.
    async fn expire(&self, id: &str, ttl: Duration) -> Result<bool, SessionError>;

    /// Removes a session. Removing an unknown id is not an error.
    async fn delete(&self, id: &str) -> Result<(), SessionError>;
}

/// Session store failures.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[display("session store unavailable: {reason}")]
    Unavailable { reason: String },
    #[display("session store did not answer within {after_ms}ms")]
    Timeout { after_ms: u64 },
    #[display("session record could not be (de)serialized: {reason}")]
    Serialization { reason: String },
}

// =============================================================================
// Session Manager
// =============================================================================

/// Result of looking up a session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    Active(Session),
    Missing,
    Expired,
    /// The store failed or timed out.
    Unavailable(SessionError),
}

/// Session lifecycle on top of a [`SessionStore`].
///
/// # Example
/// ```rust,ignore
/// let sessions = SessionManager::new(Arc::new(MemorySessionStore::new()))
///     .timeout(Duration::from_secs(3600))
///     .lookup_timeout(Duration::from_millis(500));
///
/// let session = sessions.create(user).await?;
/// match sessions.resolve(session.id()).await {
///     SessionLookup::Active(session) => { /* ... */ }
///     _ => { /* treat as anonymous */ }
/// }
/// ```
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    timeout: Duration,
    lookup_timeout: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        SessionManager {
            store,
            timeout: DEFAULT_SESSION_TIMEOUT,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Idle timeout for new sessions.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Upper bound for each store call.
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn get_lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Creates and stores a session for `user`.
    pub async fn create(&self, user: User) -> Result<Session, SessionError> {
        let session = Session::new(user, self.timeout);
        self.bounded(self.store.save(&session, self.timeout)).await?;
        info!(
            "created session for {} (expires in {}s)",
            session.user().get_username(),
            self.timeout.as_secs()
        );
        Ok(session)
    }

    /// Looks up a session id.
    ///
    /// Malformed ids are reported as missing without touching the store.
    /// Expired records are deleted on a best-effort basis.
    pub async fn resolve(&self, id: &str) -> SessionLookup {
        if !is_well_formed_id(id) {
            return SessionLookup::Missing;
        }

        match self.bounded(self.store.load(id)).await {
            Ok(Some(session)) if session.is_expired() => {
                debug!("session for {} has expired", session.user().get_username());
                if let Err(err) = self.bounded(self.store.delete(id)).await {
                    warn!("could not delete expired session: {}", err);
                }
                SessionLookup::Expired
            }
            Ok(Some(session)) => SessionLookup::Active(session),
            Ok(None) => SessionLookup::Missing,
            Err(err) => SessionLookup::Unavailable(err),
        }
    }

    /// Marks the session as used now and refreshes its time to live.
    ///
    /// A session persisted less than a second ago only has its TTL reset,
    /// so bursts of requests do not rewrite the record each time.
    pub async fn touch(&self, session: &mut Session) -> Result<(), SessionError> {
        let since_write = now_millis().saturating_sub(session.last_access());
        if since_write < TOUCH_WRITE_INTERVAL_MS {
            let found = self
                .bounded(self.store.expire(session.id(), session.timeout()))
                .await?;
            if !found {
                debug!("session vanished while being touched");
            }
            return Ok(());
        }

        session.touch();
        self.bounded(self.store.save(session, session.timeout())).await
    }

    /// Deletes a session.
    pub async fn destroy(&self, id: &str) -> Result<(), SessionError> {
        if !is_well_formed_id(id) {
            return Ok(());
        }
        self.bounded(self.store.delete(id)).await
    }

    async fn bounded<T, F>(&self, operation: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        match tokio::time::timeout(self.lookup_timeout, operation).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::Timeout {
                after_ms: self.lookup_timeout.as_millis() as u64,
            }),
        }
    }
}
