//! Redis session store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use super::{Session, SessionError, SessionStore, DEFAULT_KEY_PREFIX};
use crate::http::error::ConfigError;

/// Session store backed by Redis.
///
/// Each session is one JSON string under `<prefix><id>`, written with
/// `SET ... EX` and refreshed with `EXPIRE`, so Redis evicts idle sessions
/// on its own.
///
/// # Example
/// ```rust,ignore
/// let store = RedisSessionStore::open("redis://127.0.0.1:6379")?
///     .key_prefix("myapp:sessions:");
/// let sessions = SessionManager::new(Arc::new(store));
/// ```
#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    key_prefix: String,
}

impl RedisSessionStore {
    pub fn new(client: Client) -> Self {
        RedisSessionStore {
            client,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Parses the URL; no connection is made until the first request.
    pub fn open(url: &str) -> Result<Self, ConfigError> {
        let client = Client::open(url)
            .map_err(|e| ConfigError::invalid_setting("session.redis_url", e.to_string()))?;
        Ok(Self::new(client))
    }

    pub fn key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, SessionError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)
    }
}

fn unavailable(err: redis::RedisError) -> SessionError {
    SessionError::Unavailable {
        reason: err.to_string(),
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> Result<Option<Session>, SessionError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(self.key(id)).await.map_err(unavailable)?;

        payload
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| SessionError::Serialization {
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    async fn save(&self, session: &Session, ttl: Duration) -> Result<(), SessionError> {
        let payload = serde_json::to_string(session).map_err(|e| SessionError::Serialization {
            reason: e.to_string(),
        })?;
        // EX 0 is rejected by Redis.
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(self.key(session.id()), payload, seconds)
            .await
            .map_err(unavailable)
    }

    async fn expire(&self, id: &str, ttl: Duration) -> Result<bool, SessionError> {
        let seconds = ttl.as_secs().max(1) as i64;
        let mut conn = self.connection().await?;
        conn.expire(self.key(id), seconds).await.map_err(unavailable)
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(self.key(id)).await.map_err(unavailable)
    }
}
