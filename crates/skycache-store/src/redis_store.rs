//! Redis-backed store over a single multiplexed connection.

use ::redis::aio::{ConnectionManager, ConnectionManagerConfig};
use ::redis::AsyncCommands;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::{Result, Store, StoreError};

/// Retries after the first failed connection attempt at startup
pub const CONNECT_RETRIES: usize = 1;

/// Store backed by a Redis-compatible server.
///
/// `ConnectionManager` multiplexes every command over one connection and
/// reconnects on its own after a drop; clones share that connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Open the connection, failing if the server is not reachable
    /// within `connect_timeout`.
    ///
    /// Initial connection attempts are retried at most
    /// [`CONNECT_RETRIES`] times so a refused connection is reported with
    /// its cause rather than as a timeout.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self> {
        let client = ::redis::Client::open(url)
            .map_err(|e| StoreError::Connection(format!("invalid store URL: {}", e)))?;

        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(CONNECT_RETRIES)
            .set_connection_timeout(connect_timeout);

        // Hard bound over every attempt and the backoff between them
        let attempts = ConnectionManager::new_with_config(client, config);
        let conn = tokio::time::timeout(connect_timeout * (CONNECT_RETRIES as u32 + 1), attempts)
            .await
            .map_err(|_| StoreError::Timeout)?
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        debug!("Redis connection established");
        Ok(Self { conn })
    }
}

#[async_trait]
impl Store for RedisStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl {
            // SET EX rejects 0; sub-second TTLs round up to one second
            Some(ttl) => {
                let seconds = ttl.as_secs().max(1);
                let _: () = conn.set_ex(key, value, seconds).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys("*").await?;
        Ok(keys)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let pong: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        debug!(reply = %pong, "Redis ping");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = ::redis::cmd("QUIT").query_async(&mut conn).await?;
        info!("Redis connection closed");
        Ok(())
    }
}
