//! Key-value store access for SkyCache.
//!
//! The [`Store`] trait is the seam between the HTTP layer and the backing
//! store. [`RedisStore`] talks to a Redis-compatible server over one
//! multiplexed connection; [`MemoryStore`] keeps everything in process and
//! backs tests and `memory://` development setups.

pub mod error;
pub mod memory;
pub mod redis_store;

pub use crate::error::StoreError;
pub use crate::memory::MemoryStore;
pub use crate::redis_store::RedisStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Async key-value store holding textual values.
#[async_trait]
pub trait Store: Send + Sync {
    /// Value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// `ttl: None` keeps the value until it is deleted.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Remove `key`, returning how many keys were removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Every key currently in the store. Unbounded; only suitable for
    /// small stores.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Liveness probe.
    async fn ping(&self) -> Result<()>;

    /// Release the underlying connection. Called once at shutdown.
    async fn close(&self) -> Result<()>;
}

/// Read `key` and decode it from JSON.
pub async fn get_json<T>(store: &dyn Store, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode `value` as JSON and write it under `key`.
pub async fn set_json<T>(
    store: &dyn Store,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw, ttl).await
}
