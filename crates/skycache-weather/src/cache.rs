//! Cache-aside lookup of current weather over a [`Store`].

use skycache_store::{get_json, set_json, Store};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::provider::WeatherProvider;
use crate::types::{Coordinates, SourcedWeather, WeatherError, WeatherRecord, WeatherSource};

/// Default lifetime of a cached weather record
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Store key for the current weather at `coords`.
///
/// Built from the parsed values, so `23.5` and `23.50` share one entry.
pub fn cache_key(coords: &Coordinates) -> String {
    format!("weather:current:{}:{}", coords.latitude, coords.longitude)
}

/// Current-weather lookup that consults the store before the provider.
///
/// Expiry is left entirely to the store's TTL handling.
#[derive(Clone)]
pub struct WeatherCache {
    store: Arc<dyn Store>,
    provider: Arc<dyn WeatherProvider>,
    ttl: Duration,
    timezone: String,
}

impl WeatherCache {
    pub fn new(
        store: Arc<dyn Store>,
        provider: Arc<dyn WeatherProvider>,
        ttl: Duration,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            ttl,
            timezone: timezone.into(),
        }
    }

    /// Serve the cached record for `coords`, or fetch, cache and serve a
    /// fresh one. Failures are returned as-is; nothing is retried.
    pub async fn current(&self, coords: Coordinates) -> Result<SourcedWeather, WeatherError> {
        let key = cache_key(&coords);

        if let Some(record) = get_json::<WeatherRecord>(self.store.as_ref(), &key).await? {
            debug!(%key, "Weather cache hit");
            return Ok(SourcedWeather {
                record,
                source: WeatherSource::Cache,
            });
        }

        debug!(%key, "Weather cache miss");
        let record = self.provider.current(coords, &self.timezone).await?;

        set_json(self.store.as_ref(), &key, &record, Some(self.ttl)).await?;
        info!(%key, ttl_secs = self.ttl.as_secs(), "Cached current weather");

        Ok(SourcedWeather {
            record,
            source: WeatherSource::Api,
        })
    }
}
