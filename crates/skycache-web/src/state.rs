//! # Web API Application State
//!
//! Shared state handed to every request handler: the store handle and the
//! cache-aside weather lookup built on top of it.

use skycache_store::Store;
use skycache_weather::{WeatherCache, WeatherProvider};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub weather: WeatherCache,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        provider: Arc<dyn WeatherProvider>,
        cache_ttl: Duration,
        timezone: impl Into<String>,
    ) -> Self {
        let weather = WeatherCache::new(store.clone(), provider, cache_ttl, timezone);
        Self { store, weather }
    }
}
