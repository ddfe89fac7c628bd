//! Weather lookup for SkyCache
//!
//! Fetches current conditions from the Open-Meteo API and caches them in
//! the key-value store with a fixed TTL.

pub mod cache;
pub mod provider;
pub mod types;

pub use cache::{cache_key, WeatherCache, DEFAULT_CACHE_TTL};
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use types::*;
