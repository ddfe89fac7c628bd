use serde::{Deserialize, Serialize};
use skycache_store::StoreError;

/// Label used for weather codes missing from the WMO table
pub const UNKNOWN_WEATHER_DESCRIPTION: &str = "Unknown weather condition";

/// Human-readable description of a WMO weather interpretation code
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_WEATHER_DESCRIPTION,
    }
}

/// Round to one decimal place, halves toward +infinity
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

/// Round to the nearest integer, halves toward +infinity
pub fn round_to_integer(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Validated latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Parse coordinates from their textual form (e.g. URL path segments).
    ///
    /// Rejects non-numeric and non-finite input and values outside the
    /// valid latitude/longitude ranges.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, CoordinateError> {
        let lat = parse_axis(latitude, 90.0)
            .ok_or_else(|| CoordinateError::Latitude(latitude.to_string()))?;
        let lon = parse_axis(longitude, 180.0)
            .ok_or_else(|| CoordinateError::Longitude(longitude.to_string()))?;
        Ok(Self {
            latitude: lat,
            longitude: lon,
        })
    }
}

fn parse_axis(raw: &str, limit: f64) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value.abs() > limit {
        return None;
    }
    // Fold -0.0 into 0.0 so both spellings share a cache key
    Some(value + 0.0)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Invalid latitude '{0}': expected a number between -90 and 90")]
    Latitude(String),
    #[error("Invalid longitude '{0}': expected a number between -180 and 180")]
    Longitude(String),
}

/// Current conditions snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    /// Observation time (location-local wall clock, `Z` notation)
    pub time: String,
    pub temperature: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction: u16,
    pub weather_code: i32,
    pub weather_description: String,
}

/// Weather for one location, as cached and served
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub current: CurrentWeather,
}

/// Where a served record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    Cache,
    Api,
}

/// A record annotated with its provenance; serialises flat, with `source`
/// alongside the record fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedWeather {
    #[serde(flatten)]
    pub record: WeatherRecord,
    pub source: WeatherSource,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API error ({status}): {reason}")]
    Api { status: u16, reason: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Cache error: {0}")]
    Cache(#[from] StoreError),
}
