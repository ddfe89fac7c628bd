//! Open-Meteo current-conditions client.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::types::{
    describe_weather_code, round_to_integer, round_to_tenth, Coordinates, CurrentWeather,
    WeatherError, WeatherRecord,
};

const FORECAST_PATH: &str = "/v1/forecast";
const CURRENT_VARIABLES: &str =
    "temperature_2m,relative_humidity_2m,wind_speed_10m,wind_direction_10m,weather_code";
const USER_AGENT: &str = concat!("skycache/", env!("CARGO_PKG_VERSION"));

/// Source of current weather conditions.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for `coords`, with times reported in
    /// `timezone` (`auto` resolves it from the coordinates).
    async fn current(
        &self,
        coords: Coordinates,
        timezone: &str,
    ) -> Result<WeatherRecord, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i64,
    current: Option<CurrentBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    /// Unix seconds (requested with `timeformat=unixtime`)
    time: i64,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    weather_code: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    reason: Option<String>,
}

/// Open-Meteo forecast API client. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: Arc<Client>,
    base_url: String,
}

impl OpenMeteoProvider {
    /// Client against `base_url`, normally `https://api.open-meteo.com`
    /// (self-hosted instances and tests point elsewhere).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ForecastResponse, WeatherError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.reason)
            .unwrap_or(text);

        Err(WeatherError::Api {
            status: status.as_u16(),
            reason,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self), level = "info")]
    async fn current(
        &self,
        coords: Coordinates,
        timezone: &str,
    ) -> Result<WeatherRecord, WeatherError> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
                ("current", CURRENT_VARIABLES.to_string()),
                ("timezone", timezone.to_string()),
                ("timeformat", "unixtime".to_string()),
            ])
            .send()
            .await?;

        let forecast = self.handle_response(response).await?;
        to_record(forecast)
    }
}

fn to_record(forecast: ForecastResponse) -> Result<WeatherRecord, WeatherError> {
    let current = forecast
        .current
        .ok_or_else(|| WeatherError::Parse("response has no current conditions".to_string()))?;

    let local_seconds = current.time + forecast.utc_offset_seconds;
    let time = DateTime::from_timestamp(local_seconds, 0)
        .ok_or_else(|| WeatherError::Parse(format!("timestamp out of range: {}", current.time)))?
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    let weather_code = current.weather_code.round() as i32;

    Ok(WeatherRecord {
        latitude: forecast.latitude,
        longitude: forecast.longitude,
        timezone: forecast.timezone.unwrap_or_else(|| "UTC".to_string()),
        current: CurrentWeather {
            time,
            temperature: round_to_tenth(current.temperature_2m),
            humidity: round_to_integer(current.relative_humidity_2m) as u8,
            wind_speed: round_to_tenth(current.wind_speed_10m),
            wind_direction: round_to_integer(current.wind_direction_10m) as u16,
            weather_code,
            weather_description: describe_weather_code(weather_code).to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sao_paulo_body() -> serde_json::Value {
        serde_json::json!({
            "latitude": -23.5,
            "longitude": -46.625,
            "generationtime_ms": 0.05,
            "utc_offset_seconds": -10800,
            "timezone": "America/Sao_Paulo",
            "timezone_abbreviation": "GMT-3",
            "elevation": 760.0,
            "current_units": {"time": "unixtime", "temperature_2m": "°C"},
            "current": {
                "time": 1_791_979_200_i64,
                "interval": 900,
                "temperature_2m": 21.44,
                "relative_humidity_2m": 63,
                "wind_speed_10m": 9.66,
                "wind_direction_10m": 139.6,
                "weather_code": 3
            }
        })
    }

    fn provider(server: &MockServer) -> OpenMeteoProvider {
        OpenMeteoProvider::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_current_maps_and_rounds_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "-23.55"))
            .and(query_param("longitude", "-46.63"))
            .and(query_param("current", CURRENT_VARIABLES))
            .and(query_param("timezone", "auto"))
            .and(query_param("timeformat", "unixtime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sao_paulo_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let coords = Coordinates::parse("-23.55", "-46.63").unwrap();
        let record = provider(&mock_server).current(coords, "auto").await.unwrap();

        assert_eq!(record.latitude, -23.5);
        assert_eq!(record.longitude, -46.625);
        assert_eq!(record.timezone, "America/Sao_Paulo");
        assert_eq!(record.current.temperature, 21.4);
        assert_eq!(record.current.humidity, 63);
        assert_eq!(record.current.wind_speed, 9.7);
        assert_eq!(record.current.wind_direction, 140);
        assert_eq!(record.current.weather_code, 3);
        assert_eq!(record.current.weather_description, "Overcast");
    }

    #[tokio::test]
    async fn test_time_is_shifted_by_utc_offset() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sao_paulo_body()))
            .mount(&mock_server)
            .await;

        let coords = Coordinates::parse("-23.55", "-46.63").unwrap();
        let record = provider(&mock_server).current(coords, "auto").await.unwrap();

        // 1791979200 is 2026-10-14T12:00:00Z; three hours behind UTC
        assert_eq!(record.current.time, "2026-10-14T09:00:00.000Z");
    }

    #[tokio::test]
    async fn test_missing_timezone_defaults_to_utc() {
        let mock_server = MockServer::start().await;
        let mut body = sao_paulo_body();
        body.as_object_mut().unwrap().remove("timezone");
        body["current"]["weather_code"] = serde_json::json!(42);

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let coords = Coordinates::parse("0", "0").unwrap();
        let record = provider(&mock_server).current(coords, "UTC").await.unwrap();

        assert_eq!(record.timezone, "UTC");
        assert_eq!(record.current.weather_description, "Unknown weather condition");
    }

    #[tokio::test]
    async fn test_api_error_reason_surfaces() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": true,
                "reason": "Invalid timezone"
            })))
            .mount(&mock_server)
            .await;

        let coords = Coordinates::parse("10", "10").unwrap();
        let err = provider(&mock_server)
            .current(coords, "Mars/Olympus")
            .await
            .unwrap_err();

        match err {
            WeatherError::Api { status, reason } => {
                assert_eq!(status, 400);
                assert_eq!(reason, "Invalid timezone");
            }
            other => unreachable!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_without_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&mock_server)
            .await;

        let coords = Coordinates::parse("10", "10").unwrap();
        let err = provider(&mock_server).current(coords, "auto").await.unwrap_err();

        assert!(matches!(err, WeatherError::Api { status: 502, ref reason } if reason == "bad gateway"));
    }

    #[tokio::test]
    async fn test_slow_response_is_network_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sao_paulo_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let provider =
            OpenMeteoProvider::with_base_url(&mock_server.uri(), Duration::from_millis(200))
                .unwrap();
        let coords = Coordinates::parse("10", "10").unwrap();
        let err = provider.current(coords, "auto").await.unwrap_err();

        assert!(matches!(err, WeatherError::Network(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_missing_current_block_is_parse_error() {
        let mock_server = MockServer::start().await;
        let mut body = sao_paulo_body();
        body.as_object_mut().unwrap().remove("current");

        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;

        let coords = Coordinates::parse("10", "10").unwrap();
        let err = provider(&mock_server).current(coords, "auto").await.unwrap_err();

        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
