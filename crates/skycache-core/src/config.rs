use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Config file consulted when `SKYCACHE_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "skycache.toml";

/// Environment variable naming an alternate config file.
pub const CONFIG_PATH_ENV: &str = "SKYCACHE_CONFIG";

/// TTLs above this produce a validation warning.
const MAX_SENSIBLE_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Service configuration.
///
/// Layered as defaults, then an optional TOML file, then environment
/// variables (`PORT`, `REDIS_URL`, `CACHE_TTL_SECONDS`, ...). Keys are the
/// lowercased environment variable names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Interface the HTTP server binds to
    pub bind_address: String,

    /// HTTP listening port
    pub port: u16,

    /// Store connection URL (`redis://`, `rediss://` or `memory://`)
    pub redis_url: String,

    /// Expiry applied to cached weather records
    pub cache_ttl_seconds: u64,

    /// Timezone parameter forwarded to the weather provider
    pub weather_timezone: String,

    /// Base URL of the Open-Meteo API
    pub weather_api_url: String,

    /// Upper bound on the handling time of a single HTTP request
    pub request_timeout_secs: u64,

    /// Upper bound on a single weather provider call
    pub provider_timeout_secs: u64,

    /// Upper bound on the initial store connection
    pub connect_timeout_secs: u64,

    /// Default tracing filter; `RUST_LOG` takes precedence when set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            redis_url: "redis://localhost:6379".to_string(),
            cache_ttl_seconds: 600,
            weather_timezone: "auto".to_string(),
            weather_api_url: "https://api.open-meteo.com".to_string(),
            request_timeout_secs: 30,
            provider_timeout_secs: 10,
            connect_timeout_secs: 5,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and the optional
    /// config file named by `SKYCACHE_CONFIG` (or `skycache.toml`).
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(Some(&path), None)
    }

    /// Load configuration from an explicit file and environment map.
    ///
    /// `env: None` reads the real process environment. A missing file is
    /// not an error; defaults and the environment still apply.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = ::config::Config::try_from(&Config::default())?;

        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = file {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            ::config::Environment::default()
                .try_parsing(true)
                .source(env),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.port == 0 {
            result.add_error("port", "Port cannot be 0");
        }

        self.validate_store_url(&mut result);
        Self::validate_http_url(&self.weather_api_url, "weather_api_url", &mut result);

        if self.cache_ttl_seconds == 0 {
            result.add_error(
                "cache_ttl_seconds",
                "Cache TTL must be greater than 0",
            );
        } else if self.cache_ttl_seconds > MAX_SENSIBLE_TTL_SECONDS {
            result.add_warning(
                "cache_ttl_seconds",
                "Cache TTL is more than 24 hours; weather data will go stale",
            );
        }

        for (field, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("provider_timeout_secs", self.provider_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if value == 0 {
                result.add_error(field, "Timeout must be greater than 0");
            }
        }

        if self.weather_timezone.trim().is_empty() {
            result.add_error("weather_timezone", "Timezone cannot be empty");
        }

        result
    }

    fn validate_store_url(&self, result: &mut ValidationResult) {
        match Url::parse(&self.redis_url) {
            Ok(url) => match url.scheme() {
                "redis" | "rediss" => {
                    if url.host().is_none() {
                        result.add_error("redis_url", "URL must have a host");
                    }
                }
                "memory" => {
                    result.add_warning(
                        "redis_url",
                        "Using the in-process memory store; data is lost on restart",
                    );
                }
                other => result.add_error(
                    "redis_url",
                    format!("URL must use redis, rediss or memory scheme, got: {}", other),
                ),
            },
            Err(e) => result.add_error("redis_url", format!("Invalid URL: {}", e)),
        }
    }

    /// Validate a URL field
    fn validate_http_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Whether the configured store is the in-process memory backend
    pub fn uses_memory_store(&self) -> bool {
        self.redis_url.starts_with("memory://")
    }

    /// Store URL with any password masked, safe to log
    pub fn redacted_redis_url(&self) -> String {
        match Url::parse(&self.redis_url) {
            Ok(mut url) if url.password().is_some() => {
                // set_password only fails for cannot-be-a-base URLs
                if url.set_password(Some("****")).is_err() {
                    return "<redacted>".to_string();
                }
                url.to_string()
            }
            _ => self.redis_url.clone(),
        }
    }

    /// `host:port` the HTTP listener binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = Config::load_from(None, env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.weather_timezone, "auto");
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::load_from(
            None,
            env(&[
                ("PORT", "8080"),
                ("REDIS_URL", "redis://cache.internal:6380"),
                ("CACHE_TTL_SECONDS", "120"),
                ("WEATHER_TIMEZONE", "America/Sao_Paulo"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.redis_url, "redis://cache.internal:6380");
        assert_eq!(config.cache_ttl_seconds, 120);
        assert_eq!(config.weather_timezone, "America/Sao_Paulo");
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_file_layer_is_overridden_by_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4000").unwrap();
        writeln!(file, "cache_ttl_seconds = 60").unwrap();

        let config =
            Config::load_from(Some(file.path()), env(&[("PORT", "5000")])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.cache_ttl_seconds, 60);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let config = Config::load_from(
            Some(Path::new("/nonexistent/skycache.toml")),
            env(&[]),
        )
        .unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_unparsable_port_is_rejected() {
        let result = Config::load_from(None, env(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_store_scheme() {
        let config = Config {
            redis_url: "http://localhost:6379".to_string(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "redis_url"));
    }

    #[test]
    fn test_memory_store_is_a_warning() {
        let config = Config {
            redis_url: "memory://".to_string(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.is_valid());
        assert!(config.uses_memory_store());
        assert!(result.warnings.iter().any(|w| w.field == "redis_url"));
    }

    #[test]
    fn test_invalid_weather_url_scheme() {
        let config = Config {
            weather_api_url: "ftp://api.open-meteo.com".to_string(),
            ..Config::default()
        };
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_ttl_and_timeouts() {
        let config = Config {
            cache_ttl_seconds: 0,
            request_timeout_secs: 0,
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "cache_ttl_seconds"));
        assert!(result.errors.iter().any(|e| e.field == "request_timeout_secs"));
    }

    #[test]
    fn test_long_ttl_is_warning() {
        let config = Config {
            cache_ttl_seconds: 7 * 24 * 60 * 60,
            ..Config::default()
        };
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "cache_ttl_seconds"));
    }

    #[test]
    fn test_redacted_redis_url() {
        let config = Config {
            redis_url: "redis://:hunter2@cache.internal:6379/0".to_string(),
            ..Config::default()
        };
        let redacted = config.redacted_redis_url();
        assert!(!redacted.contains("hunter2"));
        assert!(redacted.contains("cache.internal"));

        assert_eq!(
            Config::default().redacted_redis_url(),
            "redis://localhost:6379"
        );
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
