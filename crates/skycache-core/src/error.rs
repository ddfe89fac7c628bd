//! Centralized error types for the SkyCache service.
//!
//! Crate-specific failures (store, weather provider) live next to the code
//! that produces them. This module holds the errors raised while bringing
//! the process up: configuration and logging setup.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialisation failed: {0}")]
    Logging(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl From<::config::ConfigError> for ConfigError {
    fn from(err: ::config::ConfigError) -> Self {
        match err {
            ::config::ConfigError::NotFound(key) => ConfigError::NotFound(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_conversion() {
        let cfg_err = ConfigError::Invalid("port: must be > 0".into());
        let app_err: AppError = cfg_err.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_crate_error_maps_to_parse_error() {
        let err: ConfigError = ::config::ConfigError::Message("bad value".into()).into();
        assert!(matches!(err, ConfigError::ParseError(ref m) if m.contains("bad value")));
    }

    #[test]
    fn test_display_includes_context() {
        let app_err = AppError::Config(ConfigError::NotFound("skycache.toml".into()));
        assert_eq!(
            app_err.to_string(),
            "Configuration error: Configuration file not found: skycache.toml"
        );
    }
}
