pub mod config;
pub mod error;

pub use crate::config::{Config, ConfigValidationError, ValidationResult};
pub use crate::error::{AppError, ConfigError};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the process.
///
/// `RUST_LOG` wins over the configured `log_level` when it is set.
pub fn init(config: &Config) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::info!("SkyCache core initialized");
    Ok(())
}
