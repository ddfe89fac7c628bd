use anyhow::{Context, Result};
use skycache_core::Config;
use skycache_store::{MemoryStore, RedisStore, Store};
use skycache_weather::OpenMeteoProvider;
use skycache_web::{create_app, AppState};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, validation) = Config::load_validated().context("Failed to load configuration")?;

    skycache_core::init(&config)?;

    for warning in &validation.warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }

    let store = connect_store(&config).await?;

    let provider =
        OpenMeteoProvider::with_base_url(&config.weather_api_url, config.provider_timeout())
            .context("Failed to build weather client")?;

    let state = AppState::new(
        store.clone(),
        Arc::new(provider),
        config.cache_ttl(),
        config.weather_timezone.clone(),
    );
    let app = create_app(state, config.request_timeout());

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(address = %addr, "SkyCache listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down");
    if let Err(e) = store.close().await {
        warn!(error = %e, "Store did not close cleanly");
    }

    Ok(())
}

async fn connect_store(config: &Config) -> Result<Arc<dyn Store>> {
    if config.uses_memory_store() {
        info!("Using the in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let url = config.redacted_redis_url();
    match RedisStore::connect(&config.redis_url, config.connect_timeout()).await {
        Ok(store) => {
            info!(redis_url = %url, "Connected to Redis");
            Ok(Arc::new(store))
        }
        Err(e) => {
            error!(redis_url = %url, error = %e, "Failed to connect to Redis");
            Err(e).context("Failed to connect to Redis")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
