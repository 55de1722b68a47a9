use anyhow::{Context, Result};
use signage_config::{AppConfig, LogConfig, LogLevel, OutputFormat};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Settings taken from the command line before the configuration is loaded.
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    pub config_path: Option<String>,
    pub catalog_path: Option<String>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<OutputFormat>,
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(logging: &LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_string()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format {
        OutputFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("failed to initialize JSON logging")?,
        OutputFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .context("failed to initialize pretty logging")?,
        OutputFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()
            .context("failed to initialize text logging")?,
    }

    Ok(())
}

/// Load the configuration and apply command line overrides on top of it.
pub fn load_config(startup: &StartupConfig) -> Result<AppConfig> {
    let mut config = AppConfig::load(startup.config_path.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            startup.config_path.as_deref().unwrap_or("default locations")
        )
    })?;

    if let Some(ref catalog_path) = startup.catalog_path {
        config.display.catalog_path = catalog_path.clone();
    }
    if let Some(level) = startup.log_level {
        config.logging.level = level;
    }
    if let Some(format) = startup.log_format {
        config.logging.format = format;
    }

    Ok(config)
}

/// Resolve on Ctrl-C or, on unix, SIGTERM.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl-C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}
