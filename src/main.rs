use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Arg, Command};
use signage::app::Application;
use signage::common::{init_logging, load_config, wait_for_shutdown_signal, StartupConfig};
use signage::shutdown::ShutdownManager;
use signage_config::{LogLevel, OutputFormat};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("signage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Digital signage widget runtime")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .value_name("FILE")
                .help("Widget catalog (JSON), overrides display.catalog_path"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level")
                .value_parser(clap::value_parser!(LogLevel)),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("Log format")
                .value_parser(clap::value_parser!(OutputFormat)),
        )
        .get_matches();

    let startup = StartupConfig {
        config_path: matches.get_one::<String>("config").cloned(),
        catalog_path: matches.get_one::<String>("catalog").cloned(),
        log_level: matches.get_one::<LogLevel>("log-level").copied(),
        log_format: matches.get_one::<OutputFormat>("log-format").copied(),
    };

    let config = load_config(&startup)?;
    init_logging(&config.logging)?;

    info!("Starting signage runtime");
    info!("Catalog: {}", config.display.catalog_path);

    let app = Arc::new(Application::new(config)?);
    let shutdown_manager = ShutdownManager::new();

    let mut app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        let app = Arc::clone(&app);
        tokio::spawn(async move { app.run(shutdown_rx).await })
    };

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            info!("Shutting down gracefully");
            shutdown_manager.shutdown().await;

            match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
                Ok(Ok(Ok(()))) => info!("Signage runtime stopped"),
                Ok(Ok(Err(e))) => error!("Signage runtime failed: {e:#}"),
                Ok(Err(e)) => error!("Signage runtime task failed: {e}"),
                Err(_) => warn!("Timed out waiting for the runtime to stop"),
            }
        }
        result = &mut app_handle => {
            result??;
        }
    }

    Ok(())
}
