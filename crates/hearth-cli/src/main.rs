//! Hearth CLI - starts a tenant backend on the secured transport

mod cli;
mod config;
mod tenants;

use std::sync::Arc;

use anyhow::{bail, Context as _};
use clap::Parser;
use tracing::{error, info};

use hearth_runtime::{AllowAny, BackendRuntime, ZmqTransport};

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = load_configuration(&cli)?;
    check_credentials(&config)?;

    let mut tenant = tenants::build(&config.tenant)
        .with_context(|| format!("unknown tenant module: {}", config.tenant))?;

    let transport = ZmqTransport::bind(&config.transport, Arc::new(AllowAny))
        .context("transport bootstrap failed")?;
    let mut runtime = BackendRuntime::new(transport);

    runtime
        .init_tenant(tenant.as_mut())
        .context("tenant initialization failed")?;

    info!(tenant = %config.tenant, "backend initialized");
    if let Err(err) = runtime.run(tenant.as_mut()) {
        error!(error = %err, "event loop failed");
        runtime.shutdown(tenant.as_mut());
        std::process::exit(1);
    }

    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults, then apply flag overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        info!(path = %config_path.display(), "loading configuration");
        AppConfig::load_from_file(config_path)?
    } else {
        AppConfig::default()
    };
    config.apply_overrides(cli);
    Ok(config)
}

/// Both credential files must exist before the runtime is constructed
fn check_credentials(config: &AppConfig) -> anyhow::Result<()> {
    for path in [
        &config.transport.backend_cert,
        &config.transport.frontend_cert,
    ] {
        if !path.is_file() {
            bail!("credential file {} is missing", path.display());
        }
    }
    Ok(())
}
