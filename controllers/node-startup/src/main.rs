//! Node Startup
//!
//! Runs once when a node boots, before the node agent starts:
//! - Validates the IPv4 and IPv6 address autodetection methods
//! - Waits (bounded) for the datastore to become reachable
//! - Creates the default IPv4 and IPv6 pools if they are missing
//!
//! Every failure maps to a distinct exit status, see [`error`].

mod autodetection;
mod bootstrap;
mod config;
mod error;
mod ip_pools;
mod readiness;
mod validation;

#[cfg(test)]
mod test_utils;

use std::process::ExitCode;

use autodetection::SystemResolver;
use config::StartupConfig;
use datastore_client::DatastoreClient;
use error::StartupError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Node startup failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), StartupError> {
    info!("Starting node bootstrap");

    let config = StartupConfig::from_env()?;

    info!("Configuration:");
    info!("  Datastore endpoint: {}", config.datastore_endpoint);
    info!("  Probe interval: {:?}, maximum wait: {:?}", config.probe_interval, config.max_wait);
    info!("  IPv4 autodetection: {}", config.ipv4_autodetection_method);
    info!("  IPv6 autodetection: {}", config.ipv6_autodetection_method);
    info!(
        "  Default pools: {}",
        if config.intent.skip_default_pools { "disabled" } else { "enabled" }
    );

    let client = DatastoreClient::new(config.datastore_endpoint.clone(), config.datastore_token.clone())?;
    bootstrap::bootstrap(&config, &client, &SystemResolver).await?;

    info!("Node started successfully");
    Ok(())
}
