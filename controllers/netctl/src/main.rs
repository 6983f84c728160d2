//! netctl
//!
//! Creates or applies network resources (nodes, BGP peers, endpoints, IP
//! pools, policies and profiles) from YAML or JSON files.
//!
//! Resources are processed in file order and the command stops at the first
//! failure; the summary says how many were handled so a failed run can be
//! resumed by hand.

mod batch;
mod cli;
mod config;
mod error;
mod report;

use std::env;
use std::process::ExitCode;

use clap::Parser;
use datastore_client::DatastoreClient;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CtlError;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, stdout carries the summary
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli::usage_exit_code(&e));
        }
    };
    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<u8, CtlError> {
    let invocation = cli.command.into_invocation();
    let settings = config::load_connection(invocation.connection.config.as_deref(), |key| {
        env::var(key).ok()
    })?;
    info!("Using datastore at {}", settings.endpoint);

    let client = DatastoreClient::new(settings.endpoint, settings.token)?;
    let result = batch::execute_config_command(&invocation.source, invocation.action, &client).await;
    debug!("results: {:?}", result);

    let report = report::summarize(&result, invocation.action);
    for line in &report.lines {
        println!("{}", line);
    }
    Ok(report.exit_code)
}
