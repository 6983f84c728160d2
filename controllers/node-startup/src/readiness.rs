//! Datastore readiness gate.
//!
//! Probes the datastore at a fixed interval until it answers or the overall
//! wait budget runs out. Unreachable is the only retryable outcome; any other
//! error is reported immediately.

use std::time::Duration;

use datastore_client::DatastoreClientTrait;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info};

use crate::error::StartupError;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Block until the datastore is reachable.
///
/// Returns the number of probes it took. A probe that hangs counts against
/// `max_wait` like any other.
pub async fn wait_for_connection(
    client: &dyn DatastoreClientTrait,
    probe_interval: Duration,
    max_wait: Duration,
) -> Result<u32, StartupError> {
    if probe_interval.is_zero() || max_wait.is_zero() {
        return Err(StartupError::InvalidConfig(
            "datastore probe interval and maximum wait must be greater than zero".to_string(),
        ));
    }

    info!("Checking datastore connection at {}", client.endpoint());
    let started = Instant::now();
    let mut attempts = 0u32;

    let outcome = timeout(max_wait, poll(client, probe_interval, &mut attempts)).await;
    match outcome {
        Ok(Ok(())) => {
            info!("Datastore connection verified after {} probe(s)", attempts);
            Ok(attempts)
        }
        Ok(Err(e)) => {
            error!("Datastore at {} returned an error: {}", client.endpoint(), e);
            Err(StartupError::Datastore(e))
        }
        Err(_) => {
            let waited = started.elapsed();
            let error_msg = format!(
                "Datastore at {} not reachable after {:?} ({} probe(s))",
                client.endpoint(),
                waited,
                attempts
            );
            error!("{}", error_msg);
            Err(StartupError::DatastoreTimeout {
                endpoint: client.endpoint().to_string(),
                waited,
                attempts,
            })
        }
    }
}

async fn poll(
    client: &dyn DatastoreClientTrait,
    probe_interval: Duration,
    attempts: &mut u32,
) -> Result<(), datastore_client::DatastoreError> {
    loop {
        *attempts += 1;
        match client.probe().await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_unreachable() => {
                info!("Waiting for datastore connection ({})", e);
                debug!("Probe {} failed, retrying in {:?}", attempts, probe_interval);
                sleep(probe_interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}
