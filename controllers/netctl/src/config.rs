//! Client connection configuration.
//!
//! Resolution order for each setting: the configuration file, then the
//! `DATASTORE_ENDPOINT` / `DATASTORE_TOKEN` environment variables, then the
//! built-in default. A missing file is only an error when it was named
//! explicitly with `--config`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/netctl/netctl.cfg";
pub const DEFAULT_DATASTORE_ENDPOINT: &str = "http://127.0.0.1:8080";

/// Contents of the configuration file. JSON is accepted as YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    datastore: DatastoreSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatastoreSection {
    endpoint: Option<String>,
    token: Option<String>,
}

/// Where and how to reach the datastore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub endpoint: String,
    pub token: Option<String>,
}

/// Resolve connection settings.
///
/// `explicit` is the `--config` argument, `lookup` reads environment variables.
pub fn load_connection<F>(explicit: Option<&Path>, lookup: F) -> Result<ConnectionSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let file = match explicit {
        Some(path) => read_config(path)?,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if path.exists() {
                read_config(&path)?
            } else {
                debug!("No configuration file at {}, using environment", path.display());
                ConfigFile::default()
            }
        }
    };

    let env = |key: &str| lookup(key).filter(|value| !value.is_empty());
    Ok(ConnectionSettings {
        endpoint: file
            .datastore
            .endpoint
            .or_else(|| env("DATASTORE_ENDPOINT"))
            .unwrap_or_else(|| DEFAULT_DATASTORE_ENDPOINT.to_string()),
        token: file.datastore.token.or_else(|| env("DATASTORE_TOKEN")),
    })
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse configuration file {}", path.display()))
}
