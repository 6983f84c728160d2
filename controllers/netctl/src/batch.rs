//! Resource batch applier.
//!
//! Resources are submitted in file order, one at a time, and the batch stops
//! at the first failure. The result keeps enough counts for the caller to
//! see how far the batch got and resume by hand.

use std::path::PathBuf;

use datastore_client::{DatastoreClientTrait, DatastoreError};
use resources::{decode_documents, ResourceDocument, ResourceKind};
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

use crate::error::BatchError;

/// What to do with each resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchAction {
    /// Create; an existing resource is an error unless `skip_existing`
    Create { skip_existing: bool },
    /// Create or replace the whole specification
    Apply,
}

impl BatchAction {
    pub fn verb(&self) -> &'static str {
        match self {
            BatchAction::Create { .. } => "create",
            BatchAction::Apply => "apply",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            BatchAction::Create { .. } => "created",
            BatchAction::Apply => "applied",
        }
    }
}

/// Where resources are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// "-" means standard input
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    async fn read(&self) -> Result<String, BatchError> {
        match self {
            InputSource::Stdin => {
                let mut contents = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut contents)
                    .await
                    .map_err(|source| BatchError::Io {
                        path: PathBuf::from("<stdin>"),
                        source,
                    })?;
                Ok(contents)
            }
            InputSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| BatchError::Io {
                    path: path.clone(),
                    source,
                }),
        }
    }
}

/// Outcome of one batch
#[derive(Debug, Default)]
pub struct ResourceBatchResult {
    /// Resources decoded from the input
    pub num_resources: usize,
    /// Resources successfully handled before the batch stopped
    pub num_handled: usize,
    /// The kind shared by every resource, if there is exactly one
    pub single_kind: Option<ResourceKind>,
    /// The input could not be read or decoded; nothing was attempted
    pub file_invalid: bool,
    /// Why the batch stopped
    pub err: Option<BatchError>,
}

impl ResourceBatchResult {
    fn invalid(err: BatchError) -> Self {
        Self {
            file_invalid: true,
            err: Some(err),
            ..Default::default()
        }
    }
}

/// Read and decode `source`, then run the batch.
pub async fn execute_config_command(
    source: &InputSource,
    action: BatchAction,
    client: &dyn DatastoreClientTrait,
) -> ResourceBatchResult {
    match source.read().await {
        Ok(contents) => execute_text(&contents, action, client).await,
        Err(e) => {
            error!("{}", e);
            ResourceBatchResult::invalid(e)
        }
    }
}

/// Decode `contents` and run the batch. Nothing is submitted if any document
/// fails to decode.
pub async fn execute_text(
    contents: &str,
    action: BatchAction,
    client: &dyn DatastoreClientTrait,
) -> ResourceBatchResult {
    match decode_documents(contents) {
        Ok(documents) => apply_batch(&documents, action, client).await,
        Err(e) => {
            error!("Failed to decode resources: {}", e);
            ResourceBatchResult::invalid(e.into())
        }
    }
}

/// Submit `documents` in order, stopping at the first failure.
pub async fn apply_batch(
    documents: &[ResourceDocument],
    action: BatchAction,
    client: &dyn DatastoreClientTrait,
) -> ResourceBatchResult {
    let mut result = ResourceBatchResult {
        num_resources: documents.len(),
        single_kind: single_kind(documents),
        ..Default::default()
    };

    for document in documents {
        match submit(document, action, client).await {
            Ok(()) => result.num_handled += 1,
            Err(e) => {
                warn!(
                    "Failed to {} {} resource {} of {}: {}",
                    action.verb(),
                    document.kind,
                    result.num_handled + 1,
                    result.num_resources,
                    e
                );
                result.err = Some(e);
                break;
            }
        }
    }

    debug!(
        "Batch finished: {} of {} handled",
        result.num_handled, result.num_resources
    );
    result
}

async fn submit(
    document: &ResourceDocument,
    action: BatchAction,
    client: &dyn DatastoreClientTrait,
) -> Result<(), BatchError> {
    let key = document.key()?;
    match action {
        BatchAction::Apply => {
            client.apply(document).await?;
            info!("Applied {}", key);
        }
        BatchAction::Create { skip_existing } => match client.create(document).await {
            Ok(_) => info!("Created {}", key),
            Err(DatastoreError::AlreadyExists(_)) if skip_existing => {
                info!("Skipping {}, it already exists", key);
            }
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

fn single_kind(documents: &[ResourceDocument]) -> Option<ResourceKind> {
    let first = documents.first()?.kind;
    documents.iter().all(|d| d.kind == first).then_some(first)
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;
