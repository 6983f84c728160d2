//! DatastoreClient trait for mocking
//!
//! The bootstrap and batch logic depend only on this trait. The REST
//! [`crate::DatastoreClient`] implements it for production, and tests use
//! the in-memory mock.

use crate::error::DatastoreError;
use resources::{ResourceDocument, ResourceKind, ResourceMetadata};

/// Datastore operations used by the node bootstrap and `netctl`.
///
/// Implementations must be safe to reuse sequentially within one process run.
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait DatastoreClientTrait: Send + Sync {
    /// Endpoint the client talks to, for log messages
    fn endpoint(&self) -> &str;

    /// Lightweight connectivity check
    async fn probe(&self) -> Result<(), DatastoreError>;

    /// List resources of `kind` whose metadata matches `selector`.
    ///
    /// Unset selector fields are wildcards; an empty selector lists everything.
    async fn list(&self, kind: ResourceKind, selector: &ResourceMetadata) -> Result<Vec<ResourceDocument>, DatastoreError>;

    /// Create a resource, failing with [`DatastoreError::AlreadyExists`] if
    /// one with the same primary identifier is already stored.
    async fn create(&self, resource: &ResourceDocument) -> Result<ResourceDocument, DatastoreError>;

    /// Create the resource if absent, otherwise replace its entire specification.
    async fn apply(&self, resource: &ResourceDocument) -> Result<ResourceDocument, DatastoreError>;
}
