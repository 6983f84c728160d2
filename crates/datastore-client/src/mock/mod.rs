//! Mock DatastoreClient for unit testing
//!
//! In-memory implementation of [`DatastoreClientTrait`] for tests that must
//! not depend on a running datastore. Resources are kept in insertion order,
//! every call is recorded, and failures can be injected:
//! - `faults.rs` - unreachable/hanging probes and per-resource failures

mod faults;

use crate::datastore_trait::DatastoreClientTrait;
use crate::error::DatastoreError;
use faults::Faults;
use resources::{ResourceDocument, ResourceKey, ResourceKind, ResourceMetadata};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call made against the mock, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Probe,
    List(ResourceKind),
    Create(ResourceKey),
    Apply(ResourceKey),
}

/// Mock DatastoreClient for testing
///
/// Clones share the same store, so a test can keep a handle for assertions
/// while the code under test owns another.
#[derive(Debug, Clone)]
pub struct MockDatastoreClient {
    pub(crate) endpoint: String,
    pub(crate) resources: Arc<Mutex<Vec<(ResourceKey, ResourceDocument)>>>,
    pub(crate) calls: Arc<Mutex<Vec<MockCall>>>,
    pub(crate) faults: Arc<Mutex<Faults>>,
}

/// Lock a mock mutex, recovering from a panicked test thread
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDatastoreClient {
    /// Create a new, empty, reachable mock
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            resources: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// Add a resource to the mock store without recording a call (for test setup)
    pub fn add_resource(&self, resource: ResourceDocument) -> Result<(), DatastoreError> {
        let key = resource.key()?;
        self.store(key, resource);
        Ok(())
    }

    /// Snapshot of every stored resource, in insertion order
    pub fn resources(&self) -> Vec<ResourceDocument> {
        lock(&self.resources).iter().map(|(_, doc)| doc.clone()).collect()
    }

    /// Stored resources of one kind
    pub fn resources_of(&self, kind: ResourceKind) -> Vec<ResourceDocument> {
        lock(&self.resources)
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .map(|(_, doc)| doc.clone())
            .collect()
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Number of create/apply calls made so far
    pub fn mutating_calls(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, MockCall::Create(_) | MockCall::Apply(_)))
            .count()
    }

    fn record(&self, call: MockCall) {
        lock(&self.calls).push(call);
    }

    fn store(&self, key: ResourceKey, resource: ResourceDocument) -> bool {
        let mut resources = lock(&self.resources);
        match resources.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => {
                entry.1 = resource;
                true
            }
            None => {
                resources.push((key, resource));
                false
            }
        }
    }

    fn exists(&self, key: &ResourceKey) -> bool {
        lock(&self.resources).iter().any(|(existing, _)| existing == key)
    }
}

#[async_trait::async_trait]
impl DatastoreClientTrait for MockDatastoreClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn probe(&self) -> Result<(), DatastoreError> {
        self.record(MockCall::Probe);
        let outcome = faults::probe_outcome(&self.faults);
        match outcome {
            faults::ProbeOutcome::Ready => Ok(()),
            faults::ProbeOutcome::Unreachable => {
                Err(DatastoreError::Unreachable(format!("{} is not accepting connections", self.endpoint)))
            }
            faults::ProbeOutcome::Hang => std::future::pending().await,
        }
    }

    async fn list(&self, kind: ResourceKind, selector: &ResourceMetadata) -> Result<Vec<ResourceDocument>, DatastoreError> {
        self.record(MockCall::List(kind));
        let list_error = lock(&self.faults).list_error.clone();
        if let Some(message) = list_error {
            return Err(DatastoreError::Api(message));
        }
        Ok(lock(&self.resources)
            .iter()
            .filter(|(key, doc)| key.kind == kind && doc.metadata.matches(selector))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn create(&self, resource: &ResourceDocument) -> Result<ResourceDocument, DatastoreError> {
        let key = resource.key()?;
        self.record(MockCall::Create(key.clone()));
        faults::check_resource(&self.faults, &key)?;
        if self.exists(&key) {
            return Err(DatastoreError::AlreadyExists(key.to_string()));
        }
        self.store(key, resource.clone());
        Ok(resource.clone())
    }

    async fn apply(&self, resource: &ResourceDocument) -> Result<ResourceDocument, DatastoreError> {
        let key = resource.key()?;
        self.record(MockCall::Apply(key.clone()));
        faults::check_resource(&self.faults, &key)?;
        self.store(key, resource.clone());
        Ok(resource.clone())
    }
}
