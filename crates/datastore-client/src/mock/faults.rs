//! Failure injection for MockDatastoreClient

use super::{lock, MockDatastoreClient};
use crate::error::DatastoreError;
use resources::{ResourceDocument, ResourceKey};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct Faults {
    /// Probes that fail before the datastore reports ready
    unreachable_probes: u32,
    never_reachable: bool,
    hang_probes: bool,
    /// Create/apply of these resources fails with the given message
    failing_resources: HashMap<ResourceKey, String>,
    pub(crate) list_error: Option<String>,
}

pub(crate) enum ProbeOutcome {
    Ready,
    Unreachable,
    Hang,
}

pub(crate) fn probe_outcome(faults: &Mutex<Faults>) -> ProbeOutcome {
    let mut faults = lock(faults);
    if faults.hang_probes {
        ProbeOutcome::Hang
    } else if faults.never_reachable {
        ProbeOutcome::Unreachable
    } else if faults.unreachable_probes > 0 {
        faults.unreachable_probes -= 1;
        ProbeOutcome::Unreachable
    } else {
        ProbeOutcome::Ready
    }
}

pub(crate) fn check_resource(faults: &Mutex<Faults>, key: &ResourceKey) -> Result<(), DatastoreError> {
    match lock(faults).failing_resources.get(key) {
        Some(message) => Err(DatastoreError::InvalidRequest(message.clone())),
        None => Ok(()),
    }
}

impl MockDatastoreClient {
    /// Fail the next `probes` probes, then report ready
    pub fn set_unreachable_for(&self, probes: u32) {
        lock(&self.faults).unreachable_probes = probes;
    }

    /// Fail every probe
    pub fn set_never_reachable(&self) {
        lock(&self.faults).never_reachable = true;
    }

    /// Make every probe block forever
    pub fn set_hang_probes(&self) {
        lock(&self.faults).hang_probes = true;
    }

    /// Reject any create/apply of `resource` with `message`
    pub fn fail_resource(&self, resource: &ResourceDocument, message: impl Into<String>) -> Result<(), DatastoreError> {
        let key = resource.key()?;
        lock(&self.faults).failing_resources.insert(key, message.into());
        Ok(())
    }

    /// Make every list call fail
    pub fn fail_list(&self, message: impl Into<String>) {
        lock(&self.faults).list_error = Some(message.into());
    }
}
