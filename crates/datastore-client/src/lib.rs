//! Datastore client
//!
//! The narrow capability the node bootstrap and `netctl` need from the
//! network datastore: a connectivity probe, listing resources of a kind,
//! and creating or replacing single resources.
//!
//! # Example
//!
//! ```no_run
//! use datastore_client::{DatastoreClient, DatastoreClientTrait};
//! use resources::{ResourceKind, ResourceMetadata};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DatastoreClient::new("http://127.0.0.1:8080".to_string(), None)?;
//! client.probe().await?;
//! let pools = client.list(ResourceKind::IpPool, &ResourceMetadata::default()).await?;
//! println!("{} pools configured", pools.len());
//! # Ok(())
//! # }
//! ```
//!
//! Enable the `test-util` feature for [`MockDatastoreClient`], an in-memory
//! implementation with call recording and failure injection.

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod datastore_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::DatastoreClient;
pub use datastore_trait::DatastoreClientTrait;
pub use error::DatastoreError;
#[cfg(feature = "test-util")]
pub use mock::{MockCall, MockDatastoreClient};
