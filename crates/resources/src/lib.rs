//! Network resource definitions
//!
//! Declarative resource documents consumed by `netctl create`/`netctl apply`
//! and produced by the node bootstrap when it creates default IP pools.
//!
//! Every document carries an `apiVersion`, a `kind`, identifying `metadata`
//! and a free-form `spec`. The kind decides which metadata fields form the
//! primary identifier (see [`ResourceDocument::key`]).

pub mod decode;
pub mod document;
pub mod error;
pub mod ip_pool;
pub mod kind;
pub mod metadata;

pub use decode::decode_documents;
pub use document::*;
pub use error::ResourceError;
pub use ip_pool::*;
pub use kind::ResourceKind;
pub use metadata::*;
