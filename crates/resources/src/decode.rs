//! Resource file decoding
//!
//! Accepts YAML or JSON. A file may hold a single document, a list of
//! documents, or a multi-document YAML stream separated by `---`.
//! Decoding is all-or-nothing: any bad document rejects the whole input.

use serde::Deserialize;
use tracing::debug;

use crate::document::{ResourceDocument, API_VERSION};
use crate::error::ResourceError;

/// Decode every resource document in `input`, preserving order.
///
/// Empty documents are skipped, so empty input yields an empty list.
pub fn decode_documents(input: &str) -> Result<Vec<ResourceDocument>, ResourceError> {
    let mut documents = Vec::new();

    for deserializer in serde_yaml::Deserializer::from_str(input) {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::Null => continue,
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    documents.push(decode_one(item)?);
                }
            }
            value => documents.push(decode_one(value)?),
        }
    }

    debug!("Decoded {} resource document(s)", documents.len());
    Ok(documents)
}

fn decode_one(value: serde_yaml::Value) -> Result<ResourceDocument, ResourceError> {
    let document: ResourceDocument = serde_yaml::from_value(value)?;
    if document.api_version != API_VERSION {
        return Err(ResourceError::UnsupportedApiVersion {
            found: document.api_version,
            expected: API_VERSION.to_string(),
        });
    }
    // Reject documents that cannot be identified before anything is applied
    document.key()?;
    Ok(document)
}
