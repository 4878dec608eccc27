/// Backend collaborators of the submission pipeline
///
/// This module defines the contracts the orchestrator relies on:
/// - Blob storage for the uploaded photo (blob.rs)
/// - Document storage for the submitted record (document.rs)
/// - Submission identifiers
///
/// Calls are blocking; the orchestrator runs them on a worker thread.

pub mod blob;
pub mod document;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StoreError;

pub use blob::LocalBlobStore;
pub use document::SqliteDocumentStore;

/// A flat JSON document as handed to the document store
pub type Document = Map<String, Value>;

/// Binary object storage with key-based put/resolve
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `key`, replacing anything already there
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Publicly fetchable locator for an existing blob
    fn resolve_locator(&self, key: &str) -> Result<String, StoreError>;
}

/// Structured record storage
pub trait DocumentStore: Send + Sync {
    /// Insert `document` into `collection` and return the store's own id
    fn insert(&self, collection: &str, document: &Document) -> Result<String, StoreError>;
}

/// Source of submission identifiers
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_is_unique() {
        let ids = UuidGenerator;
        let a = ids.next_id();
        let b = ids.next_id();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
