//! # Document Store Adapter
//!
//! The hosted document database is an opaque collaborator. Everything the
//! order engine needs from it is expressed by [`DocumentStore`]: point reads,
//! equality queries, store-assigned ids, a server clock and an all-or-nothing
//! batch commit with optional per-document version preconditions.

mod memory;


use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

pub use memory::InMemoryDocumentStore;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field holding the optimistic-concurrency counter.
pub const VERSION_FIELD: &str = "version";

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Network or backend failure; the write did not happen.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
    /// A version precondition did not hold.
    #[error("Version conflict on {collection}/{id}: expected {expected}, found {found}")]
    VersionConflict {
        /// Collection name.
        collection: String,
        /// Document ID.
        id:         String,
        /// Expected version.
        expected:   u64,
        /// Version found.
        found:      u64,
    },
    /// Merge target does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document ID.
        id:         String,
    },
    /// Lock acquisition failed.
    #[error("Failed to acquire store lock")]
    LockPoisoned,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document ID.
    pub id:   String,
    /// Document body.
    pub data: Document,
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name.
    pub field: String,
    /// Expected value.
    pub value: Value,
}

impl Filter {
    /// Field equals value.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { field: field.into(), value: value.into() }
    }

    /// Whether a document satisfies the filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// How a write applies to its target.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteKind {
    /// Replace the whole document, creating it if absent.
    Set(Document),
    /// Overwrite the listed top-level fields of an existing document.
    Merge(Document),
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOp {
    /// Collection name.
    pub collection:       String,
    /// Document ID.
    pub id:               String,
    /// Write payload.
    pub kind:             WriteKind,
    /// Version the document must have for the batch to apply.
    pub expected_version: Option<u64>,
}

/// Writes committed together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a full-document write.
    pub fn set(
        &mut self, collection: impl Into<String>, id: impl Into<String>, doc: Document,
        expected_version: Option<u64>,
    ) -> &mut Self {
        self.ops.push(WriteOp {
            collection: collection.into(),
            id: id.into(),
            kind: WriteKind::Set(doc),
            expected_version,
        });
        self
    }

    /// Adds a partial-document write.
    pub fn merge(
        &mut self, collection: impl Into<String>, id: impl Into<String>, fields: Document,
    ) -> &mut Self {
        self.ops.push(WriteOp {
            collection:       collection.into(),
            id:               id.into(),
            kind:             WriteKind::Merge(fields),
            expected_version: None,
        });
        self
    }

    /// Adds a partial-document write guarded by a version precondition.
    pub fn merge_versioned(
        &mut self, collection: impl Into<String>, id: impl Into<String>, fields: Document,
        expected_version: u64,
    ) -> &mut Self {
        self.ops.push(WriteOp {
            collection:       collection.into(),
            id:               id.into(),
            kind:             WriteKind::Merge(fields),
            expected_version: Some(expected_version),
        });
        self
    }

    /// Writes in the batch.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Collection/document storage used by every service in this crate.
pub trait DocumentStore: Send + Sync {
    /// Reads one document.
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Reads every document of a collection matching all filters.
    fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<StoredDocument>>;

    /// Reserves a store-assigned id for a document written later in a batch.
    fn allocate_id(&self, collection: &str) -> String;

    /// Inserts a document under a store-assigned id.
    fn create(&self, collection: &str, doc: Document) -> StoreResult<String> {
        let id = self.allocate_id(collection);
        let mut batch = WriteBatch::new();
        batch.set(collection, id.clone(), doc, None);
        self.commit(batch)?;
        Ok(id)
    }

    /// Applies every write of the batch atomically.
    fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Server clock used for `createdAt`/`updatedAt` and event timestamps.
    fn server_time(&self) -> DateTime<Utc>;
}

/// Reads the version counter of a document, treating a missing field as 0.
#[must_use]
pub fn document_version(doc: &Document) -> u64 {
    doc.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0)
}
