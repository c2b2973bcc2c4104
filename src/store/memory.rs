//! In-memory document store.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use super::{
    Document, DocumentStore, Filter, StoreError, StoreResult, StoredDocument, VERSION_FIELD,
    WriteBatch, WriteKind, document_version,
};

type Collections = HashMap<String, HashMap<String, Document>>;
type DocKey = (String, String);

/// Document store held in process memory.
///
/// Commits resolve every write of a batch first and store the touched
/// documents only when all preconditions held. Failure injection hooks let tests
/// exercise the error paths of the services built on top.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentStore {
    collections:      Arc<Mutex<Collections>>,
    fail_next_commit: Arc<Mutex<Option<String>>>,
    failing_reads:    Arc<Mutex<Vec<String>>>,
    read_counts:      Arc<Mutex<HashMap<String, usize>>>,
    fixed_time:       Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document without version checks.
    pub fn insert(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()> {
        let mut collections = self.collections.lock().map_err(|_| StoreError::LockPoisoned)?;
        collections.entry(collection.to_string()).or_default().insert(id.to_string(), doc);
        Ok(())
    }

    /// Makes the next `commit` fail with `Unavailable`.
    pub fn fail_next_commit(&self, reason: impl Into<String>) {
        if let Ok(mut guard) = self.fail_next_commit.lock() {
            *guard = Some(reason.into());
        }
    }

    /// Makes every point read on `collection` fail with `Unavailable`.
    pub fn fail_reads_for(&self, collection: impl Into<String>) {
        if let Ok(mut guard) = self.failing_reads.lock() {
            guard.push(collection.into());
        }
    }

    /// Number of point reads served for a collection.
    #[must_use]
    pub fn read_count(&self, collection: &str) -> usize {
        self.read_counts
            .lock()
            .map(|counts| counts.get(collection).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Pins the server clock.
    pub fn set_time(&self, time: DateTime<Utc>) {
        if let Ok(mut guard) = self.fixed_time.lock() {
            *guard = Some(time);
        }
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    /// Resolves every write of the batch against the current state without
    /// touching it. Later writes to the same document see the earlier ones.
    fn stage(
        collections: &Collections, batch: &WriteBatch,
    ) -> StoreResult<HashMap<DocKey, Document>> {
        let mut staged: HashMap<DocKey, Document> = HashMap::new();

        for op in batch.ops() {
            let key = (op.collection.clone(), op.id.clone());
            let existing = staged
                .get(&key)
                .or_else(|| collections.get(&op.collection).and_then(|docs| docs.get(&op.id)));
            let found = existing.map_or(0, document_version);

            if let Some(expected) = op.expected_version
                && found != expected
            {
                return Err(StoreError::VersionConflict {
                    collection: op.collection.clone(),
                    id: op.id.clone(),
                    expected,
                    found,
                });
            }

            let mut next = match &op.kind {
                WriteKind::Set(doc) => doc.clone(),
                WriteKind::Merge(fields) => {
                    let mut current = existing.cloned().ok_or_else(|| StoreError::NotFound {
                        collection: op.collection.clone(),
                        id:         op.id.clone(),
                    })?;
                    for (key, value) in fields {
                        current.insert(key.clone(), value.clone());
                    }
                    current
                },
            };

            if let Some(expected) = op.expected_version {
                next.insert(VERSION_FIELD.to_string(), Value::from(expected + 1));
            }

            staged.insert(key, next);
        }
        Ok(staged)
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        if let Ok(mut counts) = self.read_counts.lock() {
            *counts.entry(collection.to_string()).or_insert(0) += 1;
        }

        let failing = self.failing_reads.lock().map_err(|_| StoreError::LockPoisoned)?;
        if failing.iter().any(|c| c == collection) {
            return Err(StoreError::Unavailable(format!("reads on '{collection}' are failing")));
        }
        drop(failing);

        let collections = self.collections.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| StoredDocument { id: id.to_string(), data: data.clone() }))
    }

    fn query(&self, collection: &str, filters: &[Filter]) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.collections.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut results: Vec<StoredDocument> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| filters.iter().all(|f| f.matches(doc)))
                    .map(|(id, doc)| StoredDocument { id: id.clone(), data: doc.clone() })
                    .collect()
            })
            .unwrap_or_default();

        // HashMap order is arbitrary; keep listings stable
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(results)
    }

    fn allocate_id(&self, collection: &str) -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        debug!(collection, id = %id, "Document id allocated");
        id
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        if let Some(reason) =
            self.fail_next_commit.lock().map_err(|_| StoreError::LockPoisoned)?.take()
        {
            return Err(StoreError::Unavailable(reason));
        }

        let mut collections = self.collections.lock().map_err(|_| StoreError::LockPoisoned)?;
        let staged = Self::stage(&collections, &batch)?;
        for ((collection, id), doc) in staged {
            collections.entry(collection).or_default().insert(id, doc);
        }

        debug!(writes = batch.len(), "Batch committed");
        Ok(())
    }

    fn server_time(&self) -> DateTime<Utc> {
        self.fixed_time.lock().ok().and_then(|t| *t).unwrap_or_else(Utc::now)
    }
}
