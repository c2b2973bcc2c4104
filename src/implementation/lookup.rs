//! Per-call memoizing lookups of users and products.
//!
//! Listings resolve display fields (buyer name, live product image, ...) with
//! point reads. One cache lives for one listing call so each distinct id is
//! read at most once. A failed or missing read is cached as `None` and the
//! caller falls back to the snapshot embedded in the order.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    config::CollectionConfig,
    store::DocumentStore,
    types::{Product, StoredRecord, UserProfile},
};

/// Lookup cache scoped to one listing call.
pub struct LookupCache<'a> {
    store:       &'a dyn DocumentStore,
    collections: &'a CollectionConfig,
    users:       HashMap<String, Option<UserProfile>>,
    products:    HashMap<String, Option<Product>>,
}

impl<'a> LookupCache<'a> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(store: &'a dyn DocumentStore, collections: &'a CollectionConfig) -> Self {
        Self { store, collections, users: HashMap::new(), products: HashMap::new() }
    }

    /// User profile by id.
    pub fn user(&mut self, id: &str) -> Option<&UserProfile> {
        let (store, collection) = (self.store, self.collections.users.as_str());
        self.users.entry(id.to_string()).or_insert_with(|| fetch(store, collection, id)).as_ref()
    }

    /// Product by id.
    pub fn product(&mut self, id: &str) -> Option<&Product> {
        let (store, collection) = (self.store, self.collections.products.as_str());
        self.products
            .entry(id.to_string())
            .or_insert_with(|| fetch(store, collection, id))
            .as_ref()
    }
}

fn fetch<T: StoredRecord>(store: &dyn DocumentStore, collection: &str, id: &str) -> Option<T> {
    match store.get(collection, id) {
        Ok(Some(stored)) => match T::from_stored(stored) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(collection, id, error = %err, "Lookup returned a malformed document");
                None
            },
        },
        Ok(None) => {
            debug!(collection, id, "Lookup target not found");
            None
        },
        Err(err) => {
            warn!(collection, id, error = %err, "Lookup failed, using fallback");
            None
        },
    }
}
