//! Per-session set of documents whose open has been routed to the session.
//!
//! A [`TrackedDocuments`] entry exists from the moment an open is accepted
//! until the matching close is handled. The set is the idempotency guard for
//! lifecycle events: an open for a URI already present is a duplicate, and
//! will-save or close for a URI that is absent is a no-op.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::DocumentIdentity;

/// URI-keyed set of tracked documents, safe to share across tasks.
///
/// Cloning yields another handle to the same set.
#[derive(Clone, Debug, Default)]
pub struct TrackedDocuments {
    inner: Arc<DashMap<String, DocumentIdentity>>,
}

impl TrackedDocuments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has(&self, uri: &str) -> bool {
        self.inner.contains_key(uri)
    }

    /// Tracks a document unless its URI is already tracked.
    ///
    /// Returns `true` if the document was newly inserted. The check and the
    /// insertion happen under the same shard lock.
    pub fn insert(&self, document: DocumentIdentity) -> bool {
        match self.inner.entry(document.key().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(document);
                true
            }
        }
    }

    /// Stops tracking a URI and returns the identity it was tracked under.
    pub fn remove(&self, uri: &str) -> Option<DocumentIdentity> {
        self.inner.remove(uri).map(|(_, document)| document)
    }

    #[must_use]
    pub fn get(&self, uri: &str) -> Option<DocumentIdentity> {
        self.inner.get(uri).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Snapshot of the tracked URIs, in no particular order.
    #[must_use]
    pub fn uris(&self) -> Vec<String> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}
