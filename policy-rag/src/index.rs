//! Immutable policy index and its atomically swapped handle.
//!
//! A [`PolicyIndex`] is built once from a corpus and never mutated. The
//! [`IndexHandle`] publishes the current index behind a
//! `tokio::sync::RwLock<Option<Arc<PolicyIndex>>>`: readers clone the `Arc`
//! and drop the lock immediately, and a rebuild constructs the new index
//! outside the lock and then replaces the pointer in one write. An in-flight
//! query therefore always ranks against one complete snapshot.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::document::{FeatureVector, PolicyDocument};
use crate::encoder::FeatureEncoder;
use crate::error::{RagError, Result};

/// A policy together with its feature vector.
#[derive(Debug, Clone)]
pub struct IndexedPolicy {
    /// The indexed policy.
    pub document: PolicyDocument,
    /// Its feature vector over `title + " " + content`.
    pub vector: FeatureVector,
}

/// Outcome of an index build.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    /// Documents that were indexed.
    pub indexed: usize,
    /// Documents that were skipped because they could not be encoded.
    pub skipped: usize,
}

/// One feature vector per policy, in corpus order.
#[derive(Debug, Clone)]
pub struct PolicyIndex {
    entries: Vec<IndexedPolicy>,
    dimensions: usize,
    skipped: usize,
}

impl PolicyIndex {
    /// Encode every document in `corpus`.
    ///
    /// A document that fails to encode, or that repeats an id already
    /// indexed, is logged and skipped; the rest of the corpus is still
    /// indexed.
    pub fn build(encoder: &FeatureEncoder, corpus: &[PolicyDocument]) -> Self {
        let mut entries = Vec::with_capacity(corpus.len());
        let mut seen = HashSet::new();
        let mut skipped = 0;

        for document in corpus {
            if seen.contains(document.id.as_str()) {
                warn!(document.id = %document.id, "skipping duplicate policy id");
                skipped += 1;
                continue;
            }
            match encoder.encode_document(document) {
                Ok(vector) => {
                    seen.insert(document.id.as_str());
                    entries.push(IndexedPolicy { document: document.clone(), vector });
                }
                Err(e) => {
                    warn!(document.id = %document.id, error = %e, "skipping policy that failed to encode");
                    skipped += 1;
                }
            }
        }

        Self { entries, dimensions: encoder.dimensions(), skipped }
    }

    /// The indexed policies with their vectors, in corpus order.
    pub fn vectors(&self) -> &[IndexedPolicy] {
        &self.entries
    }

    /// Number of indexed policies.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Whether no policy was indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality shared by every vector in the index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Indexed and skipped document counts from the build.
    pub fn stats(&self) -> IndexStats {
        IndexStats { indexed: self.entries.len(), skipped: self.skipped }
    }
}

/// Shared, swappable reference to the current [`PolicyIndex`].
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Option<Arc<PolicyIndex>>>,
}

impl IndexHandle {
    /// Create a handle with no index loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a new index from `corpus` and publish it.
    ///
    /// Queries already holding a snapshot keep using the old index until
    /// they finish.
    pub async fn rebuild(&self, encoder: &FeatureEncoder, corpus: &[PolicyDocument]) -> IndexStats {
        let index = Arc::new(PolicyIndex::build(encoder, corpus));
        let stats = index.stats();
        self.publish(index).await;
        info!(indexed = stats.indexed, skipped = stats.skipped, "policy index rebuilt");
        stats
    }

    /// Replace the current index with `index`.
    pub async fn publish(&self, index: Arc<PolicyIndex>) {
        *self.current.write().await = Some(index);
    }

    /// Take a snapshot of the current index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexUnavailable`] if no corpus has been loaded.
    pub async fn snapshot(&self) -> Result<Arc<PolicyIndex>> {
        self.current.read().await.clone().ok_or(RagError::IndexUnavailable)
    }

    /// Number of policies in the current index, or 0 before the first load.
    pub async fn size(&self) -> usize {
        self.current.read().await.as_ref().map_or(0, |index| index.size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Vocabulary;

    fn encoder() -> FeatureEncoder {
        FeatureEncoder::new(Vocabulary::new(["leave", "remote", "laptop"]))
    }

    #[test]
    fn build_keeps_corpus_order_and_dimensions() {
        let corpus = vec![
            PolicyDocument::new("a", "Leave", "annual leave", "Leave"),
            PolicyDocument::new("b", "Remote", "remote work", "Work"),
        ];
        let index = PolicyIndex::build(&encoder(), &corpus);
        assert_eq!(index.size(), 2);
        assert_eq!(index.dimensions(), 3);
        let ids: Vec<_> = index.vectors().iter().map(|e| e.document.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(index.vectors().iter().all(|e| e.vector.values.len() == 3));
    }

    #[test]
    fn bad_documents_are_skipped_not_fatal() {
        let corpus = vec![
            PolicyDocument::new("", "Broken", "leave", "Leave"),
            PolicyDocument::new("a", "Leave", "leave", "Leave"),
            PolicyDocument::new("a", "Leave again", "leave", "Leave"),
            PolicyDocument::new("b", "Remote", "remote", "Work"),
        ];
        let index = PolicyIndex::build(&encoder(), &corpus);
        assert_eq!(index.stats(), IndexStats { indexed: 2, skipped: 2 });
        assert_eq!(index.vectors()[0].document.title, "Leave");
    }

    #[tokio::test]
    async fn snapshot_before_load_is_unavailable() {
        let handle = IndexHandle::new();
        assert!(matches!(handle.snapshot().await, Err(RagError::IndexUnavailable)));
        assert_eq!(handle.size().await, 0);
    }

    #[tokio::test]
    async fn rebuild_does_not_disturb_existing_snapshots() {
        let handle = IndexHandle::new();
        let enc = encoder();
        handle.rebuild(&enc, &[PolicyDocument::new("old", "Leave", "leave", "Leave")]).await;
        let before = handle.snapshot().await.unwrap();

        handle
            .rebuild(
                &enc,
                &[
                    PolicyDocument::new("new1", "Remote", "remote", "Work"),
                    PolicyDocument::new("new2", "Laptop", "laptop", "IT"),
                ],
            )
            .await;

        assert_eq!(before.size(), 1);
        assert_eq!(before.vectors()[0].document.id, "old");
        assert_eq!(handle.size().await, 2);
        assert_eq!(handle.snapshot().await.unwrap().vectors()[0].document.id, "new1");
    }
}
