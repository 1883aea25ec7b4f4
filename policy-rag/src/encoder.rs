//! Bag-of-keywords feature encoder.
//!
//! [`FeatureEncoder`] turns any text into a vector over a [`Vocabulary`].
//! Each component counts the whitespace tokens that contain the keyword or
//! are contained in it, and the vector is then L2-normalized. Encoding is
//! pure: the same text always yields the same vector.
//!
//! # Example
//!
//! ```rust,ignore
//! use policy_rag::FeatureEncoder;
//!
//! let encoder = FeatureEncoder::default();
//! let values = encoder.encode("How many vacation days do I get?");
//! assert_eq!(values.len(), encoder.dimensions());
//! ```

use crate::document::{FeatureVector, PolicyDocument};
use crate::error::{RagError, Result};
use crate::vocabulary::Vocabulary;

/// Encodes text into keyword feature vectors.
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    vocabulary: Vocabulary,
}

impl FeatureEncoder {
    /// Create an encoder over a custom vocabulary.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Return the vocabulary that defines the feature space.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Return the dimensionality of vectors produced by this encoder.
    pub fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    /// Encode text into a normalized vector.
    ///
    /// Returns the all-zero vector when no keyword matches, including for
    /// empty or whitespace-only input.
    pub fn encode(&self, text: &str) -> Vec<f32> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.split_whitespace().collect();

        let mut values: Vec<f32> = self
            .vocabulary
            .keywords()
            .iter()
            .map(|keyword| {
                tokens
                    .iter()
                    .filter(|token| token.contains(keyword.as_str()) || keyword.contains(**token))
                    .count() as f32
            })
            .collect();

        let magnitude = l2_norm(&values);
        if magnitude > 0.0 {
            values.iter_mut().for_each(|v| *v /= magnitude);
        }
        values
    }

    /// Encode a policy over `title + " " + content`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Corpus`] if the document has a blank id or the
    /// resulting vector is not finite.
    pub fn encode_document(&self, document: &PolicyDocument) -> Result<FeatureVector> {
        if document.id.trim().is_empty() {
            return Err(RagError::Corpus(format!(
                "policy '{}' has an empty id",
                document.title
            )));
        }

        let values = self.encode(&document.searchable_text());
        if values.iter().any(|v| !v.is_finite()) {
            return Err(RagError::Corpus(format!(
                "policy '{}' produced a non-finite feature vector",
                document.id
            )));
        }

        Ok(FeatureVector { document_id: document.id.clone(), values })
    }
}

/// Euclidean magnitude of a vector.
pub fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|x| x * x).sum::<f32>().sqrt()
}
