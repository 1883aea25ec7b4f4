//! Cosine-similarity ranking against a [`PolicyIndex`] snapshot.

use crate::document::RankedMatch;
use crate::encoder::l2_norm;
use crate::index::PolicyIndex;

/// Matches scoring at or below this are dropped after truncation.
pub const RELEVANCE_FLOOR: f32 = 0.1;

/// Compute cosine similarity between two vectors.
///
/// Uses the general formula rather than a bare dot product so the result
/// stays correct for inputs that are not unit length. Returns 0.0 if either
/// vector has zero magnitude. The result is clamped to `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let denominator = l2_norm(a) * l2_norm(b);
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (dot / denominator).clamp(-1.0, 1.0)
}

/// Score `query` against every indexed policy and return the best matches.
///
/// Candidates are sorted by descending score, ties keeping corpus order.
/// The list is truncated to `max_results` and then anything at or below
/// [`RELEVANCE_FLOOR`] is removed, so the result may be empty.
pub fn rank(index: &PolicyIndex, query: &[f32], max_results: usize) -> Vec<RankedMatch> {
    let mut scored: Vec<(usize, f32)> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(position, entry)| (position, cosine_similarity(query, &entry.vector.values)))
        .collect();

    // `sort_by` is stable, so equal scores stay in corpus order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(max_results);

    scored
        .into_iter()
        .filter(|(_, score)| *score > RELEVANCE_FLOOR)
        .map(|(position, score)| RankedMatch {
            document: index.vectors()[position].document.clone(),
            score,
        })
        .collect()
}
