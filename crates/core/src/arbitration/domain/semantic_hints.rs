use std::collections::HashMap;

use crate::shared::constants::SEMANTIC_HINT_THRESHOLD;

/// Precomputed low-coherence scores keyed by candidate boundary position
/// (the index of the first word of the would-be next sentence).
///
/// The scores come from an external embedding model; this engine treats
/// them as opaque and only thresholds them.
#[derive(Clone, Debug)]
pub struct SemanticHints {
    scores: HashMap<usize, f32>,
    threshold: f32,
}

impl Default for SemanticHints {
    fn default() -> Self {
        Self::new([])
    }
}

impl SemanticHints {
    pub fn new(scores: impl IntoIterator<Item = (usize, f32)>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
            threshold: SEMANTIC_HINT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn is_boundary(&self, word_index: usize) -> bool {
        self.scores
            .get(&word_index)
            .is_some_and(|s| *s >= self.threshold)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
