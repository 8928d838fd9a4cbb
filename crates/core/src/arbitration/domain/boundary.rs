/// Where a sentence-boundary signal came from, in descending priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundarySource {
    /// A diarization speaker transition, near-definitive.
    Speaker,
    /// A recognizer segment edge, an acoustic pause rather than grammar.
    Recognizer,
    /// A precomputed low-coherence hint, last-resort fallback.
    SemanticHint,
}

/// An accepted sentence boundary, kept for the decision trace.
///
/// `word_index` is the index of the first word of the *next* sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcceptedBoundary {
    pub word_index: usize,
    pub source: BoundarySource,
}
