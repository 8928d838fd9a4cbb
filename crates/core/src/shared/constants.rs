/// Diarization overlaps shorter than this contribute no attribution.
pub const MIN_SPEAKER_OVERLAP_SECS: f64 = 0.3;

/// Share of a recognizer segment's duration above which a single speaker
/// may absorb edge-only minority attributions.
pub const DOMINANCE_THRESHOLD: f64 = 0.8;

/// Width of the leading/trailing edge window, as a fraction of the
/// segment's duration, inside which minority overlap counts as noise.
pub const EDGE_WINDOW_FRACTION: f64 = 0.1;

/// How far (in chars) a proportional split point may move to land on
/// whitespace instead of cutting through a word.
pub const SNAP_WINDOW_CHARS: usize = 12;

/// Words of lookahead when deciding whether a recognizer boundary is a
/// misaligned echo of an imminent speaker change.
pub const BOUNDARY_LOOKAHEAD_WORDS: usize = 3;

/// Utterances shorter than this try to merge into a same-speaker neighbor.
pub const MIN_UTTERANCE_WORDS: usize = 3;

/// Default minimum sentence length for recognizer-boundary splits.
pub const DEFAULT_MIN_CHUNK_WORDS: usize = 10;

/// Default minimum sentence length for semantic-hint splits.
pub const DEFAULT_MIN_SEMANTIC_WORDS: usize = 18;

/// Semantic hint scores at or above this count as a boundary signal.
pub const SEMANTIC_HINT_THRESHOLD: f32 = 0.5;

/// Characters that terminate a sentence when trailing a word.
pub const TERMINAL_MARKS: &[char] = &['.', '!', '?', '…'];
