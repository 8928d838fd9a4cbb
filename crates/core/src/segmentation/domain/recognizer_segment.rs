use crate::shared::ranges::CharRange;
use crate::shared::time_span::TimeSpan;

/// One span of recognized speech: text, its place on the audio timeline,
/// and its byte offset into the canonical concatenated text.
///
/// Read-only input for a pipeline run; produced upstream by the recognizer.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognizerSegment {
    pub text: String,
    pub span: TimeSpan,
    pub char_start: usize,
}

impl RecognizerSegment {
    pub fn new(text: impl Into<String>, span: TimeSpan, char_start: usize) -> Self {
        Self {
            text: text.into(),
            span,
            char_start,
        }
    }

    /// The segment's byte range within the canonical text.
    pub fn char_range(&self) -> CharRange {
        CharRange::new(self.char_start, self.char_start + self.text.len())
    }
}
