use crate::shared::time_span::TimeSpan;

/// A diarization interval: one speaker talking over one stretch of time.
///
/// Intervals may overlap each other slightly and rarely line up with
/// recognizer segment edges; reconciling that is the converter's job.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerSegment {
    pub speaker_id: String,
    pub span: TimeSpan,
}

impl SpeakerSegment {
    pub fn new(speaker_id: impl Into<String>, span: TimeSpan) -> Self {
        Self {
            speaker_id: speaker_id.into(),
            span,
        }
    }

    /// Drops malformed intervals (zero or negative duration) and keeps the
    /// rest in their original order. Dropping is logged, never fatal.
    pub fn sanitize(segments: &[SpeakerSegment]) -> Vec<SpeakerSegment> {
        segments
            .iter()
            .filter(|s| {
                if s.span.is_valid() {
                    true
                } else {
                    log::warn!(
                        "Dropping malformed speaker interval for '{}': {:.3}-{:.3}",
                        s.speaker_id,
                        s.span.start,
                        s.span.end
                    );
                    false
                }
            })
            .cloned()
            .collect()
    }
}
