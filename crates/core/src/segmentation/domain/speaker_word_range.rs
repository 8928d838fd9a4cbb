use crate::shared::ranges::WordRange;

/// A run of words attributed to one speaker (or to nobody, when no
/// diarization interval covers them).
///
/// The converter produces these in increasing, non-overlapping order.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeakerWordRange {
    pub speaker_id: Option<String>,
    pub range: WordRange,
}

impl SpeakerWordRange {
    pub fn new(speaker_id: Option<String>, range: WordRange) -> Self {
        Self { speaker_id, range }
    }

    /// Collapses adjacent ranges that carry the same speaker. Empty ranges
    /// are dropped.
    pub fn coalesce(ranges: Vec<SpeakerWordRange>) -> Vec<SpeakerWordRange> {
        let mut out: Vec<SpeakerWordRange> = Vec::with_capacity(ranges.len());
        for r in ranges {
            if r.range.is_empty() {
                continue;
            }
            match out.last_mut() {
                Some(prev) if prev.speaker_id == r.speaker_id && prev.range.end == r.range.start => {
                    prev.range.end = r.range.end;
                }
                _ => out.push(r),
            }
        }
        out
    }

    /// Speaker attributed to `word_index`, if any range covers it.
    pub fn speaker_at(ranges: &[SpeakerWordRange], word_index: usize) -> Option<&str> {
        ranges
            .iter()
            .find(|r| r.range.contains(word_index))
            .and_then(|r| r.speaker_id.as_deref())
    }
}
