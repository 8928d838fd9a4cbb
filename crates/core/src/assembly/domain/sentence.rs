use crate::shared::ranges::WordRange;

/// The contiguous portion of a sentence spoken by one speaker.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub speaker_id: Option<String>,
    pub word_range: WordRange,
}

/// A finalized sentence with its per-speaker breakdown.
///
/// Invariant: the utterances' word ranges are contiguous, non-overlapping,
/// and their union equals `word_range`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sentence {
    pub text: String,
    pub utterances: Vec<Utterance>,
    pub primary_speaker: Option<String>,
    pub word_range: WordRange,
}

impl Sentence {
    /// Builds a sentence from an ordered utterance partition, deriving the
    /// display text and the primary speaker (most words; first on ties).
    pub fn from_utterances(utterances: Vec<Utterance>, word_range: WordRange) -> Self {
        let text = utterances
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let primary_speaker = primary_speaker(&utterances);
        Self {
            text,
            utterances,
            primary_speaker,
            word_range,
        }
    }
}

fn primary_speaker(utterances: &[Utterance]) -> Option<String> {
    let mut totals: Vec<(&str, usize)> = Vec::new();
    for u in utterances {
        if let Some(id) = u.speaker_id.as_deref() {
            match totals.iter_mut().find(|(s, _)| *s == id) {
                Some((_, n)) => *n += u.word_range.len(),
                None => totals.push((id, u.word_range.len())),
            }
        }
    }
    // max_by_key keeps the last maximum; reverse so ties go to the
    // earliest speaker in the sentence.
    totals
        .iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(id, _)| id.to_string())
}
