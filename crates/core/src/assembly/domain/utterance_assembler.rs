use crate::assembly::domain::sentence::{Sentence, Utterance};
use crate::segmentation::domain::speaker_word_range::SpeakerWordRange;
use crate::shared::constants::MIN_UTTERANCE_WORDS;
use crate::shared::ranges::WordRange;

/// Subdivides a finalized sentence span into per-speaker utterances.
///
/// The output is an exact partition of the sentence's word range: no
/// gaps, no overlaps, no duplicated words. Words outside all speaker
/// coverage fold into a neighboring utterance rather than forming
/// speaker-less islands.
pub struct UtteranceAssembler {
    min_utterance_words: usize,
}

impl UtteranceAssembler {
    pub fn new(min_utterance_words: usize) -> Self {
        Self {
            min_utterance_words,
        }
    }

    pub fn assemble(
        &self,
        words: &[String],
        sentence_range: WordRange,
        speaker_ranges: &[SpeakerWordRange],
    ) -> Sentence {
        let mut pieces = self.intersect(sentence_range, speaker_ranges);
        self.absorb_unattributed(&mut pieces);
        self.merge_short(&mut pieces);

        let utterances = pieces
            .into_iter()
            .map(|p| Utterance {
                text: words[p.range.start..p.range.end].join(" "),
                speaker_id: p.speaker_id,
                word_range: p.range,
            })
            .collect();

        Sentence::from_utterances(utterances, sentence_range)
    }

    /// Ordered intersection of the sentence span with the speaker ranges,
    /// padded with unattributed pieces wherever coverage has holes.
    fn intersect(
        &self,
        sentence_range: WordRange,
        speaker_ranges: &[SpeakerWordRange],
    ) -> Vec<SpeakerWordRange> {
        let mut pieces = Vec::new();
        let mut cursor = sentence_range.start;

        for sr in speaker_ranges {
            let Some(overlap) = sr.range.intersect(&sentence_range) else {
                continue;
            };
            if overlap.start > cursor {
                pieces.push(SpeakerWordRange::new(
                    None,
                    WordRange::new(cursor, overlap.start),
                ));
            }
            pieces.push(SpeakerWordRange::new(sr.speaker_id.clone(), overlap));
            cursor = overlap.end;
        }
        if cursor < sentence_range.end {
            pieces.push(SpeakerWordRange::new(
                None,
                WordRange::new(cursor, sentence_range.end),
            ));
        }
        pieces
    }

    /// Unattributed pieces extend the previous utterance when one exists,
    /// otherwise the next one.
    fn absorb_unattributed(&self, pieces: &mut Vec<SpeakerWordRange>) {
        if pieces.iter().all(|p| p.speaker_id.is_none()) {
            // Fully unattributed sentence: keep one speaker-less piece.
            if pieces.len() > 1 {
                let whole = WordRange::new(
                    pieces.first().map(|p| p.range.start).unwrap_or(0),
                    pieces.last().map(|p| p.range.end).unwrap_or(0),
                );
                pieces.clear();
                pieces.push(SpeakerWordRange::new(None, whole));
            }
            return;
        }

        let mut out: Vec<SpeakerWordRange> = Vec::with_capacity(pieces.len());
        let mut pending_start: Option<usize> = None;

        for p in pieces.drain(..) {
            if p.speaker_id.is_none() {
                match out.last_mut() {
                    Some(prev) => prev.range.end = p.range.end,
                    None => pending_start = Some(pending_start.unwrap_or(p.range.start)),
                }
            } else {
                let mut piece = p;
                if let Some(start) = pending_start.take() {
                    piece.range.start = start;
                }
                out.push(piece);
            }
        }
        *pieces = out;
    }

    /// Merges utterances shorter than the minimum into a same-speaker
    /// neighbor. Different speakers are never merged.
    fn merge_short(&self, pieces: &mut Vec<SpeakerWordRange>) {
        let mut i = 0;
        while i < pieces.len() {
            if pieces[i].range.len() >= self.min_utterance_words || pieces.len() == 1 {
                i += 1;
                continue;
            }
            let prev_same =
                i > 0 && pieces[i - 1].speaker_id == pieces[i].speaker_id;
            let next_same =
                i + 1 < pieces.len() && pieces[i + 1].speaker_id == pieces[i].speaker_id;

            if prev_same {
                pieces[i - 1].range.end = pieces[i].range.end;
                pieces.remove(i);
            } else if next_same {
                pieces[i + 1].range.start = pieces[i].range.start;
                pieces.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl Default for UtteranceAssembler {
    fn default() -> Self {
        Self::new(MIN_UTTERANCE_WORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(String::from).collect()
    }

    fn range(id: Option<&str>, start: usize, end: usize) -> SpeakerWordRange {
        SpeakerWordRange::new(id.map(String::from), WordRange::new(start, end))
    }

    fn assert_partition(sentence: &Sentence) {
        let mut cursor = sentence.word_range.start;
        for u in &sentence.utterances {
            assert_eq!(u.word_range.start, cursor, "gap or overlap in partition");
            assert!(!u.word_range.is_empty());
            cursor = u.word_range.end;
        }
        assert_eq!(cursor, sentence.word_range.end);
    }

    #[test]
    fn test_single_speaker_single_utterance() {
        let w = words("eso es todo amigos");
        let sentence = UtteranceAssembler::default().assemble(
            &w,
            WordRange::new(0, 4),
            &[range(Some("A"), 0, 4)],
        );
        assert_eq!(sentence.utterances.len(), 1);
        assert_eq!(sentence.text, "eso es todo amigos");
        assert_partition(&sentence);
    }

    #[test]
    fn test_two_speakers_partition() {
        let w = words("Aquí. Listo, eso es todo");
        let sentence = UtteranceAssembler::new(1).assemble(
            &w,
            WordRange::new(0, 5),
            &[range(Some("A"), 0, 1), range(Some("B"), 1, 5)],
        );
        assert_eq!(sentence.utterances.len(), 2);
        assert_eq!(sentence.utterances[0].speaker_id.as_deref(), Some("A"));
        assert_eq!(sentence.utterances[1].text, "Listo, eso es todo");
        assert_eq!(sentence.primary_speaker.as_deref(), Some("B"));
        assert_partition(&sentence);
    }

    #[test]
    fn test_uncovered_words_extend_previous_utterance() {
        let w = words("uno dos tres cuatro cinco seis");
        let sentence = UtteranceAssembler::new(1).assemble(
            &w,
            WordRange::new(0, 6),
            &[range(Some("A"), 0, 3), range(Some("B"), 5, 6)],
        );
        // Words 3-4 have no coverage; they extend A's utterance.
        assert_eq!(sentence.utterances.len(), 2);
        assert_eq!(sentence.utterances[0].word_range, WordRange::new(0, 5));
        assert_partition(&sentence);
    }

    #[test]
    fn test_leading_uncovered_words_extend_next_utterance() {
        let w = words("uno dos tres cuatro");
        let sentence = UtteranceAssembler::new(1).assemble(
            &w,
            WordRange::new(0, 4),
            &[range(Some("A"), 2, 4)],
        );
        assert_eq!(sentence.utterances.len(), 1);
        assert_eq!(sentence.utterances[0].word_range, WordRange::new(0, 4));
        assert_eq!(sentence.utterances[0].speaker_id.as_deref(), Some("A"));
        assert_partition(&sentence);
    }

    #[test]
    fn test_no_coverage_yields_unattributed_utterance() {
        let w = words("uno dos tres");
        let sentence =
            UtteranceAssembler::default().assemble(&w, WordRange::new(0, 3), &[]);
        assert_eq!(sentence.utterances.len(), 1);
        assert_eq!(sentence.utterances[0].speaker_id, None);
        assert_eq!(sentence.primary_speaker, None);
        assert_partition(&sentence);
    }

    #[test]
    fn test_short_utterance_merges_into_same_speaker_only() {
        let w = words("uno dos tres cuatro cinco seis siete ocho");
        // A(4) B(1) A(3): B is short but flanked by a different speaker,
        // so it stays; the partition must not cross speakers.
        let sentence = UtteranceAssembler::default().assemble(
            &w,
            WordRange::new(0, 8),
            &[
                range(Some("A"), 0, 4),
                range(Some("B"), 4, 5),
                range(Some("A"), 5, 8),
            ],
        );
        assert_eq!(sentence.utterances.len(), 3);
        assert_eq!(sentence.utterances[1].speaker_id.as_deref(), Some("B"));
        assert_partition(&sentence);
    }

    #[test]
    fn test_speaker_isolation_adjacent_utterances_differ() {
        let w = words("uno dos tres cuatro cinco seis siete ocho");
        let sentence = UtteranceAssembler::default().assemble(
            &w,
            WordRange::new(0, 8),
            &[
                range(Some("A"), 0, 4),
                range(Some("B"), 4, 8),
            ],
        );
        for pair in sentence.utterances.windows(2) {
            assert_ne!(pair[0].speaker_id, pair[1].speaker_id);
        }
        assert_partition(&sentence);
    }

    #[test]
    fn test_sentence_inside_larger_speaker_range() {
        let w = words("a b c d e f g h i j");
        let sentence = UtteranceAssembler::default().assemble(
            &w,
            WordRange::new(3, 7),
            &[range(Some("A"), 0, 10)],
        );
        assert_eq!(sentence.word_range, WordRange::new(3, 7));
        assert_eq!(sentence.utterances[0].word_range, WordRange::new(3, 7));
        assert_eq!(sentence.utterances[0].text, "d e f g");
        assert_partition(&sentence);
    }
}
