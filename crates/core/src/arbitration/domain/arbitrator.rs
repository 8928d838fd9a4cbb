use std::collections::HashSet;

use crate::arbitration::domain::boundary::{AcceptedBoundary, BoundarySource};
use crate::arbitration::domain::language::LanguageProfile;
use crate::arbitration::domain::punctuation::PunctuationTracker;
use crate::arbitration::domain::semantic_hints::SemanticHints;
use crate::segmentation::domain::speaker_word_range::SpeakerWordRange;
use crate::shared::ranges::WordRange;
use crate::shared::text_map::TextMap;

/// A provisional sentence: its word span and the signal that closed it
/// (`None` for the trailing end-of-input sentence).
#[derive(Clone, Debug, PartialEq)]
pub struct SentenceSpan {
    pub range: WordRange,
    pub closed_by: Option<BoundarySource>,
}

/// Result of one arbitration scan. `words` carries the punctuation
/// mutations (stripped marks, lowercased continuations, synthesized
/// periods) applied as each decision was finalized.
#[derive(Debug)]
pub struct ArbitrationOutcome {
    pub words: Vec<String>,
    pub sentences: Vec<SentenceSpan>,
    pub boundaries: Vec<AcceptedBoundary>,
    pub skipped_recognizer: Vec<usize>,
    /// Final provenance of every surviving terminal mark.
    pub punctuation: PunctuationTracker,
}

/// State carried across the left-to-right scan. Passed by `&mut` through
/// every step; nothing outside the scan observes it.
#[derive(Debug)]
struct ScanState {
    sentence_start: usize,
    bracket_depth: usize,
    inverted_question: usize,
    inverted_exclaim: usize,
    quote_open: bool,
    skipped: Vec<usize>,
}

impl ScanState {
    fn new() -> Self {
        Self {
            sentence_start: 0,
            bracket_depth: 0,
            inverted_question: 0,
            inverted_exclaim: 0,
            quote_open: false,
            skipped: Vec::new(),
        }
    }

    /// True while the buffer holds an opening mark without its partner;
    /// no boundary of any source may split inside the construct.
    fn unclosed_construct(&self) -> bool {
        self.bracket_depth > 0
            || self.inverted_question > 0
            || self.inverted_exclaim > 0
            || self.quote_open
    }

    fn track_pairs(&mut self, word: &str) {
        for c in word.chars() {
            match c {
                '(' | '[' | '{' | '«' => self.bracket_depth += 1,
                ')' | ']' | '}' | '»' => {
                    self.bracket_depth = self.bracket_depth.saturating_sub(1)
                }
                '¿' => self.inverted_question += 1,
                '?' => self.inverted_question = self.inverted_question.saturating_sub(1),
                '¡' => self.inverted_exclaim += 1,
                '!' => self.inverted_exclaim = self.inverted_exclaim.saturating_sub(1),
                '"' => self.quote_open = !self.quote_open,
                _ => {}
            }
        }
    }
}

/// Decides, word by word, where sentences end.
///
/// Priority ladder per candidate position: grammatical veto, then speaker
/// transition, then recognizer boundary, then semantic hint. All numeric
/// thresholds and word lists come from the language profile.
pub struct BoundaryArbitrator<'a> {
    profile: &'a LanguageProfile,
}

impl<'a> BoundaryArbitrator<'a> {
    pub fn new(profile: &'a LanguageProfile) -> Self {
        Self { profile }
    }

    /// `recognizer_last_words` holds the index of each recognizer
    /// segment's final word.
    pub fn arbitrate(
        &self,
        map: &TextMap,
        recognizer_last_words: &[usize],
        speaker_ranges: &[SpeakerWordRange],
        hints: &SemanticHints,
    ) -> ArbitrationOutcome {
        let mut words: Vec<String> =
            map.tokens().iter().map(|t| t.text.clone()).collect();
        let n = words.len();

        let mut tracker =
            PunctuationTracker::from_recognizer_boundaries(&words, recognizer_last_words);
        let rec_ends: HashSet<usize> = recognizer_last_words.iter().copied().collect();
        let transitions = speaker_transitions(speaker_ranges, n);

        let mut state = ScanState::new();
        let mut sentences = Vec::new();
        let mut boundaries = Vec::new();

        for i in 0..n {
            state.track_pairs(&words[i]);
            if i + 1 == n {
                break;
            }

            let buffer_len = i + 1 - state.sentence_start;
            let bare = bare_word(&words[i]);
            let vetoed =
                self.profile.cannot_end_sentence(&bare) || state.unclosed_construct();

            let mut accepted: Option<BoundarySource> = None;

            if !vetoed && transitions.contains(&(i + 1)) && buffer_len >= 1 {
                // A speaker change is near-definitive; connectors after it
                // are the new speaker's problem, not a continuation cue.
                accepted = Some(BoundarySource::Speaker);
            } else if rec_ends.contains(&i) {
                let long_enough = buffer_len >= self.profile.min_chunk_words
                    || self.greeting_buffer(&words, state.sentence_start, i);
                let misaligned = !vetoed
                    && long_enough
                    && self.imminent_speaker_change(&transitions, i, n)
                    && self.continuation_cue(words.get(i + 1));

                if !vetoed && long_enough && !misaligned {
                    accepted = Some(BoundarySource::Recognizer);
                } else {
                    // The recognizer's mark contradicts the decision to
                    // keep going; take it out immediately.
                    tracker.skip_boundary(&mut words, i);
                    state.skipped.push(i);
                }
            } else if !vetoed
                && hints.is_boundary(i + 1)
                && buffer_len >= self.profile.min_semantic_words
            {
                accepted = Some(BoundarySource::SemanticHint);
            }

            if let Some(source) = accepted {
                tracker.confirm_boundary(&mut words, i);
                sentences.push(SentenceSpan {
                    range: WordRange::new(state.sentence_start, i + 1),
                    closed_by: Some(source),
                });
                boundaries.push(AcceptedBoundary {
                    word_index: i + 1,
                    source,
                });
                state.sentence_start = i + 1;
            }
        }

        if state.sentence_start < n {
            tracker.confirm_boundary(&mut words, n - 1);
            sentences.push(SentenceSpan {
                range: WordRange::new(state.sentence_start, n),
                closed_by: None,
            });
        }

        ArbitrationOutcome {
            words,
            sentences,
            boundaries,
            skipped_recognizer: state.skipped,
            punctuation: tracker,
        }
    }

    /// Short standalone greetings ("Hola.", "Buenos días.") may close a
    /// sentence well below the normal chunk minimum.
    fn greeting_buffer(&self, words: &[String], start: usize, end_inclusive: usize) -> bool {
        end_inclusive - start < 2 && self.profile.is_greeting(&bare_word(&words[start]))
    }

    fn imminent_speaker_change(
        &self,
        transitions: &HashSet<usize>,
        i: usize,
        n: usize,
    ) -> bool {
        (i + 2..=(i + 1 + self.profile.lookahead_words).min(n - 1))
            .any(|j| transitions.contains(&j))
    }

    fn continuation_cue(&self, word: Option<&String>) -> bool {
        let Some(word) = word else {
            return false;
        };
        if self.profile.is_connector(&bare_word(word)) {
            return true;
        }
        word.chars()
            .find(|c| c.is_alphabetic())
            .is_some_and(|c| c.is_lowercase())
    }
}

/// Word positions where attribution switches between two known, distinct
/// speakers. A transition to or from unattributed text is no signal.
fn speaker_transitions(ranges: &[SpeakerWordRange], word_count: usize) -> HashSet<usize> {
    let mut transitions = HashSet::new();
    for j in 1..word_count {
        let prev = SpeakerWordRange::speaker_at(ranges, j - 1);
        let here = SpeakerWordRange::speaker_at(ranges, j);
        if let (Some(a), Some(b)) = (prev, here) {
            if a != b {
                transitions.insert(j);
            }
        }
    }
    transitions
}

fn bare_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitration::domain::language::{Language, LanguageProfile};

    fn ranges(spec: &[(Option<&str>, usize, usize)]) -> Vec<SpeakerWordRange> {
        spec.iter()
            .map(|(id, s, e)| {
                SpeakerWordRange::new(id.map(String::from), WordRange::new(*s, *e))
            })
            .collect()
    }

    fn arbitrate(
        text: &str,
        rec_last_words: &[usize],
        speakers: &[SpeakerWordRange],
        hints: &SemanticHints,
    ) -> ArbitrationOutcome {
        let map = TextMap::build(text);
        let profile = LanguageProfile::for_language(Language::Spanish);
        BoundaryArbitrator::new(&profile).arbitrate(&map, rec_last_words, speakers, hints)
    }

    #[test]
    fn test_same_speaker_recognizer_boundary_glued() {
        // "trabajo." / "Y este meta es tu trabajo", one speaker: the short
        // first chunk is skipped, its period stripped, "Y" lowercased.
        let out = arbitrate(
            "trabajo. Y este meta es tu trabajo",
            &[0, 6],
            &ranges(&[(Some("A"), 0, 7)]),
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 1);
        assert_eq!(out.words[0], "trabajo");
        assert_eq!(out.words[1], "y");
        assert_eq!(out.skipped_recognizer, vec![0]);
        assert_eq!(out.words.join(" "), "trabajo y este meta es tu trabajo.");
    }

    #[test]
    fn test_speaker_change_splits_with_one_word_buffer() {
        let out = arbitrate(
            "Aquí. Listo, eso es todo",
            &[4],
            &ranges(&[(Some("A"), 0, 1), (Some("B"), 1, 5)]),
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 2);
        assert_eq!(out.sentences[0].range, WordRange::new(0, 1));
        assert_eq!(out.sentences[0].closed_by, Some(BoundarySource::Speaker));
        assert_eq!(out.sentences[1].range, WordRange::new(1, 5));
        // Speaker splits preserve punctuation and capitalization.
        assert_eq!(out.words[0], "Aquí.");
        assert_eq!(out.words[1], "Listo,");
    }

    #[test]
    fn test_speaker_change_overrides_connector_next_word() {
        // New speaker starting with "y" still gets their own sentence.
        let out = arbitrate(
            "eso es todo y ahora empezamos",
            &[],
            &ranges(&[(Some("A"), 0, 3), (Some("B"), 3, 6)]),
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 2);
        assert_eq!(out.sentences[0].closed_by, Some(BoundarySource::Speaker));
        assert_eq!(out.sentences[1].range, WordRange::new(3, 6));
    }

    #[test]
    fn test_grammatical_veto_blocks_every_source() {
        // Attribution changes right after "y": the veto still wins.
        let out = arbitrate(
            "vamos a trabajar y entonces vemos",
            &[3],
            &ranges(&[(Some("A"), 0, 4), (Some("B"), 4, 6)]),
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 1);
        assert_eq!(out.sentences[0].range, WordRange::new(0, 6));
    }

    #[test]
    fn test_recognizer_boundary_needs_min_chunk() {
        let out = arbitrate(
            "uno dos tres. cuatro cinco seis",
            &[2, 5],
            &[],
            &SemanticHints::default(),
        );
        // Three words is below the minimum; boundary skipped, glued.
        assert_eq!(out.sentences.len(), 1);
        assert_eq!(out.words[2], "tres");
        assert_eq!(out.words[3], "cuatro");
    }

    #[test]
    fn test_recognizer_boundary_accepted_at_min_chunk() {
        let text = "la reunión empezó tarde hoy porque nadie encontraba sala libre. mañana vemos resultados finales juntos todos nosotros aquí mismo otra vez";
        let out = arbitrate(text, &[9], &[], &SemanticHints::default());
        assert_eq!(out.sentences.len(), 2);
        assert_eq!(out.sentences[0].range, WordRange::new(0, 10));
        assert_eq!(
            out.sentences[0].closed_by,
            Some(BoundarySource::Recognizer)
        );
    }

    #[test]
    fn test_greeting_splits_below_min_chunk() {
        let out = arbitrate(
            "Hola. empezamos la sesión ahora mismo",
            &[0, 5],
            &[],
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 2);
        assert_eq!(out.sentences[0].range, WordRange::new(0, 1));
    }

    #[test]
    fn test_misaligned_recognizer_boundary_defers_to_imminent_speaker() {
        // Recognizer cuts at word 9 ("libre."), the diarization change
        // arrives two words later and the next word is a connector: the
        // acoustic boundary is a misaligned echo and gets skipped.
        let text = "la reunión empezó tarde hoy nadie encontraba la sala libre. pero bueno Listo empezamos ya mismo ahora";
        let out = arbitrate(
            text,
            &[9],
            &ranges(&[(Some("A"), 0, 12), (Some("B"), 12, 17)]),
            &SemanticHints::default(),
        );
        assert!(out.skipped_recognizer.contains(&9));
        assert_eq!(out.words[9], "libre");
        assert_eq!(out.words[10], "pero");
        // The real split still happens at the speaker change.
        assert!(out
            .boundaries
            .iter()
            .any(|b| b.word_index == 12 && b.source == BoundarySource::Speaker));
    }

    #[test]
    fn test_semantic_hint_needs_long_buffer() {
        let text = "uno dos tres cuatro cinco seis siete ocho nueve diez once doce trece catorce quince dieciséis diecisiete dieciocho los demás siguen hablando sin parar";
        let hints = SemanticHints::new([(5, 1.0), (18, 1.0)]);
        let out = arbitrate(text, &[], &[], &hints);
        assert_eq!(out.sentences.len(), 2);
        assert_eq!(out.sentences[0].range.end, 18);
        assert_eq!(
            out.sentences[0].closed_by,
            Some(BoundarySource::SemanticHint)
        );
    }

    #[test]
    fn test_unclosed_construct_blocks_boundary() {
        // The recognizer cuts inside «…»; the construct guard vetoes it.
        let out = arbitrate(
            "dijo «no vengas mañana temprano jamás nunca digas eso. aquí» listo entonces seguimos con esto hasta terminar todo",
            &[8],
            &[],
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 1);
        assert!(out.skipped_recognizer.contains(&8));
        assert_eq!(out.words[8], "eso");
    }

    #[test]
    fn test_unattributed_transition_is_no_signal() {
        let out = arbitrate(
            "uno dos tres cuatro cinco seis",
            &[],
            &ranges(&[(Some("A"), 0, 3), (None, 3, 6)]),
            &SemanticHints::default(),
        );
        assert_eq!(out.sentences.len(), 1);
    }

    #[test]
    fn test_monotone_increasing_full_coverage() {
        let text = "Hola. empezamos la sesión ahora porque hay mucho trabajo pendiente hoy. Listo eso es todo amigos";
        let out = arbitrate(
            text,
            &[0, 10],
            &ranges(&[(Some("A"), 0, 11), (Some("B"), 11, 16)]),
            &SemanticHints::default(),
        );
        let mut cursor = 0;
        for s in &out.sentences {
            assert_eq!(s.range.start, cursor);
            assert!(s.range.end > s.range.start);
            cursor = s.range.end;
        }
        assert_eq!(cursor, out.words.len());
    }

    #[test]
    fn test_final_sentence_gets_synthesized_period() {
        let out = arbitrate("eso es todo", &[], &[], &SemanticHints::default());
        assert_eq!(out.words[2], "todo.");
        assert_eq!(out.sentences.last().unwrap().closed_by, None);
    }

    #[test]
    fn test_empty_input() {
        let out = arbitrate("", &[], &[], &SemanticHints::default());
        assert!(out.sentences.is_empty());
        assert!(out.words.is_empty());
    }
}
