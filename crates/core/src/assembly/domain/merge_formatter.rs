use crate::arbitration::domain::language::Language;
use crate::arbitration::domain::punctuation::{MarkOrigin, PunctuationTracker};
use crate::assembly::domain::sentence::{Sentence, Utterance};
use crate::shared::constants::TERMINAL_MARKS;
use crate::shared::ranges::WordRange;

/// Why two adjacent sentences were (or were not) merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeReason {
    /// A domain label split from its TLD ("ejemplo." / "com").
    DomainSplit,
    /// A decimal number split at its point ("3." / "14").
    DecimalSplit,
    /// A location appositive split from its head ("Nate." / "de Texas").
    LocationAppositive,
    /// A repeated one-word emphatic fragment ("No." / "No.").
    RepeatedEmphatic,
    /// A pattern matched but the speakers differ; merge refused.
    SpeakerMismatch,
}

/// Diagnostic record of one merge decision. Not needed for correctness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeRecord {
    pub kept: bool,
    pub reason: MergeReason,
    pub sentence_indices: (usize, usize),
}

const KNOWN_TLDS: &[&str] = &["com", "net", "org", "io", "es", "mx", "co", "edu", "gov"];
const MAX_APPOSITIVE_WORDS: usize = 4;

/// Second pass over assembled sentences: re-joins adjacent sentences that
/// match known false-split patterns.
///
/// The pattern set is closed and enumerable; this is a repair pass for
/// specific arbitration artifacts, not a general re-splitter. A speaker
/// mismatch vetoes every pattern unconditionally, and the mid-token
/// patterns (domain, decimal) additionally require a recognizer-origin
/// mark at the seam: a period this engine synthesized cannot be evidence
/// of a token the recognizer cut in half.
pub struct MergeFormatter {
    appositive_cues: &'static [&'static str],
}

impl MergeFormatter {
    pub fn new(language: Language) -> Self {
        let appositive_cues: &[&str] = match language {
            Language::Spanish => &["de", "del"],
            Language::English => &["from", "of"],
        };
        Self { appositive_cues }
    }

    pub fn format(
        &self,
        sentences: Vec<Sentence>,
        punctuation: &PunctuationTracker,
    ) -> (Vec<Sentence>, Vec<MergeRecord>) {
        let mut out: Vec<Sentence> = Vec::with_capacity(sentences.len());
        // Original input index of the last sentence folded into out.last().
        let mut last_orig: usize = 0;
        let mut records = Vec::new();

        for (i, sentence) in sentences.into_iter().enumerate() {
            let Some(prev) = out.last() else {
                out.push(sentence);
                last_orig = i;
                continue;
            };

            let Some(reason) = self.matching_pattern(prev, &sentence, punctuation) else {
                out.push(sentence);
                last_orig = i;
                continue;
            };

            if speaker_mismatch(prev, &sentence) {
                records.push(MergeRecord {
                    kept: false,
                    reason: MergeReason::SpeakerMismatch,
                    sentence_indices: (last_orig, i),
                });
                out.push(sentence);
                last_orig = i;
                continue;
            }

            records.push(MergeRecord {
                kept: true,
                reason,
                sentence_indices: (last_orig, i),
            });
            let prev = out.pop().expect("checked non-empty");
            out.push(merge_pair(prev, sentence, reason));
            last_orig = i;
        }

        (out, records)
    }

    /// First matching predicate, in fixed order.
    fn matching_pattern(
        &self,
        prev: &Sentence,
        next: &Sentence,
        punctuation: &PunctuationTracker,
    ) -> Option<MergeReason> {
        if domain_split(prev, next, punctuation) {
            Some(MergeReason::DomainSplit)
        } else if decimal_split(prev, next, punctuation) {
            Some(MergeReason::DecimalSplit)
        } else if self.location_appositive(prev, next) {
            Some(MergeReason::LocationAppositive)
        } else if repeated_emphatic(prev, next) {
            Some(MergeReason::RepeatedEmphatic)
        } else {
            None
        }
    }

    fn location_appositive(&self, prev: &Sentence, next: &Sentence) -> bool {
        if next.word_range.len() > MAX_APPOSITIVE_WORDS {
            return false;
        }
        let Some(cue) = first_word(next) else {
            return false;
        };
        if !self.appositive_cues.contains(&bare(cue).to_lowercase().as_str()) {
            return false;
        }
        // The head should look like a proper noun.
        last_word(prev)
            .map(bare)
            .and_then(|w| w.chars().next())
            .is_some_and(|c| c.is_uppercase())
    }
}

fn speaker_mismatch(a: &Sentence, b: &Sentence) -> bool {
    matches!(
        (a.primary_speaker.as_deref(), b.primary_speaker.as_deref()),
        (Some(x), Some(y)) if x != y
    )
}

/// Whether the mark closing `prev` was written by the recognizer at one of
/// its segment edges. Only those marks can sit inside a cut token.
fn recognizer_seam(prev: &Sentence, punctuation: &PunctuationTracker) -> bool {
    prev.word_range
        .end
        .checked_sub(1)
        .and_then(|last| punctuation.origin(last))
        == Some(MarkOrigin::Recognizer)
}

fn domain_split(prev: &Sentence, next: &Sentence, punctuation: &PunctuationTracker) -> bool {
    if !recognizer_seam(prev, punctuation) {
        return false;
    }
    let Some(tail) = last_word(prev) else {
        return false;
    };
    let Some(head) = first_word(next) else {
        return false;
    };
    if !tail.ends_with('.') || bare(tail).is_empty() {
        return false;
    }
    // Domain fragments are lowercase in recognizer output; a capitalized
    // head is a sentence start, not a TLD.
    if head.chars().any(|c| c.is_uppercase()) {
        return false;
    }
    let label = head.trim_end_matches(|c: char| !c.is_alphanumeric());
    let tld = match label.split_once('/') {
        Some((tld, _path)) => tld,
        None => label,
    };
    KNOWN_TLDS.contains(&tld)
}

fn decimal_split(prev: &Sentence, next: &Sentence, punctuation: &PunctuationTracker) -> bool {
    if !recognizer_seam(prev, punctuation) {
        return false;
    }
    let Some(tail) = last_word(prev) else {
        return false;
    };
    let Some(head) = first_word(next) else {
        return false;
    };
    tail.ends_with('.')
        && !bare(tail).is_empty()
        && bare(tail).chars().all(|c| c.is_ascii_digit())
        && head.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn repeated_emphatic(prev: &Sentence, next: &Sentence) -> bool {
    prev.word_range.len() == 1
        && next.word_range.len() == 1
        && first_word(prev).zip(first_word(next)).is_some_and(|(a, b)| {
            !bare(a).is_empty() && bare(a).to_lowercase() == bare(b).to_lowercase()
        })
}

/// Joins two sentences, editing the seam utterances so the rebuilt
/// sentence text and the utterance texts describe the same characters.
fn merge_pair(prev: Sentence, next: Sentence, reason: MergeReason) -> Sentence {
    let word_range = WordRange::new(prev.word_range.start, next.word_range.end);
    let mut utterances = prev.utterances;
    let mut incoming = next.utterances.into_iter();

    if let Some(mut first) = incoming.next() {
        match reason {
            // The split fell inside one token; rejoin without a space. A
            // token cannot span speakers, so the seam utterances fuse and
            // the attributed side wins.
            MergeReason::DomainSplit | MergeReason::DecimalSplit => {
                match utterances.last_mut() {
                    Some(tail) => {
                        tail.text.push_str(&first.text);
                        tail.word_range.end = first.word_range.end;
                        if tail.speaker_id.is_none() {
                            tail.speaker_id = first.speaker_id;
                        }
                    }
                    None => utterances.push(first),
                }
            }
            MergeReason::LocationAppositive => {
                if let Some(tail) = utterances.last_mut() {
                    tail.text = strip_terminal(&tail.text).to_string();
                }
                first.text = lowercase_first(&first.text);
                append_utterance(&mut utterances, first);
            }
            MergeReason::RepeatedEmphatic | MergeReason::SpeakerMismatch => {
                append_utterance(&mut utterances, first);
            }
        }
    }
    for u in incoming {
        append_utterance(&mut utterances, u);
    }

    Sentence::from_utterances(utterances, word_range)
}

fn append_utterance(utterances: &mut Vec<Utterance>, u: Utterance) {
    match utterances.last_mut() {
        Some(tail) if tail.speaker_id == u.speaker_id => {
            tail.word_range.end = u.word_range.end;
            tail.text.push(' ');
            tail.text.push_str(&u.text);
        }
        _ => utterances.push(u),
    }
}

fn first_word(s: &Sentence) -> Option<&str> {
    s.text.split_whitespace().next()
}

fn last_word(s: &Sentence) -> Option<&str> {
    s.text.split_whitespace().last()
}

fn bare(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

fn strip_terminal(text: &str) -> &str {
    text.trim_end_matches(|c| TERMINAL_MARKS.contains(&c))
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(text: &str, speaker: Option<&str>, start: usize, end: usize) -> Sentence {
        let utterances = vec![Utterance {
            text: text.to_string(),
            speaker_id: speaker.map(String::from),
            word_range: WordRange::new(start, end),
        }];
        Sentence::from_utterances(utterances, WordRange::new(start, end))
    }

    fn formatter() -> MergeFormatter {
        MergeFormatter::new(Language::Spanish)
    }

    /// Tracker with recognizer-origin marks at the given word indices.
    fn recognizer_marks(words: &[&str], boundary_last_words: &[usize]) -> PunctuationTracker {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        PunctuationTracker::from_recognizer_boundaries(&words, boundary_last_words)
    }

    #[test]
    fn test_domain_split_merged() {
        let marks = recognizer_marks(&["visita", "ejemplo.", "com", "ahora"], &[1]);
        let input = vec![
            sentence("visita ejemplo.", Some("A"), 0, 2),
            sentence("com ahora", Some("A"), 2, 4),
        ];
        let (out, records) = formatter().format(input, &marks);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "visita ejemplo.com ahora");
        assert_eq!(records.len(), 1);
        assert!(records[0].kept);
        assert_eq!(records[0].reason, MergeReason::DomainSplit);
    }

    #[test]
    fn test_domain_split_with_path_merged() {
        let marks = recognizer_marks(&["visita", "ejemplo.", "com/inicio", "ya"], &[1]);
        let input = vec![
            sentence("visita ejemplo.", Some("A"), 0, 2),
            sentence("com/inicio ya", Some("A"), 2, 4),
        ];
        let (out, _) = formatter().format(input, &marks);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "visita ejemplo.com/inicio ya");
    }

    #[test]
    fn test_capitalized_head_is_not_a_tld() {
        // "es" sits in the TLD list, but a capitalized head is a real
        // sentence start; gluing these would corrupt "todo.Es".
        let marks = recognizer_marks(
            &["ya", "vimos", "todo.", "Es", "muy", "tarde", "hoy."],
            &[2, 6],
        );
        let input = vec![
            sentence("ya vimos todo.", Some("A"), 0, 3),
            sentence("Es muy tarde hoy.", Some("A"), 3, 7),
        ];
        let (out, records) = formatter().format(input, &marks);
        assert_eq!(out.len(), 2);
        assert!(records.is_empty());
    }

    #[test]
    fn test_synthesized_mark_blocks_domain_merge() {
        // No recognizer mark at the seam: the period on "todo." was
        // synthesized by an accepted split, so no token was cut there.
        let input = vec![
            sentence("ya vimos todo.", Some("A"), 0, 3),
            sentence("es muy tarde", Some("A"), 3, 6),
        ];
        let (out, records) = formatter().format(input, &PunctuationTracker::default());
        assert_eq!(out.len(), 2);
        assert!(records.is_empty());
    }

    #[test]
    fn test_synthesized_mark_blocks_decimal_merge() {
        let input = vec![
            sentence("cuesta 3.", Some("A"), 0, 2),
            sentence("14 euros", Some("A"), 2, 4),
        ];
        let (out, _) = formatter().format(input, &PunctuationTracker::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_decimal_split_merged() {
        let marks = recognizer_marks(&["cuesta", "3.", "14", "euros"], &[1]);
        let input = vec![
            sentence("cuesta 3.", Some("A"), 0, 2),
            sentence("14 euros", Some("A"), 2, 4),
        ];
        let (out, records) = formatter().format(input, &marks);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "cuesta 3.14 euros");
        assert_eq!(records[0].reason, MergeReason::DecimalSplit);
    }

    #[test]
    fn test_location_appositive_merged() {
        let input = vec![
            sentence("yo soy Nate.", Some("A"), 0, 3),
            sentence("De Texas.", Some("A"), 3, 5),
        ];
        let (out, records) = formatter().format(input, &PunctuationTracker::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "yo soy Nate de Texas.");
        assert_eq!(records[0].reason, MergeReason::LocationAppositive);
    }

    #[test]
    fn test_repeated_emphatic_merged() {
        let input = vec![
            sentence("No.", Some("A"), 0, 1),
            sentence("No.", Some("A"), 1, 2),
        ];
        let (out, records) = formatter().format(input, &PunctuationTracker::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "No. No.");
        assert_eq!(records[0].reason, MergeReason::RepeatedEmphatic);
    }

    #[test]
    fn test_speaker_mismatch_vetoes_pattern() {
        let marks = recognizer_marks(&["visita", "ejemplo.", "com", "ahora"], &[1]);
        let input = vec![
            sentence("visita ejemplo.", Some("A"), 0, 2),
            sentence("com ahora", Some("B"), 2, 4),
        ];
        let (out, records) = formatter().format(input, &marks);
        assert_eq!(out.len(), 2);
        assert_eq!(records.len(), 1);
        assert!(!records[0].kept);
        assert_eq!(records[0].reason, MergeReason::SpeakerMismatch);
    }

    #[test]
    fn test_unattributed_side_may_merge() {
        let marks = recognizer_marks(&["cuesta", "3.", "14", "euros"], &[1]);
        let input = vec![
            sentence("cuesta 3.", Some("A"), 0, 2),
            sentence("14 euros", None, 2, 4),
        ];
        let (out, _) = formatter().format(input, &marks);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "cuesta 3.14 euros");
        assert_eq!(out[0].primary_speaker.as_deref(), Some("A"));
    }

    #[test]
    fn test_unrelated_sentences_untouched() {
        let marks = recognizer_marks(
            &["hola", "a", "todos.", "empezamos", "ya."],
            &[2, 4],
        );
        let input = vec![
            sentence("hola a todos.", Some("A"), 0, 3),
            sentence("empezamos ya.", Some("A"), 3, 5),
        ];
        let (out, records) = formatter().format(input, &marks);
        assert_eq!(out.len(), 2);
        assert!(records.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let marks = recognizer_marks(
            &["No.", "No.", "visita", "ejemplo.", "com", "ahora"],
            &[0, 1, 3],
        );
        let input = vec![
            sentence("No.", Some("A"), 0, 1),
            sentence("No.", Some("A"), 1, 2),
            sentence("visita ejemplo.", Some("A"), 2, 4),
            sentence("com ahora", Some("A"), 4, 6),
        ];
        let (once, _) = formatter().format(input, &marks);
        let (twice, records) = formatter().format(once.clone(), &marks);
        assert_eq!(once, twice);
        assert!(records.is_empty());
    }

    #[test]
    fn test_merged_utterances_fuse_same_speaker() {
        let marks = recognizer_marks(&["cuesta", "3.", "14", "euros"], &[1]);
        let input = vec![
            sentence("cuesta 3.", Some("A"), 0, 2),
            sentence("14 euros", Some("A"), 2, 4),
        ];
        let (out, _) = formatter().format(input, &marks);
        assert_eq!(out[0].utterances.len(), 1);
        assert_eq!(out[0].utterances[0].word_range, WordRange::new(0, 4));
    }

    #[test]
    fn test_merged_utterance_text_matches_sentence_text() {
        let marks = recognizer_marks(&["visita", "ejemplo.", "com", "ahora"], &[1]);
        let input = vec![
            sentence("visita ejemplo.", Some("A"), 0, 2),
            sentence("com ahora", Some("A"), 2, 4),
        ];
        let (out, _) = formatter().format(input, &marks);
        assert_eq!(out[0].utterances[0].text, "visita ejemplo.com ahora");
        assert_eq!(out[0].utterances[0].text, out[0].text);
    }

    #[test]
    fn test_appositive_utterance_text_matches_sentence_text() {
        let input = vec![
            sentence("yo soy Nate.", Some("A"), 0, 3),
            sentence("De Texas.", Some("A"), 3, 5),
        ];
        let (out, _) = formatter().format(input, &PunctuationTracker::default());
        assert_eq!(out[0].utterances[0].text, "yo soy Nate de Texas.");
        assert_eq!(out[0].utterances[0].text, out[0].text);
    }

    #[test]
    fn test_come_is_not_a_tld() {
        let marks = recognizer_marks(&["ya", "vimos", "eso.", "como", "siempre"], &[2]);
        let input = vec![
            sentence("ya vimos eso.", Some("A"), 0, 3),
            sentence("como siempre", Some("A"), 3, 5),
        ];
        let (out, _) = formatter().format(input, &marks);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_english_appositive_cues() {
        let f = MergeFormatter::new(Language::English);
        let input = vec![
            sentence("I am Nate.", Some("A"), 0, 3),
            sentence("From Texas.", Some("A"), 3, 5),
        ];
        let (out, _) = f.format(input, &PunctuationTracker::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "I am Nate from Texas.");
    }
}
