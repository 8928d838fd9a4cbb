use std::collections::HashMap;

use crate::shared::constants::TERMINAL_MARKS;

/// Where a terminal punctuation mark came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOrigin {
    /// Emitted by the recognizer at one of its segment boundaries.
    Recognizer,
    /// Added by this engine when an accepted split lacked a mark.
    Synthesized,
}

/// Tracks the provenance of every terminal mark and mutates the text the
/// moment a boundary decision is finalized.
///
/// Recognizer marks survive only while the boundary they sit on survives;
/// a skipped boundary takes its mark (and the following capital) with it.
#[derive(Debug, Default)]
pub struct PunctuationTracker {
    marks: HashMap<usize, MarkOrigin>,
}

impl PunctuationTracker {
    /// Records the recognizer-origin marks sitting at segment boundaries.
    /// `boundary_last_words` holds the index of each segment's final word.
    pub fn from_recognizer_boundaries(words: &[String], boundary_last_words: &[usize]) -> Self {
        let mut marks = HashMap::new();
        for &idx in boundary_last_words {
            if words.get(idx).is_some_and(|w| has_terminal_mark(w)) {
                marks.insert(idx, MarkOrigin::Recognizer);
            }
        }
        Self { marks }
    }

    pub fn origin(&self, word_index: usize) -> Option<MarkOrigin> {
        self.marks.get(&word_index).copied()
    }

    /// An accepted split keeps the existing mark or synthesizes a period.
    /// Trailing clause punctuation ("Listo,") gives way to the period.
    pub fn confirm_boundary(&mut self, words: &mut [String], last_word: usize) {
        let Some(word) = words.get_mut(last_word) else {
            return;
        };
        if !has_terminal_mark(word) {
            while word.ends_with([',', ';', ':']) {
                word.pop();
            }
            word.push('.');
            self.marks.insert(last_word, MarkOrigin::Synthesized);
        }
    }

    /// A skipped recognizer boundary loses its mark, and the word after it
    /// loses its sentence-initial capital.
    pub fn skip_boundary(&mut self, words: &mut [String], last_word: usize) {
        if let Some(word) = words.get_mut(last_word) {
            let stripped = strip_terminal_marks(word);
            if stripped != *word {
                *word = stripped;
                self.marks.remove(&last_word);
            }
        }
        if let Some(next) = words.get_mut(last_word + 1) {
            *next = lowercase_first(next);
        }
    }
}

pub fn has_terminal_mark(word: &str) -> bool {
    word.chars().last().is_some_and(|c| TERMINAL_MARKS.contains(&c))
}

fn strip_terminal_marks(word: &str) -> String {
    word.trim_end_matches(|c| TERMINAL_MARKS.contains(&c)).to_string()
}

fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
