use std::collections::HashSet;

use crate::shared::constants::{
    BOUNDARY_LOOKAHEAD_WORDS, DEFAULT_MIN_CHUNK_WORDS, DEFAULT_MIN_SEMANTIC_WORDS,
};

/// Supported transcript languages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Spanish,
    English,
}

impl Language {
    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag.to_ascii_lowercase().as_str() {
            "es" | "spa" | "spanish" => Some(Language::Spanish),
            "en" | "eng" | "english" => Some(Language::English),
            _ => None,
        }
    }
}

/// Immutable per-language grammatical data and arbitration thresholds.
///
/// All closed word lists live here, built once per run; decision code
/// never carries language literals of its own.
pub struct LanguageProfile {
    pub language: Language,
    /// Words that cannot legally end a sentence.
    non_terminal: HashSet<&'static str>,
    /// Words that signal the next chunk continues the current clause.
    connectors: HashSet<&'static str>,
    /// Short standalone openers allowed to form their own sentence.
    greetings: HashSet<&'static str>,
    pub min_chunk_words: usize,
    pub min_semantic_words: usize,
    pub lookahead_words: usize,
}

const SPANISH_CONJUNCTIONS: &[&str] = &["y", "e", "o", "u", "ni", "pero", "sino", "que", "aunque"];
const SPANISH_PREPOSITIONS: &[&str] = &[
    "a", "ante", "bajo", "con", "contra", "de", "desde", "durante", "en", "entre", "hacia",
    "hasta", "mediante", "para", "por", "según", "sin", "sobre", "tras",
];
const SPANISH_CONTINUATIVES: &[&str] = &[
    "es", "son", "era", "eran", "fue", "ser", "está", "están", "estaba", "estar", "ha", "han",
    "había", "he", "hemos", "hay", "muy", "más", "los", "las", "el", "la", "un", "una", "mi",
    "tu", "su",
];
const SPANISH_CONNECTORS: &[&str] = &[
    "y", "e", "o", "u", "pero", "porque", "pues", "entonces", "como", "cuando", "si", "aunque",
    "que", "sino",
];
const SPANISH_GREETINGS: &[&str] = &["hola", "buenos", "buenas", "adiós", "gracias", "bienvenidos"];

const ENGLISH_CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "so", "yet", "for"];
const ENGLISH_PREPOSITIONS: &[&str] = &[
    "a", "an", "the", "of", "in", "on", "at", "to", "with", "from", "by", "about", "into",
    "over", "under", "between", "through", "during", "before", "after", "above", "below",
];
const ENGLISH_CONTINUATIVES: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "has", "have", "had", "will",
    "would", "shall", "should", "can", "could", "may", "might", "must", "do", "does", "did",
    "my", "your", "his", "her", "their", "our", "its", "very",
];
const ENGLISH_CONNECTORS: &[&str] = &[
    "and", "or", "but", "because", "so", "then", "when", "while", "if", "although", "that",
    "which", "who",
];
const ENGLISH_GREETINGS: &[&str] = &["hello", "hi", "hey", "thanks", "goodbye", "welcome"];

impl LanguageProfile {
    pub fn for_language(language: Language) -> Self {
        let (conj, prep, cont, conn, greet) = match language {
            Language::Spanish => (
                SPANISH_CONJUNCTIONS,
                SPANISH_PREPOSITIONS,
                SPANISH_CONTINUATIVES,
                SPANISH_CONNECTORS,
                SPANISH_GREETINGS,
            ),
            Language::English => (
                ENGLISH_CONJUNCTIONS,
                ENGLISH_PREPOSITIONS,
                ENGLISH_CONTINUATIVES,
                ENGLISH_CONNECTORS,
                ENGLISH_GREETINGS,
            ),
        };

        let mut non_terminal: HashSet<&'static str> = HashSet::new();
        non_terminal.extend(conj);
        non_terminal.extend(prep);
        non_terminal.extend(cont);

        Self {
            language,
            non_terminal,
            connectors: conn.iter().copied().collect(),
            greetings: greet.iter().copied().collect(),
            min_chunk_words: DEFAULT_MIN_CHUNK_WORDS,
            min_semantic_words: DEFAULT_MIN_SEMANTIC_WORDS,
            lookahead_words: BOUNDARY_LOOKAHEAD_WORDS,
        }
    }

    /// True when `word` (already stripped of punctuation) cannot legally
    /// end a sentence.
    pub fn cannot_end_sentence(&self, word: &str) -> bool {
        self.non_terminal.contains(word.to_lowercase().as_str())
    }

    /// True when `word` signals a continuation of the current clause.
    pub fn is_connector(&self, word: &str) -> bool {
        self.connectors.contains(word.to_lowercase().as_str())
    }

    pub fn is_greeting(&self, word: &str) -> bool {
        self.greetings.contains(word.to_lowercase().as_str())
    }
}
