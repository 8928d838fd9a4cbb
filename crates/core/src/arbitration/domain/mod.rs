pub mod arbitrator;
pub mod boundary;
pub mod language;
pub mod punctuation;
pub mod semantic_hints;
