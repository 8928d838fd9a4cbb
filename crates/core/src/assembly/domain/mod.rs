pub mod merge_formatter;
pub mod sentence;
pub mod utterance_assembler;
