pub mod boundary_converter;
pub mod recognizer_segment;
pub mod speaker_segment;
pub mod speaker_word_range;
