pub mod constants;
pub mod ranges;
pub mod text_map;
pub mod time_span;
