pub mod assemble_sentences_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
