pub mod threaded_document_executor;
