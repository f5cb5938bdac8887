use thiserror::Error;

use crate::language_models::LLMError;
use crate::vectorstore::VectorStoreError;

/// Errors raised while turning a question into documents.
#[derive(Error, Debug)]
pub enum RetrieverError {
    /// The index is not loaded, or every per-query search failed.
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    /// The query expansion provider call failed.
    #[error("Query generation failed: {0}")]
    GenerationError(#[from] LLMError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Retriever configuration error: {0}")]
    ConfigurationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<String> for RetrieverError {
    fn from(s: String) -> Self {
        RetrieverError::Unknown(s)
    }
}
