use thiserror::Error;

use crate::embedding::EmbedderError;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Embedder error: {0}")]
    EmbedderError(#[from] EmbedderError),

    #[error("Vector store is not loaded: {0}")]
    NotLoaded(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<String> for VectorStoreError {
    fn from(s: String) -> Self {
        VectorStoreError::Unknown(s)
    }
}

impl From<&str> for VectorStoreError {
    fn from(s: &str) -> Self {
        VectorStoreError::Unknown(s.to_string())
    }
}
