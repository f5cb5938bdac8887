use thiserror::Error;

use crate::retrievers::RetrieverError;
use crate::schemas::Document;

/// RAG-specific error types
#[derive(Error, Debug)]
pub enum RAGError {
    #[error("Retriever error: {0}")]
    RetrieverError(#[from] RetrieverError),

    /// Generation failed after retrieval succeeded; the retrieved documents are kept.
    #[error("Answer synthesis failed: {message}")]
    SynthesisError {
        message: String,
        documents: Vec<Document>,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Config parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RAGError {
    /// Documents retrieved before the failure, if any.
    pub fn documents(&self) -> &[Document] {
        match self {
            RAGError::SynthesisError { documents, .. } => documents,
            _ => &[],
        }
    }
}

pub mod answer_synthesizer;
pub mod config;
pub mod drug_rag;

// Re-export commonly used types
pub use answer_synthesizer::{AnswerSynthesizer, LLMAnswerSynthesizer, DEFAULT_ANSWER_PROMPT};
pub use config::RagConfig;
pub use drug_rag::{DrugLabelRAG, DrugLabelRAGBuilder, RagAnswer};
