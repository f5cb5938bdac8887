//! 统一的错误处理模块
//!
//! 汇总 drug-label-rag 各模块的错误类型。
//! 各模块保留自己的 thiserror 枚举，顶层的 [`DrugRagError`] 通过 `#[from]` 组合它们。

pub use crate::embedding::EmbedderError;
pub use crate::language_models::LLMError;
pub use crate::rag::RAGError;
pub use crate::retrievers::RetrieverError;
pub use crate::vectorstore::VectorStoreError;

pub mod utils;
pub use utils::*;

/// 统一的错误枚举，组合所有子模块错误
#[derive(thiserror::Error, Debug)]
pub enum DrugRagError {
    #[error("LLM error: {0}")]
    LLMError(#[from] LLMError),

    #[error("Embedder error: {0}")]
    EmbedderError(#[from] EmbedderError),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] VectorStoreError),

    #[error("Retriever error: {0}")]
    RetrieverError(#[from] RetrieverError),

    #[error("RAG error: {0}")]
    RAGError(#[from] RAGError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DrugRagError {
    /// 合成失败时已检索到的文档
    pub fn documents(&self) -> &[crate::schemas::Document] {
        match self {
            DrugRagError::RAGError(e) => e.documents(),
            _ => &[],
        }
    }
}

// 便利的类型别名
pub type Result<T> = std::result::Result<T, DrugRagError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::Document;

    #[test]
    fn test_retriever_error_creation() {
        let retriever_error = RetrieverError::RetrievalUnavailable("index missing".to_string());
        let error: DrugRagError = retriever_error.into();

        match error {
            DrugRagError::RetrieverError(_) => {}
            _ => panic!("Expected RetrieverError variant"),
        }
    }

    #[test]
    fn test_vectorstore_error_creation() {
        let error: DrugRagError = VectorStoreError::NotLoaded("drug_labels".to_string()).into();

        match error {
            DrugRagError::VectorStoreError(_) => {}
            _ => panic!("Expected VectorStoreError variant"),
        }
    }

    #[test]
    fn test_synthesis_error_keeps_documents() {
        let error: DrugRagError = RAGError::SynthesisError {
            message: "rate limited".to_string(),
            documents: vec![Document::new("Amoxicillin 500 mg capsules")],
        }
        .into();

        assert_eq!(error.documents().len(), 1);
        assert!(error.to_string().contains("rate limited"));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn search() -> Result<()> {
            Err(RetrieverError::InvalidParameter("k must be at least 1".to_string()))?;
            Ok(())
        }

        assert!(matches!(search(), Err(DrugRagError::RetrieverError(_))));
    }
}
