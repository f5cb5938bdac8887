use std::sync::Arc;

use crate::{
    rag::{AnswerSynthesizer, RAGError},
    retrievers::MultiQueryRetriever,
};

use super::drug_label_rag::DrugLabelRAG;

/// Builder for a [`DrugLabelRAG`] from already constructed stages.
///
/// Use [`DrugLabelRAG::from_config`] to wire the OpenAI-backed stages instead.
pub struct DrugLabelRAGBuilder {
    retriever: Option<Arc<MultiQueryRetriever>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
    k: Option<usize>,
}

impl DrugLabelRAGBuilder {
    pub fn new() -> Self {
        Self {
            retriever: None,
            synthesizer: None,
            k: None,
        }
    }

    /// Set the retriever
    pub fn with_retriever(mut self, retriever: MultiQueryRetriever) -> Self {
        self.retriever = Some(Arc::new(retriever));
        self
    }

    pub fn with_shared_retriever(mut self, retriever: Arc<MultiQueryRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the answer synthesizer
    pub fn with_synthesizer<S: AnswerSynthesizer + 'static>(mut self, synthesizer: S) -> Self {
        self.synthesizer = Some(Arc::new(synthesizer));
        self
    }

    /// Documents per query for [`DrugLabelRAG::answer_question`]; the retriever's `k` when unset.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn build(self) -> Result<DrugLabelRAG, RAGError> {
        let retriever = self
            .retriever
            .ok_or_else(|| RAGError::InvalidConfiguration("Retriever must be set".to_string()))?;

        let synthesizer = self.synthesizer.ok_or_else(|| {
            RAGError::InvalidConfiguration("Answer synthesizer must be set".to_string())
        })?;

        let k = self.k.unwrap_or(retriever.config().k);
        if k == 0 {
            return Err(RAGError::InvalidConfiguration(
                "k must be at least 1".to_string(),
            ));
        }

        Ok(DrugLabelRAG::from_parts(retriever, synthesizer, k))
    }
}

impl Default for DrugLabelRAGBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        error::RetrieverError,
        retrievers::{DocumentStore, MultiQueryRetrieverConfig, QueryExpander},
        schemas::Document,
    };

    struct NoExpander;

    #[async_trait]
    impl QueryExpander for NoExpander {
        async fn expand(&self, _question: &str, _n: usize) -> Result<Vec<String>, RetrieverError> {
            Ok(Vec::new())
        }
    }

    struct ConstSynthesizer;

    #[async_trait]
    impl AnswerSynthesizer for ConstSynthesizer {
        async fn synthesize(&self, _question: &str, _docs: &[Document]) -> Result<String, RAGError> {
            Ok("answer".to_string())
        }
    }

    fn retriever(k: usize) -> MultiQueryRetriever {
        MultiQueryRetriever::with_config(
            Arc::new(NoExpander),
            Arc::new(DocumentStore::unloaded()),
            MultiQueryRetrieverConfig {
                k,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_builder_creation() {
        let builder = DrugLabelRAGBuilder::new();
        assert!(builder.retriever.is_none());
        assert!(builder.synthesizer.is_none());
    }

    #[test]
    fn test_missing_parts_rejected() {
        let err = DrugLabelRAGBuilder::new()
            .with_synthesizer(ConstSynthesizer)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RAGError::InvalidConfiguration(_)));

        let err = DrugLabelRAGBuilder::new()
            .with_retriever(retriever(5))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RAGError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_k_defaults_to_retriever_config() {
        let rag = DrugLabelRAGBuilder::new()
            .with_retriever(retriever(4))
            .with_synthesizer(ConstSynthesizer)
            .build()
            .unwrap();
        assert_eq!(rag.k(), 4);

        let rag = DrugLabelRAGBuilder::new()
            .with_retriever(retriever(4))
            .with_synthesizer(ConstSynthesizer)
            .with_k(2)
            .build()
            .unwrap();
        assert_eq!(rag.k(), 2);
    }
}
