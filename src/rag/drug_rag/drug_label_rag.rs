use std::sync::Arc;

use serde::Serialize;

use crate::{
    language_models::llm::LLM,
    rag::{AnswerSynthesizer, RAGError, RagConfig},
    retrievers::{DocumentStore, MultiQueryRetriever, RetrievalOutcome},
    schemas::{Document, MergedResultSet},
};

/// An answer plus the documents it was synthesized from.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    pub documents: Vec<Document>,
}

/// Question answering over FDA drug labels.
///
/// Retrieval always runs before generation: the question is expanded into
/// reformulations, each is searched, the hits are merged, and one answer is
/// synthesized from the merged documents.
pub struct DrugLabelRAG {
    retriever: Arc<MultiQueryRetriever>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
    k: usize,
}

impl DrugLabelRAG {
    pub(crate) fn from_parts(
        retriever: Arc<MultiQueryRetriever>,
        synthesizer: Arc<dyn AnswerSynthesizer>,
        k: usize,
    ) -> Self {
        Self {
            retriever,
            synthesizer,
            k,
        }
    }

    /// Wire the full pipeline from `config`, one LLM serving both expansion and synthesis.
    pub fn from_config(
        config: &RagConfig,
        store: DocumentStore,
        llm: Arc<dyn LLM>,
    ) -> Result<Self, RAGError> {
        config.validate()?;

        let store = match config.search_timeout() {
            Some(timeout) => store.with_search_timeout(timeout),
            None => store,
        };
        let retriever = MultiQueryRetriever::with_config(
            Arc::new(config.query_expander(llm.clone())),
            Arc::new(store),
            config.retriever_config(),
        );
        let synthesizer = config.answer_synthesizer(llm)?;

        Ok(Self::from_parts(
            Arc::new(retriever),
            Arc::new(synthesizer),
            config.k,
        ))
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn retriever(&self) -> &MultiQueryRetriever {
        &self.retriever
    }

    /// Unique documents relevant to `question`, searching each query with `k`.
    pub async fn retrieve_documents(
        &self,
        question: &str,
        k: usize,
    ) -> Result<MergedResultSet, RAGError> {
        Ok(self.retriever.retrieve(question, k).await?)
    }

    pub async fn retrieve_with_report(
        &self,
        question: &str,
        k: usize,
    ) -> Result<RetrievalOutcome, RAGError> {
        Ok(self.retriever.retrieve_with_report(question, k).await?)
    }

    /// Answer `question` with the configured `k`.
    pub async fn answer_question(&self, question: &str) -> Result<RagAnswer, RAGError> {
        self.answer_question_with_k(question, self.k).await
    }

    /// On synthesis failure the error still carries the retrieved documents.
    pub async fn answer_question_with_k(
        &self,
        question: &str,
        k: usize,
    ) -> Result<RagAnswer, RAGError> {
        let documents = self.retrieve_documents(question, k).await?.into_documents();
        log::debug!(
            "Synthesizing answer from {} documents for '{}'",
            documents.len(),
            question
        );

        match self.synthesizer.synthesize(question, &documents).await {
            Ok(answer) => Ok(RagAnswer { answer, documents }),
            Err(e) => {
                log::warn!("Answer synthesis failed: {}", e);
                let message = match e {
                    RAGError::SynthesisError { message, .. } => message,
                    other => other.to_string(),
                };
                Err(RAGError::SynthesisError { message, documents })
            }
        }
    }
}
