use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::RetrieverError;
use crate::retrievers::DocumentStore;
use crate::schemas::{Document, MergedResultSet, Retriever, ScoredDocument};

use super::QueryExpander;

/// Which queries are searched for a question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPolicy {
    /// Search the generated reformulations only.
    #[default]
    ReformulationsOnly,
    /// Search the original question first, then the reformulations.
    IncludeOriginal,
}

/// How the per-query searches are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOut {
    Sequential,
    /// Up to `max_concurrency` searches in flight.
    #[default]
    Concurrent,
}

/// Configuration for Multi Query retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiQueryRetrieverConfig {
    /// Number of query variations to generate
    pub num_queries: usize,
    /// Documents requested per query when used through [`Retriever`]
    pub k: usize,
    pub query_policy: QueryPolicy,
    pub fan_out: FanOut,
    pub max_concurrency: usize,
}

impl Default for MultiQueryRetrieverConfig {
    fn default() -> Self {
        Self {
            num_queries: 5,
            k: 5,
            query_policy: QueryPolicy::default(),
            fan_out: FanOut::default(),
            max_concurrency: 5,
        }
    }
}

/// Something worth knowing about a retrieval that is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalEvent {
    /// Expansion produced no usable query; the original question was searched alone.
    EmptyExpansionFallback { question: String },
}

/// Merged documents plus how they were obtained.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// Queries searched, in the order their results were merged.
    pub queries: Vec<String>,
    pub documents: MergedResultSet,
    /// Queries whose search failed and contributed nothing.
    pub failed_queries: Vec<String>,
    pub events: Vec<RetrievalEvent>,
}

impl RetrievalOutcome {
    pub fn used_fallback(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, RetrievalEvent::EmptyExpansionFallback { .. }))
    }
}

/// Multi Query retriever that generates multiple query variations and merges results
///
/// Each reformulation is searched independently against the [`DocumentStore`];
/// the hit lists are flattened and deduplicated by document content. Scores are
/// not comparable across queries, so the merged set is never re-ranked.
pub struct MultiQueryRetriever {
    expander: Arc<dyn QueryExpander>,
    store: Arc<DocumentStore>,
    config: MultiQueryRetrieverConfig,
}

impl MultiQueryRetriever {
    /// Create a new multi query retriever
    pub fn new(expander: Arc<dyn QueryExpander>, store: Arc<DocumentStore>) -> Self {
        Self::with_config(expander, store, MultiQueryRetrieverConfig::default())
    }

    /// Create a new multi query retriever with custom config
    pub fn with_config(
        expander: Arc<dyn QueryExpander>,
        store: Arc<DocumentStore>,
        config: MultiQueryRetrieverConfig,
    ) -> Self {
        Self {
            expander,
            store,
            config,
        }
    }

    pub fn config(&self) -> &MultiQueryRetrieverConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Unique documents relevant to `question`, searching each query with `k`.
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<MergedResultSet, RetrieverError> {
        self.retrieve_with_report(question, k)
            .await
            .map(|outcome| outcome.documents)
    }

    pub async fn retrieve_with_report(
        &self,
        question: &str,
        k: usize,
    ) -> Result<RetrievalOutcome, RetrieverError> {
        if k == 0 {
            return Err(RetrieverError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }

        let reformulations = self
            .expander
            .expand(question, self.config.num_queries)
            .await?;
        log::info!("Generated {} alternative queries", reformulations.len());

        let mut events = Vec::new();
        let queries = if reformulations.is_empty() {
            log::warn!(
                "Query expansion returned no usable queries, searching the original question"
            );
            events.push(RetrievalEvent::EmptyExpansionFallback {
                question: question.to_string(),
            });
            vec![question.to_string()]
        } else {
            match self.config.query_policy {
                QueryPolicy::ReformulationsOnly => reformulations,
                QueryPolicy::IncludeOriginal => std::iter::once(question.to_string())
                    .chain(reformulations)
                    .collect(),
            }
        };

        let results = self.search_all(&queries, k).await;

        let mut hit_lists: Vec<Vec<ScoredDocument>> = Vec::with_capacity(queries.len());
        let mut failed_queries = Vec::new();
        let mut last_error = None;
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(hits) => {
                    log::debug!("Query '{}' returned {} documents", query, hits.len());
                    hit_lists.push(hits);
                }
                Err(e) => {
                    log::warn!("Error retrieving for query '{}': {}", query, e);
                    failed_queries.push(query.clone());
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error.filter(|_| failed_queries.len() == queries.len()) {
            return Err(RetrieverError::RetrievalUnavailable(format!(
                "all {} per-query searches failed, last error: {}",
                queries.len(),
                e
            )));
        }

        let documents = MergedResultSet::from_ranked_lists(hit_lists);
        log::info!(
            "Retrieved {} unique documents from {} queries",
            documents.len(),
            queries.len()
        );

        Ok(RetrievalOutcome {
            queries,
            documents,
            failed_queries,
            events,
        })
    }

    /// Results come back in `queries` order whatever order the searches finish in.
    async fn search_all(
        &self,
        queries: &[String],
        k: usize,
    ) -> Vec<Result<Vec<ScoredDocument>, RetrieverError>> {
        let in_flight = match self.config.fan_out {
            FanOut::Sequential => 1,
            FanOut::Concurrent => self.config.max_concurrency.max(1),
        };

        let searches: Vec<_> = queries
            .iter()
            .map(|query| self.store.search(query, k))
            .collect();
        stream::iter(searches).buffered(in_flight).collect().await
    }
}

#[async_trait]
impl Retriever for MultiQueryRetriever {
    async fn get_relevant_documents(&self, query: &str) -> Result<Vec<Document>, RetrieverError> {
        self.retrieve(query, self.config.k)
            .await
            .map(MergedResultSet::into_documents)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::vectorstore::{VecStoreOptions, VectorStore, VectorStoreError};

    struct ListExpander(Vec<&'static str>);

    #[async_trait]
    impl QueryExpander for ListExpander {
        async fn expand(&self, _question: &str, n: usize) -> Result<Vec<String>, RetrieverError> {
            Ok(self.0.iter().take(n).map(|q| q.to_string()).collect())
        }
    }

    struct LookupIndex(HashMap<&'static str, Vec<&'static str>>);

    #[async_trait]
    impl VectorStore for LookupIndex {
        async fn add_documents(
            &self,
            _docs: &[Document],
            _opt: &VecStoreOptions,
        ) -> Result<Vec<String>, VectorStoreError> {
            Ok(Vec::new())
        }

        async fn similarity_search_with_score(
            &self,
            query: &str,
            limit: usize,
            _opt: &VecStoreOptions,
        ) -> Result<Vec<(Document, f64)>, VectorStoreError> {
            let hits = self
                .0
                .get(query)
                .ok_or_else(|| VectorStoreError::Unknown(format!("no index for {}", query)))?;
            Ok(hits
                .iter()
                .take(limit)
                .map(|c| (Document::new(*c), 0.5))
                .collect())
        }
    }

    fn retriever(
        queries: Vec<&'static str>,
        index: Vec<(&'static str, Vec<&'static str>)>,
        config: MultiQueryRetrieverConfig,
    ) -> MultiQueryRetriever {
        MultiQueryRetriever::with_config(
            Arc::new(ListExpander(queries)),
            Arc::new(DocumentStore::new(LookupIndex(index.into_iter().collect()))),
            config,
        )
    }

    #[tokio::test]
    async fn test_include_original_policy_searches_question_first() {
        let r = retriever(
            vec!["reform"],
            vec![("question", vec!["from-original"]), ("reform", vec!["from-reform"])],
            MultiQueryRetrieverConfig {
                query_policy: QueryPolicy::IncludeOriginal,
                ..Default::default()
            },
        );
        let outcome = r.retrieve_with_report("question", 2).await.unwrap();
        assert_eq!(outcome.queries, vec!["question", "reform"]);
        assert_eq!(outcome.documents.documents()[0].page_content, "from-original");
        assert_eq!(outcome.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_is_absorbed() {
        let r = retriever(
            vec!["ok", "missing"],
            vec![("ok", vec!["a"])],
            MultiQueryRetrieverConfig::default(),
        );
        let outcome = r.retrieve_with_report("question", 2).await.unwrap();
        assert_eq!(outcome.failed_queries, vec!["missing"]);
        assert!(outcome.documents.contains_content("a"));
    }

    #[tokio::test]
    async fn test_sequential_and_concurrent_agree() {
        let index = vec![
            ("q1", vec!["a", "b"]),
            ("q2", vec!["b", "c"]),
            ("q3", vec!["d"]),
        ];
        let sequential = retriever(
            vec!["q1", "q2", "q3"],
            index.clone(),
            MultiQueryRetrieverConfig {
                fan_out: FanOut::Sequential,
                ..Default::default()
            },
        );
        let concurrent = retriever(
            vec!["q1", "q2", "q3"],
            index,
            MultiQueryRetrieverConfig::default(),
        );
        assert_eq!(
            sequential.retrieve("question", 2).await.unwrap(),
            concurrent.retrieve("question", 2).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_num_queries_limits_expansion() {
        let r = retriever(
            vec!["q1", "q2", "q3"],
            vec![("q1", vec!["a"]), ("q2", vec!["b"]), ("q3", vec!["c"])],
            MultiQueryRetrieverConfig {
                num_queries: 2,
                ..Default::default()
            },
        );
        let outcome = r.retrieve_with_report("question", 1).await.unwrap();
        assert_eq!(outcome.queries.len(), 2);
        assert!(!outcome.documents.contains_content("c"));
    }

    #[tokio::test]
    async fn test_retriever_trait_uses_configured_k() {
        let r = retriever(
            vec!["q1"],
            vec![("q1", vec!["a", "b", "c"])],
            MultiQueryRetrieverConfig {
                k: 2,
                ..Default::default()
            },
        );
        let docs = r.get_relevant_documents("question").await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_zero_k_rejected() {
        let r = retriever(vec!["q1"], vec![], MultiQueryRetrieverConfig::default());
        let err = r.retrieve("question", 0).await.unwrap_err();
        assert!(matches!(err, RetrieverError::InvalidParameter(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = MultiQueryRetrieverConfig::default();
        assert_eq!(config.num_queries, 5);
        assert_eq!(config.query_policy, QueryPolicy::ReformulationsOnly);
        assert_eq!(config.fan_out, FanOut::Concurrent);
    }
}
