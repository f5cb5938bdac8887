use std::time::Duration;

use crate::{
    error::RetrieverError,
    schemas::ScoredDocument,
    utils::with_optional_timeout,
    vectorstore::{VecStoreOptions, VectorStore},
};

/// Owned handle on the drug label index.
///
/// Acquired once at startup and handed to the retrievers that search it.
/// A store built with [`DocumentStore::unloaded`] answers every search with
/// [`RetrieverError::RetrievalUnavailable`].
pub struct DocumentStore {
    index: Option<Box<dyn VectorStore>>,
    options: VecStoreOptions,
    search_timeout: Option<Duration>,
}

impl DocumentStore {
    pub fn new<V: VectorStore + 'static>(index: V) -> Self {
        Self::from_boxed(Box::new(index))
    }

    pub fn from_boxed(index: Box<dyn VectorStore>) -> Self {
        Self {
            index: Some(index),
            options: VecStoreOptions::default(),
            search_timeout: None,
        }
    }

    pub fn unloaded() -> Self {
        Self {
            index: None,
            options: VecStoreOptions::default(),
            search_timeout: None,
        }
    }

    /// Take the first candidate index that reports itself loaded.
    ///
    /// Falls back to an unloaded store when none is.
    pub fn first_available<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn VectorStore>>,
    {
        for (position, index) in candidates.into_iter().enumerate() {
            if index.is_loaded() {
                log::info!("Using vector index candidate #{}", position + 1);
                return Self::from_boxed(index);
            }
            log::warn!("Vector index candidate #{} is not loaded, trying next", position + 1);
        }
        log::warn!("No loaded vector index found");
        Self::unloaded()
    }

    pub fn with_options(mut self, options: VecStoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Fail a single search that takes longer than `timeout`.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = Some(timeout);
        self
    }

    pub fn is_ready(&self) -> bool {
        self.index.as_ref().is_some_and(|index| index.is_loaded())
    }

    /// Up to `k` documents for `query`, most similar first.
    ///
    /// `k` larger than the corpus returns the whole corpus.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RetrieverError> {
        if k == 0 {
            return Err(RetrieverError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }

        let index = match &self.index {
            Some(index) if index.is_loaded() => index,
            _ => {
                return Err(RetrieverError::RetrievalUnavailable(
                    "vector index has not been loaded".to_string(),
                ))
            }
        };

        let hits = with_optional_timeout(
            self.search_timeout,
            index.similarity_search_with_score(query, k, &self.options),
        )
        .await
        .map_err(|_| {
            RetrieverError::TimeoutError(format!("similarity search for '{}' timed out", query))
        })??;

        Ok(hits
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(rank, (document, score))| ScoredDocument::new(document, score, rank))
            .collect())
    }
}
