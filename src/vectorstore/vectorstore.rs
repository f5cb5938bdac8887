use async_trait::async_trait;

use crate::schemas::Document;

use super::{VecStoreOptions, VectorStoreError};

/// Similarity search provider over embedded documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn add_documents(
        &self,
        docs: &[Document],
        opt: &VecStoreOptions,
    ) -> Result<Vec<String>, VectorStoreError>;

    /// At most `limit` documents with their similarity, most similar first.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        limit: usize,
        opt: &VecStoreOptions,
    ) -> Result<Vec<(Document, f64)>, VectorStoreError>;

    async fn similarity_search(
        &self,
        query: &str,
        limit: usize,
        opt: &VecStoreOptions,
    ) -> Result<Vec<Document>, VectorStoreError> {
        let scored = self.similarity_search_with_score(query, limit, opt).await?;
        Ok(scored.into_iter().map(|(doc, _)| doc).collect())
    }

    /// Whether the underlying index exists and can be queried.
    fn is_loaded(&self) -> bool {
        true
    }
}
