use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chromadb::collection::{ChromaCollection, CollectionEntries, QueryOptions, QueryResult};
use serde_json::{Map, Value};

use crate::{
    embedding::Embedder,
    schemas::Document,
    vectorstore::{VecStoreOptions, VectorStore, VectorStoreError},
};

/// Drug label index persisted in a Chroma collection.
///
/// Built by [`super::StoreBuilder`]; `collection` is `None` when the
/// collection could not be opened.
pub struct Store {
    pub(super) collection: Option<ChromaCollection>,
    pub(super) collection_name: String,
    pub(super) embedder: Arc<dyn Embedder>,
}

impl Store {
    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn collection(&self) -> Result<&ChromaCollection, VectorStoreError> {
        self.collection.as_ref().ok_or_else(|| {
            VectorStoreError::NotLoaded(format!(
                "Chroma collection '{}' was not opened",
                self.collection_name
            ))
        })
    }
}

#[async_trait]
impl VectorStore for Store {
    async fn add_documents(
        &self,
        docs: &[Document],
        opt: &VecStoreOptions,
    ) -> Result<Vec<String>, VectorStoreError> {
        let collection = self.collection()?;
        let embedder = opt.embedder.as_ref().unwrap_or(&self.embedder);
        let texts: Vec<String> = docs.iter().map(|d| d.page_content.clone()).collect();
        let vectors = embedder.embed_documents(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(VectorStoreError::InternalError(
                "Number of vectors and documents do not match".to_string(),
            ));
        }
        let ids: Vec<String> = docs
            .iter()
            .map(|_| uuid::Uuid::new_v4().to_string())
            .collect();
        let embeddings_f32: Vec<Vec<f32>> = vectors
            .into_iter()
            .map(|v| v.into_iter().map(|x| x as f32).collect())
            .collect();
        let metadatas: Vec<Map<String, Value>> = docs
            .iter()
            .map(|d| {
                d.metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect();
        let entries = CollectionEntries {
            ids: ids.iter().map(|s| s.as_str()).collect(),
            embeddings: Some(embeddings_f32),
            metadatas: Some(metadatas),
            documents: Some(docs.iter().map(|d| d.page_content.as_str()).collect()),
        };
        collection
            .upsert(entries, None)
            .await
            .map_err(|e| VectorStoreError::Unknown(e.to_string()))?;
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        limit: usize,
        opt: &VecStoreOptions,
    ) -> Result<Vec<(Document, f64)>, VectorStoreError> {
        let collection = self.collection()?;
        let embedder = opt.embedder.as_ref().unwrap_or(&self.embedder);
        let qv = embedder.embed_query(query).await?;
        let qv_f32: Vec<f32> = qv.into_iter().map(|x| x as f32).collect();
        let query_opts = QueryOptions {
            query_embeddings: Some(vec![qv_f32]),
            query_texts: None,
            n_results: Some(limit),
            where_metadata: opt.filters.clone(),
            where_document: None,
            include: Some(vec!["documents", "metadatas", "distances"]),
        };
        let result: QueryResult = collection
            .query(query_opts, None)
            .await
            .map_err(|e| VectorStoreError::Unknown(e.to_string()))?;

        let documents = result.documents.and_then(|d| d.into_iter().next());
        let metadatas = result.metadatas.and_then(|m| m.into_iter().next());
        let distances = result.distances.and_then(|d| d.into_iter().next());
        let threshold = opt.score_threshold.map(f64::from);

        let Some(documents) = documents else {
            return Ok(Vec::new());
        };
        let metadatas = metadatas.unwrap_or_else(|| documents.iter().map(|_| None).collect());
        let distances = distances.unwrap_or_else(|| documents.iter().map(|_| 0.0_f32).collect());

        Ok(documents
            .into_iter()
            .zip(metadatas.into_iter().zip(distances))
            .map(|(page_content, (metadata, distance))| {
                let metadata: HashMap<String, Value> = metadata
                    .map(|m| m.into_iter().collect())
                    .unwrap_or_default();
                // Chroma reports distance, lower is closer.
                let score = 1.0 - (distance as f64).clamp(0.0, 1.0);
                (
                    Document {
                        page_content,
                        metadata,
                    },
                    score,
                )
            })
            .filter(|(_, score)| threshold.map_or(true, |t| *score >= t))
            .collect())
    }

    fn is_loaded(&self) -> bool {
        self.collection.is_some()
    }
}
