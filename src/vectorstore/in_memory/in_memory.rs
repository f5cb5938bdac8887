use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    embedding::Embedder,
    schemas::Document,
    utils::cosine_similarity_f64,
    vectorstore::{VecStoreOptions, VectorStore, VectorStoreError},
};

static IN_MEMORY_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_id() -> String {
    format!(
        "inmem-{}",
        IN_MEMORY_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// In-memory entry: (id, document, embedding, namespace)
type Entry = (String, Document, Vec<f64>, Option<String>);

/// Brute-force cosine similarity index held in memory.
///
/// Reports itself loaded once at least one document has been added.
pub struct Store {
    data: RwLock<Vec<Entry>>,
    embedder: Arc<dyn Embedder>,
}

pub struct StoreBuilder {
    embedder: Option<Arc<dyn Embedder>>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder { embedder: None }
    }

    pub fn embedder<E: Embedder + 'static>(mut self, embedder: E) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }

    pub fn shared_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn build(self) -> Result<Store, VectorStoreError> {
        let embedder = self.embedder.ok_or("embedder is required")?;
        Ok(Store {
            data: RwLock::new(Vec::new()),
            embedder,
        })
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn metadata_matches(
    doc_metadata: &HashMap<String, Value>,
    filter: &serde_json::Map<String, Value>,
) -> bool {
    filter
        .iter()
        .all(|(k, v)| matches!(doc_metadata.get(k), Some(dv) if dv == v))
}

#[async_trait]
impl VectorStore for Store {
    async fn add_documents(
        &self,
        docs: &[Document],
        opt: &VecStoreOptions,
    ) -> Result<Vec<String>, VectorStoreError> {
        let texts: Vec<String> = docs.iter().map(|d| d.page_content.clone()).collect();
        let embedder = opt.embedder.as_ref().unwrap_or(&self.embedder);
        let vectors = embedder.embed_documents(&texts).await?;
        if vectors.len() != docs.len() {
            return Err(VectorStoreError::InternalError(
                "Number of vectors and documents do not match".to_string(),
            ));
        }
        let namespace = opt.name_space.clone();
        let mut data = self.data.write().map_err(|e| e.to_string())?;
        let mut ids = Vec::with_capacity(docs.len());
        for (doc, vector) in docs.iter().zip(vectors) {
            let id = next_id();
            ids.push(id.clone());
            data.push((id, doc.clone(), vector, namespace.clone()));
        }
        Ok(ids)
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        limit: usize,
        opt: &VecStoreOptions,
    ) -> Result<Vec<(Document, f64)>, VectorStoreError> {
        let embedder = opt.embedder.as_ref().unwrap_or(&self.embedder);
        let query_vector = embedder.embed_query(query).await?;
        let data = self.data.read().map_err(|e| e.to_string())?;
        let namespace_filter = opt.name_space.as_deref();
        let score_threshold = opt
            .score_threshold
            .map(f64::from)
            .unwrap_or(f64::NEG_INFINITY);
        let filter_map = opt.filters.as_ref().and_then(|v| v.as_object());

        let mut scored: Vec<(f64, &Document)> = data
            .iter()
            .filter(|(_, _, _, ns)| match (namespace_filter, ns) {
                (None, _) => true,
                (Some(n), Some(s)) => n == s,
                (Some(_), None) => false,
            })
            .filter(|(_, doc, _, _)| {
                filter_map.map_or(true, |m| metadata_matches(&doc.metadata, m))
            })
            .map(|(_, doc, emb, _)| (cosine_similarity_f64(&query_vector, emb), doc))
            .filter(|(s, _)| *s >= score_threshold)
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, doc)| (doc.clone(), score))
            .collect())
    }

    fn is_loaded(&self) -> bool {
        !self.is_empty()
    }
}
