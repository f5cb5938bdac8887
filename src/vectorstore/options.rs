use std::sync::Arc;

use serde_json::Value;

use crate::embedding::Embedder;

/// Per-call options understood by every [`VectorStore`](super::VectorStore).
#[derive(Clone, Default)]
pub struct VecStoreOptions {
    pub name_space: Option<String>,
    pub score_threshold: Option<f32>,
    /// Exact-match metadata filter, a JSON object.
    pub filters: Option<Value>,
    /// Overrides the store's own embedder for this call.
    pub embedder: Option<Arc<dyn Embedder>>,
}

impl std::fmt::Debug for VecStoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VecStoreOptions")
            .field("name_space", &self.name_space)
            .field("score_threshold", &self.score_threshold)
            .field("filters", &self.filters)
            .field("embedder", &self.embedder.as_ref().map(|_| "<dyn Embedder>"))
            .finish()
    }
}

impl VecStoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_space<S: Into<String>>(mut self, name_space: S) -> Self {
        self.name_space = Some(name_space.into());
        self
    }

    pub fn with_score_threshold(mut self, score_threshold: f32) -> Self {
        self.score_threshold = Some(score_threshold);
        self
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_embedder<E: Embedder + 'static>(mut self, embedder: E) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }
}
