#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use drug_label_rag::{
    embedding::{Embedder, EmbedderError},
    error::RetrieverError,
    language_models::{llm::LLM, GenerateResult, LLMError},
    retrievers::QueryExpander,
    schemas::{Document, Message},
    vectorstore::{VecStoreOptions, VectorStore, VectorStoreError},
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn doc(content: &str) -> Document {
    Document::new(content)
}

pub fn label(content: &str, drug_name: &str, active_ingredient: &str, form: &str) -> Document {
    Document::new(content)
        .with_field("drug_name", drug_name)
        .with_field("active_ingredient", active_ingredient)
        .with_field("form", form)
}

/// Replies from a queue, one entry per call; `Err` entries fail the call.
pub struct ScriptedLLM {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLLM {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLM for ScriptedLLM {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        self.prompts
            .lock()
            .unwrap()
            .push(messages.iter().map(|m| m.content.as_str()).collect());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply left".to_string()));
        reply
            .map(|generation| GenerateResult {
                tokens: None,
                generation,
            })
            .map_err(LLMError::OtherError)
    }
}

/// Expands every question into a fixed list.
pub struct StaticExpander(pub Vec<String>);

impl StaticExpander {
    pub fn new(queries: &[&str]) -> Self {
        Self(queries.iter().map(|q| q.to_string()).collect())
    }
}

#[async_trait]
impl QueryExpander for StaticExpander {
    async fn expand(&self, _question: &str, n: usize) -> Result<Vec<String>, RetrieverError> {
        Ok(self.0.iter().take(n).cloned().collect())
    }
}

pub struct FailingExpander;

#[async_trait]
impl QueryExpander for FailingExpander {
    async fn expand(&self, _question: &str, _n: usize) -> Result<Vec<String>, RetrieverError> {
        Err(RetrieverError::GenerationError(LLMError::OtherError(
            "provider unreachable".to_string(),
        )))
    }
}

/// Vector index with canned hits per query that records every search it serves.
#[derive(Default)]
pub struct StubIndex {
    hits: HashMap<String, Vec<Document>>,
    failing: HashSet<String>,
    slow: HashMap<String, Duration>,
    requests: Arc<Mutex<Vec<(String, usize)>>>,
}

impl StubIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hits(mut self, query: &str, docs: Vec<Document>) -> Self {
        self.hits.insert(query.to_string(), docs);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    /// Answer `query` only after `delay`.
    pub fn slow_on(mut self, query: &str, delay: Duration) -> Self {
        self.slow.insert(query.to_string(), delay);
        self
    }

    /// Handle on the (query, k) log that outlives moving the index into a store.
    pub fn request_log(&self) -> Arc<Mutex<Vec<(String, usize)>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl VectorStore for StubIndex {
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
        self.requests
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        if let Some(delay) = self.slow.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(query) {
            return Err(VectorStoreError::InternalError(format!(
                "search failed for {}",
                query
            )));
        }
        Ok(self
            .hits
            .get(query)
            .map(|docs| {
                docs.iter()
                    .take(limit)
                    .enumerate()
                    .map(|(i, d)| (d.clone(), 1.0 - i as f64 * 0.1))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Bag-of-words embedder: each lowercase word is hashed into one of 1024 buckets.
pub struct HashingEmbedder;

const DIMENSIONS: usize = 1024;

fn bucket(word: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    word.hash(&mut hasher);
    (hasher.finish() % DIMENSIONS as u64) as usize
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        let mut out = Vec::with_capacity(documents.len());
        for d in documents {
            out.push(self.embed_query(d).await?);
        }
        Ok(out)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f64>, EmbedderError> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }
}
