use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{
    embedding::openai::{OpenAiEmbedder, DEFAULT_EMBEDDING_MODEL},
    language_models::{llm::LLM, options::CallOptions},
    llm::openai::{OpenAI, DEFAULT_OPENAI_MODEL},
    rag::{LLMAnswerSynthesizer, RAGError},
    retrievers::{FanOut, LLMQueryExpander, MultiQueryRetrieverConfig, QueryPolicy},
};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings for the whole question answering pipeline.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// generation_model = "gpt-4o"
/// num_queries = 3
/// query_policy = "include_original"
/// search_timeout_secs = 10
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub generation_model: String,
    pub embedding_model: String,
    /// OpenAI-compatible endpoint; the provider default when unset.
    pub api_base: Option<String>,
    pub num_queries: usize,
    pub k: usize,
    pub query_policy: QueryPolicy,
    pub fan_out: FanOut,
    pub max_concurrency: usize,
    pub search_timeout_secs: Option<u64>,
    pub generation_timeout_secs: Option<u64>,
    pub max_context_tokens: Option<usize>,
    pub max_documents: Option<usize>,
    pub temperature: f32,
    /// Never read from or written to files.
    #[serde(skip)]
    api_key: Option<SecretString>,
}

impl Default for RagConfig {
    fn default() -> Self {
        let retriever = MultiQueryRetrieverConfig::default();
        Self {
            generation_model: DEFAULT_OPENAI_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_base: None,
            num_queries: retriever.num_queries,
            k: retriever.k,
            query_policy: retriever.query_policy,
            fan_out: retriever.fan_out,
            max_concurrency: retriever.max_concurrency,
            search_timeout_secs: None,
            generation_timeout_secs: None,
            max_context_tokens: None,
            max_documents: None,
            temperature: 0.0,
            api_key: None,
        }
    }
}

impl RagConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, RAGError> {
        let config: RagConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RAGError> {
        let path = path.as_ref();
        log::debug!("Loading RAG config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), RAGError> {
        if self.k == 0 {
            return Err(RAGError::InvalidConfiguration(
                "k must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(RAGError::InvalidConfiguration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.generation_model.trim().is_empty() || self.embedding_model.trim().is_empty() {
            return Err(RAGError::InvalidConfiguration(
                "model names must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RAGError::InvalidConfiguration(format!(
                "temperature {} is outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.search_timeout_secs == Some(0) || self.generation_timeout_secs == Some(0) {
            return Err(RAGError::InvalidConfiguration(
                "timeouts must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// The explicit key, else `OPENAI_API_KEY` from the environment.
    pub fn api_key(&self) -> Option<SecretString> {
        let explicit = self
            .api_key
            .as_ref()
            .map(|key| SecretString::from(key.expose_secret().to_string()));
        explicit.or_else(|| {
            std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.is_empty())
                .map(SecretString::from)
        })
    }

    pub fn search_timeout(&self) -> Option<Duration> {
        self.search_timeout_secs.map(Duration::from_secs)
    }

    pub fn generation_timeout(&self) -> Option<Duration> {
        self.generation_timeout_secs.map(Duration::from_secs)
    }

    pub fn retriever_config(&self) -> MultiQueryRetrieverConfig {
        MultiQueryRetrieverConfig {
            num_queries: self.num_queries,
            k: self.k,
            query_policy: self.query_policy,
            fan_out: self.fan_out,
            max_concurrency: self.max_concurrency,
        }
    }

    pub fn openai_llm(&self) -> OpenAI {
        let mut options = CallOptions::new().with_temperature(self.temperature);
        if let Some(secs) = self.generation_timeout_secs {
            options = options.with_timeout(secs);
        }
        let mut llm = OpenAI::new()
            .with_model(self.generation_model.clone())
            .with_options(options);
        if let Some(base) = &self.api_base {
            llm = llm.with_api_base(base.clone());
        }
        if let Some(key) = self.api_key() {
            llm = llm.with_api_key(key.expose_secret());
        }
        llm
    }

    pub fn openai_embedder(&self) -> OpenAiEmbedder {
        let mut embedder = OpenAiEmbedder::new().with_model(self.embedding_model.clone());
        if let Some(base) = &self.api_base {
            embedder = embedder.with_api_base(base.clone());
        }
        if let Some(key) = self.api_key() {
            embedder = embedder.with_api_key(key.expose_secret());
        }
        embedder
    }

    pub fn query_expander(&self, llm: Arc<dyn LLM>) -> LLMQueryExpander {
        let expander = LLMQueryExpander::new(llm);
        match self.generation_timeout() {
            Some(timeout) => expander.with_timeout(timeout),
            None => expander,
        }
    }

    pub fn answer_synthesizer(&self, llm: Arc<dyn LLM>) -> Result<LLMAnswerSynthesizer, RAGError> {
        let mut synthesizer = LLMAnswerSynthesizer::new(llm);
        if let Some(timeout) = self.generation_timeout() {
            synthesizer = synthesizer.with_timeout(timeout);
        }
        if let Some(max_documents) = self.max_documents {
            synthesizer = synthesizer.with_max_documents(max_documents);
        }
        if let Some(max_tokens) = self.max_context_tokens {
            synthesizer = synthesizer.with_max_context_tokens(max_tokens)?;
        }
        Ok(synthesizer)
    }
}
