use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RetrieverError;
use crate::language_models::{llm::LLM, LLMError};
use crate::utils::with_optional_timeout;

/// Default instruction sent to the text-generation provider.
///
/// `{num_queries}` and `{question}` are substituted before the call.
pub const DEFAULT_EXPANSION_PROMPT: &str = "You are an AI language model assistant helping \
    people search a database of FDA drug labels. Your task is to generate {num_queries} \
    different versions of the given user question to retrieve relevant drug label documents \
    from a vector database. Keep the intent of the question but vary its wording and \
    perspective (brand versus generic names, active ingredients, dosage forms, clinical \
    terminology) so that the search is less limited by distance-based similarity. \
    Provide these alternative questions separated by newlines, one per line.\n\n\
    Original question: {question}";

/// Turns one question into alternative phrasings of it.
#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Up to `n` reformulations, in provider order. May be empty.
    async fn expand(&self, question: &str, n: usize) -> Result<Vec<String>, RetrieverError>;
}

/// Split raw provider output into reformulations.
///
/// Lines are trimmed and blank ones dropped; duplicates are kept.
pub fn parse_reformulations(raw: &str, n: usize) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(n)
        .map(str::to_string)
        .collect()
}

/// [`QueryExpander`] backed by an [`LLM`].
pub struct LLMQueryExpander {
    llm: Arc<dyn LLM>,
    prompt_template: Option<String>,
    timeout: Option<Duration>,
}

impl LLMQueryExpander {
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self {
            llm,
            prompt_template: None,
            timeout: None,
        }
    }

    /// Replace the instruction; `{question}` and `{num_queries}` are substituted.
    pub fn with_prompt<S: Into<String>>(mut self, prompt_template: S) -> Self {
        self.prompt_template = Some(prompt_template.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn render_prompt(&self, question: &str, n: usize) -> String {
        self.prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_EXPANSION_PROMPT)
            .replace("{num_queries}", &n.to_string())
            .replace("{question}", question)
    }
}

#[async_trait]
impl QueryExpander for LLMQueryExpander {
    async fn expand(&self, question: &str, n: usize) -> Result<Vec<String>, RetrieverError> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let prompt = self.render_prompt(question, n);
        let raw = with_optional_timeout(self.timeout, self.llm.invoke(&prompt))
            .await
            .map_err(LLMError::from)??;

        let queries = parse_reformulations(&raw, n);
        log::debug!("Generated queries for '{}': {:?}", question, queries);
        Ok(queries)
    }
}
