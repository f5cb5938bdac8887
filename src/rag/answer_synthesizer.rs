use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tiktoken_rs::CoreBPE;

use crate::{
    language_models::llm::LLM,
    rag::RAGError,
    schemas::Document,
    utils::with_optional_timeout,
};

/// Default answer prompt; `{context}` and `{question}` are substituted.
pub const DEFAULT_ANSWER_PROMPT: &str = "You are a pharmaceutical information assistant. \
    Answer the question using only the FDA drug label excerpts below. Mention the drug \
    names the answer relies on. If the excerpts do not contain the answer, say that you \
    don't know.\n\n\
    Drug label excerpts:\n{context}\n\n\
    Question: {question}\n\n\
    Answer:";

const DOCUMENT_SEPARATOR: &str = "\n\n";
const EMPTY_CONTEXT: &str = "(no drug label excerpts were retrieved)";

/// Produces an answer to a question from retrieved documents.
#[async_trait]
pub trait AnswerSynthesizer: Send + Sync {
    async fn synthesize(&self, question: &str, documents: &[Document]) -> Result<String, RAGError>;
}

/// Render one document as a context block: a metadata header line, then the text.
pub fn render_document(position: usize, doc: &Document) -> String {
    let info = doc.drug_info();
    format!(
        "[{}] Drug: {} | Active ingredient: {} | Form: {} | Sponsor: {} | Marketing status: {}\n{}",
        position + 1,
        info.drug_name,
        info.active_ingredient,
        info.form,
        info.sponsor_name,
        info.marketing_status,
        doc.page_content
    )
}

/// [`AnswerSynthesizer`] that stuffs the documents into one LLM prompt.
///
/// Documents are kept in the order given. When `max_documents` or
/// `max_context_tokens` is exceeded, documents are dropped from the end.
pub struct LLMAnswerSynthesizer {
    llm: Arc<dyn LLM>,
    prompt_template: Option<String>,
    max_documents: Option<usize>,
    max_context_tokens: Option<usize>,
    tokenizer: Option<Arc<CoreBPE>>,
    timeout: Option<Duration>,
}

impl LLMAnswerSynthesizer {
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self {
            llm,
            prompt_template: None,
            max_documents: None,
            max_context_tokens: None,
            tokenizer: None,
            timeout: None,
        }
    }

    pub fn with_prompt<S: Into<String>>(mut self, prompt_template: S) -> Self {
        self.prompt_template = Some(prompt_template.into());
        self
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = Some(max_documents);
        self
    }

    /// Cap the context at `max_tokens` cl100k tokens.
    pub fn with_max_context_tokens(mut self, max_tokens: usize) -> Result<Self, RAGError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            RAGError::InvalidConfiguration(format!("tokenizer unavailable: {}", e))
        })?;
        self.tokenizer = Some(Arc::new(bpe));
        self.max_context_tokens = Some(max_tokens);
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The context block sent to the model for `documents`.
    ///
    /// With a token budget, the joined context including separators stays
    /// within `max_context_tokens`.
    pub fn build_context(&self, documents: &[Document]) -> String {
        let limit = self.max_documents.unwrap_or(usize::MAX);
        let budget = self.max_context_tokens.zip(self.tokenizer.as_ref());

        let mut context = String::new();
        let mut kept = 0;
        let mut over_budget = false;
        for (position, doc) in documents.iter().take(limit).enumerate() {
            let block = render_document(position, doc);
            let candidate = if context.is_empty() {
                block
            } else {
                format!("{}{}{}", context, DOCUMENT_SEPARATOR, block)
            };
            if let Some((max_tokens, bpe)) = budget {
                if bpe.encode_with_special_tokens(&candidate).len() > max_tokens {
                    over_budget = true;
                    break;
                }
            }
            context = candidate;
            kept += 1;
        }

        if kept < documents.len() {
            let cause = if over_budget {
                "max_context_tokens"
            } else {
                "max_documents"
            };
            log::debug!(
                "Context limited to {} of {} documents by {}",
                kept,
                documents.len(),
                cause
            );
        }
        if kept == 0 && !documents.is_empty() {
            log::warn!("No document fits in the context budget");
        }

        context
    }

    fn render_prompt(&self, question: &str, context: &str) -> String {
        let context = if context.is_empty() { EMPTY_CONTEXT } else { context };
        self.prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_ANSWER_PROMPT)
            .replace("{context}", context)
            .replace("{question}", question)
    }
}

#[async_trait]
impl AnswerSynthesizer for LLMAnswerSynthesizer {
    async fn synthesize(&self, question: &str, documents: &[Document]) -> Result<String, RAGError> {
        let context = self.build_context(documents);
        let prompt = self.render_prompt(question, &context);

        let message = match with_optional_timeout(self.timeout, self.llm.invoke(&prompt)).await {
            Ok(Ok(answer)) => return Ok(answer.trim().to_string()),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "answer generation timed out".to_string(),
        };

        Err(RAGError::SynthesisError {
            message,
            documents: documents.to_vec(),
        })
    }
}
