use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, Stop,
    },
    Client,
};
use async_trait::async_trait;

use crate::{
    language_models::{llm::LLM, options::CallOptions, GenerateResult, LLMError, TokenUsage},
    schemas::{Message, MessageType},
};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// OpenAI chat completion client.
///
/// The API key defaults to the `OPENAI_API_KEY` environment variable.
#[derive(Clone)]
pub struct OpenAI {
    config: OpenAIConfig,
    model: String,
    options: CallOptions,
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAI {
    pub fn new() -> Self {
        Self {
            config: OpenAIConfig::new(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            options: CallOptions::default(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config = self.config.with_api_key(api_key);
        self
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.config = self.config.with_api_base(api_base);
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_openai_messages(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, LLMError> {
        messages
            .iter()
            .map(|m| {
                let message: ChatCompletionRequestMessage = match m.message_type {
                    MessageType::SystemMessage => ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content.clone())
                        .build()?
                        .into(),
                    MessageType::HumanMessage => ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content.clone())
                        .build()?
                        .into(),
                    MessageType::AIMessage => ChatCompletionRequestAssistantMessageArgs::default()
                        .content(m.content.clone())
                        .build()?
                        .into(),
                };
                Ok(message)
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message]) -> Result<CreateChatCompletionRequest, LLMError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(self.model.clone())
            .messages(Self::to_openai_messages(messages)?);

        if let Some(temperature) = self.options.temperature {
            builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.options.max_tokens {
            builder.max_completion_tokens(max_tokens);
        }
        if let Some(top_p) = self.options.top_p {
            builder.top_p(top_p);
        }
        if let Some(seed) = self.options.seed {
            builder.seed(seed);
        }
        if let Some(stop_words) = &self.options.stop_words {
            builder.stop(Stop::StringArray(stop_words.clone()));
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl LLM for OpenAI {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        let request = self.build_request(messages)?;
        let client = Client::with_config(self.config.clone());
        let chat = client.chat();
        let call = chat.create(request);

        let response = match self.options.timeout_duration() {
            Some(limit) => tokio::time::timeout(limit, call).await??,
            None => call.await?,
        };

        let generation = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LLMError::ContentNotFound("choices[0].message.content".to_string()))?;

        let tokens = response.usage.map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        });

        Ok(GenerateResult { tokens, generation })
    }
}
