use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;

use crate::embedding::{Embedder, EmbedderError};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// OpenAI embeddings client, the embedder the drug label index was built with.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    config: OpenAIConfig,
    model: String,
}

impl Default for OpenAiEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiEmbedder {
    pub fn new() -> Self {
        Self {
            config: OpenAIConfig::new(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
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

    pub fn with_api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.config = self.config.with_api_base(api_base);
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_documents(&self, documents: &[String]) -> Result<Vec<Vec<f64>>, EmbedderError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let client = Client::with_config(self.config.clone());
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(EmbeddingInput::StringArray(documents.to_vec()))
            .build()?;

        let mut response = client.embeddings().create(request).await?;
        if response.data.len() != documents.len() {
            return Err(EmbedderError::CountMismatch {
                expected: documents.len(),
                actual: response.data.len(),
            });
        }

        response.data.sort_by_key(|e| e.index);
        Ok(response
            .data
            .into_iter()
            .map(|e| e.embedding.into_iter().map(f64::from).collect())
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f64>, EmbedderError> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedderError::OtherError("empty embedding response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_documents_orders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "object": "list",
                    "model": "text-embedding-3-small",
                    "data": [
                        {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                        {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
                    ],
                    "usage": {"prompt_tokens": 4, "total_tokens": 4}
                }"#,
            )
            .create_async()
            .await;

        let embedder = OpenAiEmbedder::new()
            .with_api_key("test-key")
            .with_api_base(server.url());
        let vectors = embedder
            .embed_documents(&["ibuprofen".to_string(), "naproxen".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_embed_documents_empty_input_skips_request() {
        let embedder = OpenAiEmbedder::new()
            .with_api_key("test-key")
            .with_api_base("http://127.0.0.1:9");
        let vectors = embedder.embed_documents(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
