use std::sync::Arc;

use chromadb::{
    client::{ChromaClient, ChromaClientOptions},
    collection::ChromaCollection,
};

use crate::{embedding::Embedder, vectorstore::VectorStoreError};

use super::Store;

type CollectionLookup = Result<ChromaCollection, VectorStoreError>;

pub struct StoreBuilder {
    client: Option<ChromaClient>,
    client_options: Option<ChromaClientOptions>,
    embedder: Option<Arc<dyn Embedder>>,
    collection_name: Option<String>,
    create_if_missing: bool,
}

impl StoreBuilder {
    pub fn new() -> Self {
        StoreBuilder {
            client: None,
            client_options: None,
            embedder: None,
            collection_name: None,
            create_if_missing: false,
        }
    }

    pub fn client(mut self, client: ChromaClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn client_options(mut self, opts: ChromaClientOptions) -> Self {
        self.client_options = Some(opts);
        self
    }

    pub fn embedder<E: Embedder + 'static>(mut self, embedder: E) -> Self {
        self.embedder = Some(Arc::new(embedder));
        self
    }

    pub fn collection_name(mut self, name: &str) -> Self {
        self.collection_name = Some(name.to_string());
        self
    }

    /// Create the collection when it does not exist yet instead of failing.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Open the collection. Without `create_if_missing`, a missing collection
    /// is reported as [`VectorStoreError::NotLoaded`].
    pub async fn build(self) -> Result<Store, VectorStoreError> {
        let (embedder, collection_name, collection) = self.open().await?;
        Ok(Store {
            collection: Some(collection?),
            collection_name,
            embedder,
        })
    }

    /// Like [`StoreBuilder::build`], but an unreachable server or a missing
    /// collection yields a store whose `is_loaded` is false.
    pub async fn build_or_unloaded(self) -> Result<Store, VectorStoreError> {
        let (embedder, collection_name, collection) = self.open().await?;
        let collection = match collection {
            Ok(collection) => Some(collection),
            Err(e) => {
                log::warn!("Chroma collection '{}' is not available: {}", collection_name, e);
                None
            }
        };
        Ok(Store {
            collection,
            collection_name,
            embedder,
        })
    }

    /// Builder errors fail outright; the inner result is the collection lookup.
    async fn open(self) -> Result<(Arc<dyn Embedder>, String, CollectionLookup), VectorStoreError> {
        let embedder = self.embedder.ok_or("embedder is required")?;
        let collection_name = self.collection_name.ok_or("collection_name is required")?;
        let client = match self.client {
            Some(c) => c,
            None => {
                let opts = self.client_options.unwrap_or_default();
                match ChromaClient::new(opts).await {
                    Ok(client) => client,
                    Err(e) => {
                        let lookup = Err(VectorStoreError::NotLoaded(e.to_string()));
                        return Ok((embedder, collection_name, lookup));
                    }
                }
            }
        };
        let lookup = if self.create_if_missing {
            client
                .get_or_create_collection(&collection_name, None)
                .await
                .map_err(|e| VectorStoreError::Unknown(e.to_string()))
        } else {
            client
                .get_collection(&collection_name)
                .await
                .map_err(|e| VectorStoreError::NotLoaded(format!("{}: {}", collection_name, e)))
        };
        Ok((embedder, collection_name, lookup))
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        embedding::EmbedderError,
        vectorstore::{VecStoreOptions, VectorStore},
    };

    struct ZeroEmbedder;

    #[async_trait::async_trait]
    impl Embedder for ZeroEmbedder {
        async fn embed_documents(
            &self,
            documents: &[String],
        ) -> Result<Vec<Vec<f64>>, EmbedderError> {
            Ok(documents.iter().map(|_| vec![0.0; 3]).collect())
        }

        async fn embed_query(&self, _text: &str) -> Result<Vec<f64>, EmbedderError> {
            Ok(vec![0.0; 3])
        }
    }

    fn unreachable_server() -> ChromaClientOptions {
        ChromaClientOptions {
            url: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_build_requires_embedder() {
        let err = StoreBuilder::new()
            .collection_name("drug_labels")
            .build_or_unloaded()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, VectorStoreError::Unknown(_)));
    }

    #[tokio::test]
    async fn test_unreachable_collection_is_unloaded() {
        let store = StoreBuilder::new()
            .client_options(unreachable_server())
            .embedder(ZeroEmbedder)
            .collection_name("drug_labels")
            .build_or_unloaded()
            .await
            .unwrap();
        assert!(!store.is_loaded());

        let err = store
            .similarity_search("amoxicillin", 3, &VecStoreOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::NotLoaded(_)));
    }

    #[tokio::test]
    async fn test_build_reports_missing_collection() {
        let err = StoreBuilder::new()
            .client_options(unreachable_server())
            .embedder(ZeroEmbedder)
            .collection_name("drug_labels")
            .build()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, VectorStoreError::NotLoaded(_)));
    }
}
