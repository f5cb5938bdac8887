//! # drug-label-rag
//!
//! Question answering over FDA drug labels with multi-query retrieval.
//!
//! A question is rewritten into several reformulations by an LLM, each
//! reformulation is searched against a vector index of drug label documents,
//! the hit lists are merged and deduplicated by content, and one answer is
//! synthesized from the merged documents.
//!
//! ## Overview
//!
//! - **Retrievers**: [`retrievers::DocumentStore`], query expansion, and the
//!   [`retrievers::MultiQueryRetriever`]
//! - **RAG**: answer synthesis, configuration, and the [`rag::DrugLabelRAG`] facade
//! - **Vector stores**: in-memory cosine store (default), Chroma (`chroma` feature)
//! - **LLMs and embeddings**: OpenAI chat completions and embeddings
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use drug_label_rag::rag::{DrugLabelRAG, RagConfig};
//! use drug_label_rag::retrievers::DocumentStore;
//! use drug_label_rag::schemas::Document;
//! use drug_label_rag::vectorstore::{in_memory::StoreBuilder, VecStoreOptions, VectorStore};
//!
//! # async fn run(labels: Vec<Document>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = RagConfig::from_path("drug-rag.toml")?;
//! let index = StoreBuilder::new().embedder(config.openai_embedder()).build()?;
//! index.add_documents(&labels, &VecStoreOptions::default()).await?;
//! let rag = DrugLabelRAG::from_config(&config, DocumentStore::new(index), Arc::new(config.openai_llm()))?;
//! let answer = rag.answer_question("What are the side effects of amoxicillin?").await?;
//! println!("{}", answer.answer);
//! # Ok(()) }
//! ```

/// Embedding models (OpenAI).
pub mod embedding;
/// Unified error types and utilities.
pub mod error;
/// Common LLM traits and call options.
pub mod language_models;
/// LLM implementations (OpenAI).
pub mod llm;
/// RAG: answer synthesis, configuration, and the question answering facade.
pub mod rag;
/// Document store handle, query expansion, and the multi-query retriever.
pub mod retrievers;
/// Schemas: documents, merged result sets, messages, the retriever trait.
pub mod schemas;
/// Utilities: similarity, async helpers.
pub mod utils;
/// Vector stores: in-memory, Chroma (feature-gated).
pub mod vectorstore;

// ============================================================================
// Type Aliases for Common Type Combinations
// ============================================================================

/// Type alias for message list
pub type Messages = Vec<crate::schemas::Message>;

/// Type alias for embedding vector (f64)
pub type Embedding = Vec<f64>;

/// Type alias for document list
pub type Documents = Vec<crate::schemas::Document>;
