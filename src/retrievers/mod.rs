//! Retrievers module
//!
//! The multi-query retrieval pipeline: the [`DocumentStore`] handle over the
//! vector index, query expansion, and the [`MultiQueryRetriever`] that fans a
//! question out over its reformulations and merges the hits.

mod error;
pub use error::*;

mod document_store;
pub use document_store::*;

mod query_enhancement;
pub use query_enhancement::*;
