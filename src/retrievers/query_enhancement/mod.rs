//! Query enhancement retrievers
//!
//! These retrievers rewrite the incoming question before searching the document store.

mod query_expander;
pub use query_expander::*;

mod multi_query_retriever;
pub use multi_query_retriever::*;
