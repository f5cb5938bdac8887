mod error;
mod options;

#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "chroma")]
pub mod chroma;

mod vectorstore;

pub use error::*;
pub use options::*;
pub use vectorstore::*;
