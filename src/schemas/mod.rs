mod document;
pub use document::*;

mod retrieval;
pub use retrieval::*;

pub mod messages;
pub use messages::*;

mod retrievers;
pub use retrievers::*;
