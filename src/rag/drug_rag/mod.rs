mod builder;
mod drug_label_rag;

pub use builder::*;
pub use drug_label_rag::*;
