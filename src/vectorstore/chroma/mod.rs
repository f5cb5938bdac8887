mod builder;
mod chroma;

pub use builder::*;
pub use chroma::*;
