//! Shared helpers.

pub mod async_utils;
pub mod similarity;

pub use async_utils::*;
pub use similarity::*;
