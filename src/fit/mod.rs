//! Model fitting helpers.
//!
//! - chronological train/test partitioning (`split`)

pub mod split;

pub use split::*;
