//! Error types for the kbsearch protocol layer.

mod embedding;
mod index;
mod search;

pub use embedding::*;
pub use index::*;
pub use search::*;
