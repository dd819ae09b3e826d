//! Token streams on top of the segmenter.

pub mod token;
pub mod tokenizer;

pub use token::*;
pub use tokenizer::*;
