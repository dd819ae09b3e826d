//! # Qie
//!
//! Chinese word segmentation for Rust.
//!
//! ## Features
//!
//! - Trie dictionary with word frequencies
//! - Maximum-likelihood segmentation over the word graph
//! - HMM recovery of words missing from the dictionary
//! - Accurate, full and search modes
//! - Run-time dictionary updates without blocking readers
//! - Compiled, memory-mapped dictionary caches
//!
//! ```
//! use qie::prelude::*;
//!
//! let segmenter = Segmenter::new().unwrap();
//! assert_eq!(segmenter.cut("南京市长江大桥", true), vec!["南京市", "长江大桥"]);
//! ```

pub mod analysis;
pub mod cli;
pub mod dag;
pub mod dictionary;
pub mod error;
pub mod hmm;
pub mod route;
pub mod segmenter;

pub mod prelude {
    pub use crate::analysis::token::{Token, TokenStream, TokenType};
    pub use crate::analysis::tokenizer::{ChineseTokenizer, Tokenizer};
    pub use crate::dictionary::{Dictionary, DictionaryBuilder, WordDef};
    pub use crate::error::{QieError, Result};
    pub use crate::hmm::HmmModel;
    pub use crate::route::TieBreak;
    pub use crate::segmenter::{Segmenter, SegmenterBuilder, SegmenterConfig, TokenizeMode};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
