//! Tokenizers turning text into token streams.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use qie::analysis::tokenizer::{ChineseTokenizer, Tokenizer};
//! use qie::segmenter::Segmenter;
//!
//! let tokenizer = ChineseTokenizer::new(Arc::new(Segmenter::new().unwrap()));
//! let tokens: Vec<_> = tokenizer.tokenize("你好 世界").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[1].text, "世界");
//! assert_eq!(tokens[1].start_offset, 3);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so a tokenizer can be shared across
/// threads.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Name of this tokenizer, for logging and configuration.
    fn name(&self) -> &'static str;
}

pub mod chinese;

pub use chinese::ChineseTokenizer;
