//! Tokenizer backed by a shared [`Segmenter`].

use std::sync::Arc;

use super::Tokenizer;

use crate::analysis::token::{IntoTokenStream, Token, TokenStream};
use crate::error::Result;
use crate::segmenter::{Segmenter, TokenizeMode};

/// Splits Chinese text into words with a [`Segmenter`].
///
/// Whitespace tokens are dropped unless [`ChineseTokenizer::with_whitespace`]
/// asks for them; positions are renumbered over the kept tokens.
#[derive(Clone, Debug)]
pub struct ChineseTokenizer {
    segmenter: Arc<Segmenter>,
    mode: TokenizeMode,
    hmm: bool,
    keep_whitespace: bool,
}

impl ChineseTokenizer {
    /// Accurate mode with HMM recovery.
    pub fn new(segmenter: Arc<Segmenter>) -> Self {
        ChineseTokenizer {
            segmenter,
            mode: TokenizeMode::Accurate,
            hmm: true,
            keep_whitespace: false,
        }
    }

    pub fn with_mode(mut self, mode: TokenizeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_hmm(mut self, hmm: bool) -> Self {
        self.hmm = hmm;
        self
    }

    pub fn with_whitespace(mut self, keep: bool) -> Self {
        self.keep_whitespace = keep;
        self
    }

    pub fn mode(&self) -> TokenizeMode {
        self.mode
    }

    pub fn segmenter(&self) -> &Arc<Segmenter> {
        &self.segmenter
    }
}

impl Tokenizer for ChineseTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .segmenter
            .tokenize(text, self.mode, self.hmm)
            .into_iter()
            .filter(|token| self.keep_whitespace || !token.is_whitespace())
            .enumerate()
            .map(|(position, token)| token.with_position(position))
            .collect();
        Ok(tokens.into_token_stream())
    }

    fn name(&self) -> &'static str {
        "chinese"
    }
}
