//! Token types produced by segmentation.
//!
//! A [`Token`] is one word of a segmented sentence together with its position
//! in the token stream and its character offsets in the original text.
//!
//! # Examples
//!
//! ```
//! use qie::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("长江", 1, 3, 5);
//! assert_eq!(token.text, "长江");
//! assert_eq!(token.start_offset, 3);
//! assert_eq!(token.end_offset, 5);
//! assert_eq!(token.len(), 2);
//! assert_eq!(token.token_type, TokenType::Cjk);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// One segmented word.
///
/// Offsets count characters, not bytes: `start_offset..end_offset` indexes
/// `text.chars()` of the sentence the token came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The word.
    pub text: String,

    /// Index of the token in the token stream (0-based).
    pub position: usize,

    /// Character offset where the token starts.
    pub start_offset: usize,

    /// Character offset just past the token.
    pub end_offset: usize,

    /// Coarse classification of the text.
    pub token_type: TokenType,
}

/// Coarse classification of token text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// CJK ideographs only.
    Cjk,
    /// ASCII letters and digits, possibly with `.`, `%` and similar.
    Alphanum,
    Whitespace,
    Punctuation,
    /// Anything else, including mixed scripts.
    Other,
}

impl TokenType {
    /// Classify `text`.
    pub fn classify(text: &str) -> Self {
        if text.is_empty() {
            return TokenType::Other;
        }
        if text.chars().all(is_cjk) {
            TokenType::Cjk
        } else if text.chars().all(char::is_whitespace) {
            TokenType::Whitespace
        } else if text.chars().any(|c| c.is_ascii_alphanumeric())
            && text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "+#&._%-".contains(c))
        {
            TokenType::Alphanum
        } else if text
            .chars()
            .all(|c| c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace()))
        {
            TokenType::Punctuation
        } else {
            TokenType::Other
        }
    }
}

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FD5}').contains(&c)
}

impl Token {
    /// Create a token without offsets.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Self::with_offsets(text, position, 0, 0)
    }

    /// Create a token with character offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        let text = text.into();
        let token_type = TokenType::classify(&text);
        Token {
            text,
            position,
            start_offset,
            end_offset,
            token_type,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Whether the token is whitespace only.
    pub fn is_whitespace(&self) -> bool {
        self.token_type == TokenType::Whitespace
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}..{}]", self.text, self.start_offset, self.end_offset)
    }
}

/// A stream of tokens.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Conversion into a [`TokenStream`].
pub trait IntoTokenStream {
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}
