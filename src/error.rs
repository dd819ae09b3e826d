//! Error types for the Qie library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`QieError`] enum. Segmentation itself never fails: the only failure points
//! are loading dictionaries, HMM parameters and dictionary caches.
//!
//! # Examples
//!
//! ```
//! use qie::error::{QieError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(QieError::dictionary_load(Some(3), "invalid frequency 'abc'"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Qie operations.
#[derive(Error, Debug)]
pub enum QieError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or unreadable dictionary source. Fatal to construction.
    #[error("Dictionary load error{}: {reason}", line_suffix(.line))]
    DictionaryLoad {
        /// 1-based line number of the offending line, when known.
        line: Option<usize>,
        /// What was wrong with it.
        reason: String,
    },

    /// Malformed HMM parameter resource.
    #[error("HMM parameter error: {0}")]
    HmmParameter(String),

    /// Input rejected by an optional stricter validation layer.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Dictionary cache errors (bad magic, version mismatch, decode failure)
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" at line {line}"),
        None => String::new(),
    }
}

/// Result type alias for operations that may fail with QieError.
pub type Result<T> = std::result::Result<T, QieError>;

impl QieError {
    /// Create a new dictionary load error.
    pub fn dictionary_load<S: Into<String>>(line: Option<usize>, reason: S) -> Self {
        QieError::DictionaryLoad {
            line,
            reason: reason.into(),
        }
    }

    /// Create a new HMM parameter error.
    pub fn hmm<S: Into<String>>(msg: S) -> Self {
        QieError::HmmParameter(msg.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        QieError::InvalidInput(msg.into())
    }

    /// Create a new cache error.
    pub fn cache<S: Into<String>>(msg: S) -> Self {
        QieError::Cache(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        QieError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        QieError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
