//! Configuration for the segmenter.

use serde::{Deserialize, Serialize};

use crate::error::{QieError, Result};
use crate::route::TieBreak;

/// Configuration for a [`Segmenter`](crate::segmenter::Segmenter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Whether HMM recovery may run at all. A call asking for the HMM only
    /// gets it when this is set and a model is loaded.
    pub hmm_enabled: bool,

    /// Which edge wins on equal path scores.
    pub tie_break: TieBreak,

    /// Longest sub-word emitted by search mode.
    /// If None, every proper sub-word length is used.
    pub max_search_gram: Option<usize>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            hmm_enabled: true,
            tie_break: TieBreak::Longest,
            max_search_gram: None,
        }
    }
}

impl SegmenterConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SegmenterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable HMM recovery.
    pub fn with_hmm_enabled(mut self, enabled: bool) -> Self {
        self.hmm_enabled = enabled;
        self
    }

    /// Set the tie-break rule.
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Limit the sub-word length of search mode.
    pub fn with_max_search_gram(mut self, max_search_gram: usize) -> Self {
        self.max_search_gram = Some(max_search_gram);
        self
    }

    pub fn validate(&self) -> Result<()> {
        match self.max_search_gram {
            Some(gram) if gram < 2 => Err(QieError::invalid_argument(format!(
                "max_search_gram must be at least 2, got {gram}"
            ))),
            _ => Ok(()),
        }
    }
}
