//! Word frequency dictionary.
//!
//! The [`Dictionary`] maps words to occurrence frequencies and keeps the total
//! frequency used to normalize word probabilities. Words are stored in a
//! character trie, so every prefix of every word can be queried in
//! O(prefix length), which is what the DAG builder needs.
//!
//! A dictionary is read-only once built. New dictionaries are assembled with
//! [`DictionaryBuilder`], parsed from `word freq [tag]` lines, or restored from
//! a compiled cache (see [`cache`]).
//!
//! # Examples
//!
//! ```
//! use qie::dictionary::DictionaryBuilder;
//!
//! let mut builder = DictionaryBuilder::new();
//! builder.add_word("南京", 7809).unwrap();
//! builder.add_word("南京市", 1891).unwrap();
//! let dictionary = builder.build();
//!
//! assert_eq!(dictionary.get("南京"), Some(7809));
//! assert!(dictionary.contains_prefix("南京市"));
//! assert!(!dictionary.contains("南"));
//! assert_eq!(dictionary.total_freq(), 7809 + 1891);
//! assert_eq!(dictionary.max_word_len(), 3);
//! ```

pub mod builder;
pub mod cache;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{QieError, Result};

pub use builder::{DictionaryBuilder, WordDef, parse_line};

/// Dictionary shipped with the crate.
static DEFAULT_DICT: &str = include_str!("../../resources/dict.txt");

/// A node of the dictionary trie.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TrieNode {
    /// Child node indices keyed by the next character.
    children: AHashMap<char, u32>,
    /// Frequency when the path from the root to this node is a word.
    freq: Option<u64>,
}

/// Immutable word → frequency mapping with prefix lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    /// Trie arena; index 0 is the root.
    nodes: Vec<TrieNode>,
    /// Number of entries.
    len: usize,
    /// Sum of all entry frequencies.
    total_freq: u64,
    /// Length in characters of the longest entry.
    max_word_len: usize,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Dictionary {
            nodes: vec![TrieNode::default()],
            len: 0,
            total_freq: 0,
            max_word_len: 0,
        }
    }

    /// Parse the dictionary embedded in the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_reader(DEFAULT_DICT.as_bytes())
    }

    /// Parse a dictionary from `word freq [tag]` lines.
    ///
    /// The whole load fails on the first malformed line; the error names it.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut builder = DictionaryBuilder::new();
        builder.extend_from_reader(reader)?;
        Ok(builder.build())
    }

    /// Parse a dictionary file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            QieError::dictionary_load(
                None,
                format!("Failed to open dictionary '{}': {}", path.display(), e),
            )
        })?;
        let dictionary = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "Loaded {} words (total frequency {}) from {}",
            dictionary.len(),
            dictionary.total_freq(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Frequency of `word`, if it is an entry.
    pub fn get(&self, word: &str) -> Option<u64> {
        self.find(word.chars()).and_then(|node| self.nodes[node].freq)
    }

    /// Frequency of the word spelled by `chars`, if it is an entry.
    pub fn get_chars(&self, chars: &[char]) -> Option<u64> {
        self.find(chars.iter().copied())
            .and_then(|node| self.nodes[node].freq)
    }

    /// Whether `word` is an entry with a positive frequency.
    ///
    /// Entries with frequency 0 are kept for lookups but never count as words
    /// during segmentation.
    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some_and(|freq| freq > 0)
    }

    /// Whether `prefix` is a prefix of at least one entry (or an entry itself).
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.find(prefix.chars()).is_some()
    }

    /// Entries that are prefixes of `chars`, as `(length, frequency)` pairs in
    /// ascending length order.
    ///
    /// The walk stops as soon as the fragment stops being a dictionary prefix.
    pub fn prefixes_of(&self, chars: &[char]) -> Vec<(usize, u64)> {
        let mut matches = Vec::new();
        let mut node = 0usize;
        for (i, ch) in chars.iter().enumerate() {
            match self.nodes[node].children.get(ch) {
                Some(&child) => node = child as usize,
                None => break,
            }
            if let Some(freq) = self.nodes[node].freq {
                matches.push((i + 1, freq));
            }
        }
        matches
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the dictionary has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of all entry frequencies.
    pub fn total_freq(&self) -> u64 {
        self.total_freq
    }

    /// Length in characters of the longest entry.
    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }

    /// All entries in lexicographic character order.
    pub fn entries(&self) -> Vec<(String, u64)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack: Vec<(usize, String)> = vec![(0, String::new())];

        while let Some((node, word)) = stack.pop() {
            if let Some(freq) = self.nodes[node].freq {
                entries.push((word.clone(), freq));
            }
            let mut children: Vec<(char, u32)> = self.nodes[node]
                .children
                .iter()
                .map(|(ch, idx)| (*ch, *idx))
                .collect();
            // Reverse order so the smallest child is popped first.
            children.sort_unstable_by(|a, b| b.0.cmp(&a.0));
            for (ch, child) in children {
                let mut next = word.clone();
                next.push(ch);
                stack.push((child as usize, next));
            }
        }

        entries
    }

    /// Insert or replace an entry, keeping the total frequency consistent.
    pub(crate) fn insert(&mut self, word: &str, freq: u64) -> Result<()> {
        if word.is_empty() {
            return Err(QieError::dictionary_load(None, "empty word"));
        }

        let old = self.find(word.chars()).and_then(|node| self.nodes[node].freq);
        let total_freq = self
            .total_freq
            .checked_sub(old.unwrap_or(0))
            .and_then(|rest| rest.checked_add(freq))
            .ok_or_else(|| {
                QieError::dictionary_load(
                    None,
                    format!("total frequency overflow adding '{word}' ({freq})"),
                )
            })?;

        let mut node = 0usize;
        let mut word_len = 0usize;
        for ch in word.chars() {
            word_len += 1;
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child as usize,
                None => {
                    let child = self.nodes.len();
                    if child > u32::MAX as usize {
                        return Err(QieError::dictionary_load(None, "dictionary too large"));
                    }
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(ch, child as u32);
                    child
                }
            };
        }

        if self.nodes[node].freq.replace(freq).is_none() {
            self.len += 1;
        }
        self.total_freq = total_freq;
        self.max_word_len = self.max_word_len.max(word_len);
        Ok(())
    }

    fn find<I: Iterator<Item = char>>(&self, chars: I) -> Option<usize> {
        let mut node = 0usize;
        for ch in chars {
            node = *self.nodes[node].children.get(&ch)? as usize;
        }
        Some(node)
    }
}
