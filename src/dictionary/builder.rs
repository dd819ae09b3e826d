//! Dictionary construction and `word freq [tag]` line parsing.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{QieError, Result};

/// A word definition as supplied by a caller or a user dictionary line.
///
/// `freq` is optional: a missing frequency asks the segmenter to suggest one
/// that keeps the word whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDef {
    pub word: String,
    pub freq: Option<u64>,
}

impl WordDef {
    /// Create a definition with an explicit frequency.
    pub fn new<S: Into<String>>(word: S, freq: u64) -> Self {
        WordDef {
            word: word.into(),
            freq: Some(freq),
        }
    }

    /// Create a definition whose frequency will be suggested.
    pub fn word<S: Into<String>>(word: S) -> Self {
        WordDef {
            word: word.into(),
            freq: None,
        }
    }
}

/// Parse one dictionary line.
///
/// Returns `Ok(None)` for blank lines. `line_no` is 1-based and only used in
/// error messages. When `require_freq` is false a line holding just a word is
/// accepted; the trailing part-of-speech column is accepted and ignored.
pub fn parse_line(line_no: usize, line: &str, require_freq: bool) -> Result<Option<WordDef>> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };

    let freq = match parts.next() {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            QieError::dictionary_load(Some(line_no), format!("invalid frequency '{raw}'"))
        })?),
        None if require_freq => {
            return Err(QieError::dictionary_load(
                Some(line_no),
                format!("missing frequency for '{word}'"),
            ));
        }
        None => None,
    };

    // Optional part-of-speech column; anything beyond it is malformed.
    let _tag = parts.next();
    if let Some(extra) = parts.next() {
        return Err(QieError::dictionary_load(
            Some(line_no),
            format!("unexpected trailing field '{extra}'"),
        ));
    }

    Ok(Some(WordDef {
        word: word.to_string(),
        freq,
    }))
}

/// Read every definition from `reader`, failing on the first malformed line.
pub fn read_word_defs<R: BufRead>(reader: R, require_freq: bool) -> Result<Vec<WordDef>> {
    let mut defs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|e| QieError::dictionary_load(Some(line_no), e.to_string()))?;
        let line = if line_no == 1 {
            line.trim_start_matches('\u{feff}')
        } else {
            line.as_str()
        };
        if let Some(def) = parse_line(line_no, line, require_freq)? {
            defs.push(def);
        }
    }
    Ok(defs)
}

/// Incrementally assembles a [`Dictionary`].
#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder {
    dictionary: Dictionary,
}

impl DictionaryBuilder {
    /// Create a builder for an empty dictionary.
    pub fn new() -> Self {
        DictionaryBuilder {
            dictionary: Dictionary::new(),
        }
    }

    /// Start from an existing dictionary.
    pub fn from_dictionary(dictionary: Dictionary) -> Self {
        DictionaryBuilder { dictionary }
    }

    /// Add or replace a word.
    pub fn add_word(&mut self, word: &str, freq: u64) -> Result<&mut Self> {
        self.dictionary.insert(word, freq)?;
        Ok(self)
    }

    /// Add every `word freq [tag]` line of `reader`.
    ///
    /// Nothing is added when any line is malformed.
    pub fn extend_from_reader<R: BufRead>(&mut self, reader: R) -> Result<&mut Self> {
        let defs = read_word_defs(reader, true)?;
        let mut next = self.dictionary.clone();
        for def in defs {
            // require_freq guarantees a frequency here
            next.insert(&def.word, def.freq.unwrap_or_default())?;
        }
        self.dictionary = next;
        Ok(self)
    }

    /// Finish building.
    pub fn build(self) -> Dictionary {
        self.dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line(1, "长江 6052 ns", true).unwrap(),
            Some(WordDef::new("长江", 6052))
        );
        assert_eq!(
            parse_line(1, "长江\t6052", true).unwrap(),
            Some(WordDef::new("长江", 6052))
        );
        assert_eq!(parse_line(1, "   ", true).unwrap(), None);
        assert_eq!(
            parse_line(1, "杭研", false).unwrap(),
            Some(WordDef::word("杭研"))
        );
    }

    #[test]
    fn test_parse_line_errors() {
        let err = parse_line(4, "长江 abc", true).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Dictionary load error at line 4: invalid frequency 'abc'"
        );

        let err = parse_line(9, "长江", true).unwrap_err();
        assert!(matches!(
            err,
            QieError::DictionaryLoad { line: Some(9), .. }
        ));

        assert!(parse_line(2, "长江 1 ns extra", true).is_err());
        assert!(parse_line(2, "长江 -5", true).is_err());
    }

    #[test]
    fn test_extend_from_reader() {
        let source = "\u{feff}南京 7809 ns\n\n南京市 1891 ns\n";
        let mut builder = DictionaryBuilder::new();
        builder.extend_from_reader(source.as_bytes()).unwrap();
        let dict = builder.build();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.get("南京"), Some(7809));
        assert_eq!(dict.total_freq(), 7809 + 1891);
    }

    #[test]
    fn test_malformed_line_fails_whole_load() {
        let mut builder = DictionaryBuilder::new();
        builder.add_word("长江", 10).unwrap();

        let source = "南京 7809\n南京市 x\n";
        let err = builder.extend_from_reader(source.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            QieError::DictionaryLoad { line: Some(2), .. }
        ));

        // The earlier good line was not applied either.
        let dict = builder.build();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("南京"), None);
    }

    #[test]
    fn test_total_frequency_overflow_fails() {
        let source = "甲 18446744073709551615\n乙 1\n";
        let err = Dictionary::from_reader(source.as_bytes()).unwrap_err();
        assert!(matches!(err, QieError::DictionaryLoad { .. }));
        assert!(err.to_string().contains("total frequency overflow"));

        let mut builder = DictionaryBuilder::new();
        builder.add_word("甲", u64::MAX).unwrap();
        assert!(builder.add_word("乙", 1).is_err());
        // Replacing the only entry frees its share of the total.
        builder.add_word("甲", u64::MAX - 1).unwrap();
        builder.add_word("乙", 1).unwrap();

        let dict = builder.build();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.total_freq(), u64::MAX);
        assert_eq!(dict.get("乙"), Some(1));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let source: &[u8] = b"ok 1\n\xff\xfe 2\n";
        let err = Dictionary::from_reader(source).unwrap_err();
        assert!(matches!(
            err,
            QieError::DictionaryLoad { line: Some(2), .. }
        ));
    }
}
