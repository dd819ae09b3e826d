//! Chinese word segmentation.
//!
//! A [`Segmenter`] owns a dictionary snapshot and an optional HMM model and
//! offers three modes:
//!
//! - accurate ([`Segmenter::cut`]): the most probable segmentation, with
//!   unknown runs recovered by the HMM;
//! - full ([`Segmenter::cut_all`]): every dictionary word found anywhere;
//! - search ([`Segmenter::cut_for_search`]): accurate, plus the dictionary
//!   sub-words of long tokens.
//!
//! The dictionary can be extended at run time. Updates build a new snapshot
//! and publish it atomically; calls already running keep the snapshot they
//! started with.
//!
//! # Examples
//!
//! ```
//! use qie::segmenter::Segmenter;
//!
//! let segmenter = Segmenter::new().unwrap();
//! assert_eq!(segmenter.cut("你好世界", true), vec!["你好", "世界"]);
//! ```

mod block;
pub mod config;
mod engine;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::dictionary::{Dictionary, WordDef, builder::read_word_defs};
use crate::error::{QieError, Result};
use crate::hmm::HmmModel;

pub use config::SegmenterConfig;
use engine::Engine;

/// Segmentation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenizeMode {
    /// Most probable segmentation.
    #[default]
    Accurate,
    /// Every dictionary word, overlapping.
    Full,
    /// Accurate plus sub-words of long tokens.
    Search,
}

/// Word segmenter.
///
/// `Segmenter` is `Send + Sync`; share it behind an `Arc` and cut from as many
/// threads as needed.
#[derive(Debug)]
pub struct Segmenter {
    dictionary: RwLock<Arc<Dictionary>>,
    hmm: Option<Arc<HmmModel>>,
    config: SegmenterConfig,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new().expect("Built-in dictionary should always parse")
    }
}

impl Segmenter {
    /// Segmenter with the built-in dictionary and the demonstration HMM
    /// model. Use [`SegmenterBuilder::hmm_path`] for a trained model.
    pub fn new() -> Result<Self> {
        let dictionary = Dictionary::builtin()?;
        info!(
            "Loaded built-in dictionary: {} words, total frequency {}",
            dictionary.len(),
            dictionary.total_freq()
        );
        Ok(Self::from_parts(
            dictionary,
            Some(HmmModel::default()),
            SegmenterConfig::default(),
        ))
    }

    /// Segmenter with an empty dictionary and the built-in HMM model.
    pub fn empty() -> Self {
        Self::from_parts(
            Dictionary::new(),
            Some(HmmModel::default()),
            SegmenterConfig::default(),
        )
    }

    /// Segmenter whose dictionary holds exactly `defs`, added in order.
    pub fn with_word_defs(defs: &[WordDef]) -> Result<Self> {
        let segmenter = Self::empty();
        for def in defs {
            segmenter.add_word(&def.word, def.freq)?;
        }
        Ok(segmenter)
    }

    /// Start configuring a segmenter.
    pub fn builder() -> SegmenterBuilder {
        SegmenterBuilder::new()
    }

    fn from_parts(dictionary: Dictionary, hmm: Option<HmmModel>, config: SegmenterConfig) -> Self {
        Segmenter {
            dictionary: RwLock::new(Arc::new(dictionary)),
            hmm: hmm.map(Arc::new),
            config,
        }
    }

    /// Current dictionary snapshot.
    pub fn dictionary(&self) -> Arc<Dictionary> {
        Arc::clone(&self.dictionary.read())
    }

    /// Loaded HMM model, if any.
    pub fn hmm_model(&self) -> Option<&HmmModel> {
        self.hmm.as_deref()
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    fn engine<'d>(&'d self, dictionary: &'d Dictionary, hmm: bool) -> Engine<'d> {
        Engine {
            dictionary,
            hmm: if hmm && self.config.hmm_enabled {
                self.hmm.as_deref()
            } else {
                None
            },
            tie_break: self.config.tie_break,
            max_search_gram: self.config.max_search_gram,
        }
    }

    /// Accurate mode. Concatenating the result reproduces `sentence`.
    pub fn cut<'a>(&self, sentence: &'a str, hmm: bool) -> Vec<&'a str> {
        let dictionary = self.dictionary();
        self.engine(&dictionary, hmm).cut(sentence)
    }

    /// Full mode: every dictionary word, ordered by start then end.
    pub fn cut_all<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        let dictionary = self.dictionary();
        self.engine(&dictionary, false).cut_all(sentence)
    }

    /// Search mode: sub-words of each long token precede the token.
    pub fn cut_for_search<'a>(&self, sentence: &'a str, hmm: bool) -> Vec<&'a str> {
        let dictionary = self.dictionary();
        self.engine(&dictionary, hmm).cut_for_search(sentence)
    }

    /// Cut in the given mode. `hmm` is ignored in full mode.
    pub fn cut_with_mode<'a>(&self, sentence: &'a str, mode: TokenizeMode, hmm: bool) -> Vec<&'a str> {
        match mode {
            TokenizeMode::Accurate => self.cut(sentence, hmm),
            TokenizeMode::Full => self.cut_all(sentence),
            TokenizeMode::Search => self.cut_for_search(sentence, hmm),
        }
    }

    /// Cut and attach character offsets to every word.
    pub fn tokenize(&self, sentence: &str, mode: TokenizeMode, hmm: bool) -> Vec<Token> {
        let words = self.cut_with_mode(sentence, mode, hmm);

        let char_starts: Vec<usize> = sentence.char_indices().map(|(i, _)| i).collect();
        let char_offset = |byte: usize| char_starts.binary_search(&byte).unwrap_or_else(|idx| idx);

        let base = sentence.as_ptr() as usize;
        words
            .into_iter()
            .enumerate()
            .map(|(position, word)| {
                let start = word.as_ptr() as usize - base;
                let start_offset = char_offset(start);
                let end_offset = start_offset + word.chars().count();
                Token::with_offsets(word, position, start_offset, end_offset)
            })
            .collect()
    }

    /// Cut many sentences in parallel.
    pub fn cut_batch<'a, S>(&self, sentences: &'a [S], mode: TokenizeMode, hmm: bool) -> Vec<Vec<&'a str>>
    where
        S: AsRef<str> + Sync,
    {
        let dictionary = self.dictionary();
        let engine = self.engine(&dictionary, hmm);
        sentences
            .par_iter()
            .map(|sentence| {
                let sentence = sentence.as_ref();
                match mode {
                    TokenizeMode::Accurate => engine.cut(sentence),
                    TokenizeMode::Full => engine.cut_all(sentence),
                    TokenizeMode::Search => engine.cut_for_search(sentence),
                }
            })
            .collect()
    }

    /// Add or replace a word and return the frequency it got.
    ///
    /// Without `freq`, [`Segmenter::suggest_freq`] decides.
    pub fn add_word(&self, word: &str, freq: Option<u64>) -> Result<u64> {
        if word.trim().is_empty() {
            return Err(QieError::invalid_input("cannot add an empty word"));
        }

        let current = self.dictionary.upgradable_read();
        let freq = match freq {
            Some(freq) => freq,
            None => self.suggest_with(&current, word),
        };
        let mut next = Dictionary::clone(&current);
        next.insert(word, freq)?;

        let mut current = RwLockUpgradableReadGuard::upgrade(current);
        *current = Arc::new(next);
        debug!("Added word '{word}' with frequency {freq}");
        Ok(freq)
    }

    /// Merge `word [freq] [tag]` lines into the dictionary and return how many
    /// entries were applied. Lines without a frequency get a suggested one.
    ///
    /// Nothing is applied when any line is malformed.
    pub fn load_dict<R: BufRead>(&self, reader: R) -> Result<usize> {
        let defs = read_word_defs(reader, false)?;

        let current = self.dictionary.upgradable_read();
        let mut next = Dictionary::clone(&current);
        for def in &defs {
            let freq = match def.freq {
                Some(freq) => freq,
                None => self.suggest_with(&next, &def.word),
            };
            next.insert(&def.word, freq)?;
        }

        let mut current = RwLockUpgradableReadGuard::upgrade(current);
        *current = Arc::new(next);
        debug!("Merged {} user dictionary entries", defs.len());
        Ok(defs.len())
    }

    /// Merge a user dictionary file.
    pub fn load_dict_path<P: AsRef<std::path::Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            QieError::dictionary_load(
                None,
                format!("Failed to open user dictionary '{}': {e}", path.display()),
            )
        })?;
        let count = self.load_dict(std::io::BufReader::new(file))?;
        info!("Loaded {count} user words from {}", path.display());
        Ok(count)
    }

    /// Frequency that keeps `segment` together as one word in accurate mode.
    pub fn suggest_freq(&self, segment: &str) -> u64 {
        let dictionary = self.dictionary();
        self.suggest_with(&dictionary, segment)
    }

    fn suggest_with(&self, dictionary: &Dictionary, segment: &str) -> u64 {
        let total = dictionary.total_freq() as f64 + 1.0;
        let log_prob: f64 = self
            .engine(dictionary, false)
            .cut(segment)
            .into_iter()
            .map(|word| {
                let freq = dictionary.get(word).unwrap_or(0) as f64;
                (freq + 1.0).ln() - total.ln()
            })
            .sum();

        let suggested = ((total.ln() + log_prob).exp().floor() as u64).saturating_add(1);
        let current = dictionary.get(segment).unwrap_or(0);
        suggested.max(current).max(1)
    }
}

/// Reject text containing control characters other than whitespace.
///
/// Segmentation accepts any text; this is for callers that want to refuse
/// binary garbage up front.
pub fn validate_input(text: &str) -> Result<()> {
    match text
        .char_indices()
        .find(|(_, ch)| ch.is_control() && !ch.is_whitespace())
    {
        Some((pos, ch)) => Err(QieError::invalid_input(format!(
            "control character U+{:04X} at byte {pos}",
            ch as u32
        ))),
        None => Ok(()),
    }
}

/// Builder for [`Segmenter`].
#[derive(Debug, Default)]
pub struct SegmenterBuilder {
    dictionary: Option<Dictionary>,
    hmm_model: Option<HmmModel>,
    hmm_path: Option<PathBuf>,
    without_hmm: bool,
    config: SegmenterConfig,
}

impl SegmenterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dictionary` instead of the built-in one.
    pub fn dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Use `model` instead of the built-in HMM.
    pub fn hmm_model(mut self, model: HmmModel) -> Self {
        self.hmm_model = Some(model);
        self
    }

    /// Load the HMM from a JSON file at build time. A file that fails to load
    /// is logged and the segmenter runs without HMM recovery.
    pub fn hmm_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.hmm_path = Some(path.into());
        self
    }

    /// Build without any HMM model.
    pub fn without_hmm(mut self) -> Self {
        self.without_hmm = true;
        self
    }

    pub fn config(mut self, config: SegmenterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Segmenter> {
        self.config.validate()?;

        let dictionary = match self.dictionary {
            Some(dictionary) => dictionary,
            None => Dictionary::builtin()?,
        };

        let hmm = if self.without_hmm {
            None
        } else if let Some(path) = self.hmm_path {
            match HmmModel::from_path(&path) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!("{e}; continuing without HMM recovery");
                    None
                }
            }
        } else {
            Some(self.hmm_model.unwrap_or_default())
        };

        Ok(Segmenter::from_parts(dictionary, hmm, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryBuilder;
    use crate::route::TieBreak;

    fn segmenter() -> Segmenter {
        Segmenter::new().unwrap()
    }

    #[test]
    fn test_cut() {
        let segmenter = segmenter();
        assert_eq!(segmenter.cut("你好世界", true), vec!["你好", "世界"]);
        assert_eq!(
            segmenter.cut("南京市长江大桥", true),
            vec!["南京市", "长江大桥"]
        );
        assert!(segmenter.cut("", true).is_empty());
    }

    #[test]
    fn test_cut_recovers_unknown_word() {
        let segmenter = segmenter();
        assert_eq!(
            segmenter.cut("他来到了网易杭研大厦", true),
            vec!["他", "来到", "了", "网易", "杭研", "大厦"]
        );
        assert_eq!(
            segmenter.cut("他来到了网易杭研大厦", false),
            vec!["他", "来到", "了", "网易", "杭", "研", "大厦"]
        );
    }

    #[test]
    fn test_cut_all() {
        let segmenter = segmenter();
        assert_eq!(
            segmenter.cut_all("南京市长江大桥"),
            vec![
                "南", "南京", "南京市", "京", "京市", "市", "市长", "长", "长江", "长江大桥", "江",
                "大", "大桥", "桥"
            ]
        );
    }

    #[test]
    fn test_cut_for_search() {
        let segmenter = segmenter();
        assert_eq!(
            segmenter.cut_for_search("南京市长江大桥", true),
            vec!["南京", "京市", "南京市", "长江", "大桥", "长江大桥"]
        );
    }

    #[test]
    fn test_cut_with_mode() {
        let segmenter = segmenter();
        let text = "南京市长江大桥";
        assert_eq!(
            segmenter.cut_with_mode(text, TokenizeMode::Accurate, true),
            segmenter.cut(text, true)
        );
        assert_eq!(
            segmenter.cut_with_mode(text, TokenizeMode::Full, true),
            segmenter.cut_all(text)
        );
        assert_eq!(
            segmenter.cut_with_mode(text, TokenizeMode::Search, true),
            segmenter.cut_for_search(text, true)
        );
    }

    #[test]
    fn test_tokenize_offsets() {
        let segmenter = segmenter();
        let tokens = segmenter.tokenize("我爱 南京市长江大桥", TokenizeMode::Search, true);

        let chars: Vec<char> = "我爱 南京市长江大桥".chars().collect();
        for token in &tokens {
            let text: String = chars[token.start_offset..token.end_offset].iter().collect();
            assert_eq!(text, token.text);
        }

        let nanjing: Vec<_> = tokens.iter().filter(|t| t.text == "南京").collect();
        assert_eq!(nanjing.len(), 1);
        assert_eq!((nanjing[0].start_offset, nanjing[0].end_offset), (3, 5));
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, (0..tokens.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_add_word() {
        let segmenter = segmenter();
        assert_eq!(
            segmenter.cut("他来到了网易杭研大厦", false),
            vec!["他", "来到", "了", "网易", "杭", "研", "大厦"]
        );

        let before = segmenter.dictionary();
        let freq = segmenter.add_word("杭研", None).unwrap();
        assert!(freq >= 1);
        assert_eq!(
            segmenter.cut("他来到了网易杭研大厦", false),
            vec!["他", "来到", "了", "网易", "杭研", "大厦"]
        );

        // The earlier snapshot is untouched.
        assert_eq!(before.get("杭研"), None);
        assert_eq!(segmenter.dictionary().get("杭研"), Some(freq));
    }

    #[test]
    fn test_add_word_rejects_empty() {
        let segmenter = Segmenter::empty();
        assert!(matches!(
            segmenter.add_word("  ", Some(3)),
            Err(QieError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_add_word_overflow_leaves_dictionary_intact() {
        let mut builder = DictionaryBuilder::new();
        builder.add_word("甲", u64::MAX - 5).unwrap();
        let segmenter = Segmenter::builder()
            .dictionary(builder.build())
            .without_hmm()
            .build()
            .unwrap();

        assert!(matches!(
            segmenter.add_word("乙", Some(10)),
            Err(QieError::DictionaryLoad { .. })
        ));
        assert!(segmenter.load_dict("丙 3\n乙 10\n".as_bytes()).is_err());
        let dictionary = segmenter.dictionary();
        assert_eq!(dictionary.len(), 1);
        assert_eq!(dictionary.get("丙"), None);

        // A suggestion close to the total saturates instead of overflowing.
        assert!(segmenter.suggest_freq("甲") >= u64::MAX - 5);
    }

    #[test]
    fn test_suggest_freq_joins_split_word() {
        let segmenter = segmenter();
        assert_eq!(segmenter.cut("市长江", false), vec!["市", "长江"]);

        let freq = segmenter.suggest_freq("市长江");
        segmenter.add_word("市长江", Some(freq)).unwrap();
        assert_eq!(segmenter.cut("市长江", false), vec!["市长江"]);
    }

    #[test]
    fn test_suggest_freq_keeps_current() {
        let segmenter = segmenter();
        let current = segmenter.dictionary().get("长江").unwrap();
        assert!(segmenter.suggest_freq("长江") >= current);
    }

    #[test]
    fn test_load_dict() {
        let segmenter = segmenter();
        let count = segmenter
            .load_dict("杭研 50 nz\n\n网易杭研\n".as_bytes())
            .unwrap();
        assert_eq!(count, 2);
        let dictionary = segmenter.dictionary();
        assert_eq!(dictionary.get("杭研"), Some(50));
        assert!(dictionary.contains("网易杭研"));
    }

    #[test]
    fn test_load_dict_is_all_or_nothing() {
        let segmenter = segmenter();
        let before = segmenter.dictionary().len();
        assert!(segmenter.load_dict("杭研 50\n坏行 x\n".as_bytes()).is_err());
        assert_eq!(segmenter.dictionary().len(), before);
        assert_eq!(segmenter.dictionary().get("杭研"), None);
    }

    #[test]
    fn test_with_word_defs() {
        let segmenter = Segmenter::with_word_defs(&[
            WordDef::new("你好", 100),
            WordDef::new("世界", 80),
        ])
        .unwrap();
        assert_eq!(segmenter.dictionary().len(), 2);
        assert_eq!(segmenter.cut("你好世界", false), vec!["你好", "世界"]);
    }

    #[test]
    fn test_cut_batch() {
        let segmenter = segmenter();
        let sentences = vec!["你好世界", "南京市长江大桥", ""];
        let results = segmenter.cut_batch(&sentences, TokenizeMode::Accurate, true);
        assert_eq!(results.len(), 3);
        for (sentence, words) in sentences.iter().zip(&results) {
            assert_eq!(words, &segmenter.cut(sentence, true));
        }
    }

    #[test]
    fn test_config_disables_hmm() {
        let segmenter = Segmenter::builder()
            .config(SegmenterConfig::default().with_hmm_enabled(false))
            .build()
            .unwrap();
        assert_eq!(
            segmenter.cut("他来到了网易杭研大厦", true),
            vec!["他", "来到", "了", "网易", "杭", "研", "大厦"]
        );
    }

    #[test]
    fn test_builder_degrades_on_bad_hmm_path() {
        let segmenter = Segmenter::builder()
            .hmm_path("/nonexistent/hmm.json")
            .build()
            .unwrap();
        assert!(segmenter.hmm_model().is_none());
        // Unknown runs fall back to single characters.
        assert_eq!(segmenter.cut("杭研", true), vec!["杭", "研"]);
    }

    #[test]
    fn test_builder_custom_dictionary_and_tie_break() {
        let mut builder = DictionaryBuilder::new();
        for (word, freq) in [("a", 3), ("c", 3), ("ab", 5), ("bc", 5)] {
            builder.add_word(word, freq).unwrap();
        }
        let dictionary = builder.build();

        let longest = Segmenter::builder()
            .dictionary(dictionary.clone())
            .without_hmm()
            .build()
            .unwrap();
        assert_eq!(longest.cut("abc", false), vec!["ab", "c"]);

        let shortest = Segmenter::builder()
            .dictionary(dictionary)
            .config(SegmenterConfig::default().with_tie_break(TieBreak::Shortest))
            .build()
            .unwrap();
        assert_eq!(shortest.cut("abc", false), vec!["a", "bc"]);
    }

    #[test]
    fn test_validate_input() {
        assert!(validate_input("你好\n世界\t!").is_ok());
        assert!(matches!(
            validate_input("你好\u{0}世界"),
            Err(QieError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_segmenter_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Segmenter>();
    }
}
