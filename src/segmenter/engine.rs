//! The three segmentation modes over one dictionary snapshot.

use crate::dag::Dag;
use crate::dictionary::Dictionary;
use crate::hmm::HmmModel;
use crate::route::{Route, TieBreak};
use crate::segmenter::block::{self, Block, Piece, RE_ALNUM, RE_HAN};

/// Everything a cut reads, borrowed for the duration of one call.
#[derive(Clone, Copy)]
pub(crate) struct Engine<'d> {
    pub dictionary: &'d Dictionary,
    pub hmm: Option<&'d HmmModel>,
    pub tie_break: TieBreak,
    pub max_search_gram: Option<usize>,
}

/// Byte offset of every character of `text`, plus `text.len()`.
fn char_bounds(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

impl<'d> Engine<'d> {
    /// Accurate mode.
    pub fn cut<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        let mut words = Vec::new();
        for block in block::split_default(sentence) {
            match block {
                Block::Segment(text) => self.cut_block(text, &mut words),
                Block::Literal(text) => words.push(text),
            }
        }
        words
    }

    /// Full mode.
    pub fn cut_all<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        let mut words = Vec::new();
        for block in block::split_full(sentence) {
            match block {
                Block::Segment(text) => self.cut_all_block(text, &mut words),
                Block::Literal(text) => words.push(text),
            }
        }
        words
    }

    /// Search mode: accurate cut, with the dictionary sub-words of every
    /// long token emitted before it.
    pub fn cut_for_search<'a>(&self, sentence: &'a str) -> Vec<&'a str> {
        let mut words = Vec::new();
        for word in self.cut(sentence) {
            let bounds = char_bounds(word);
            let len = bounds.len() - 1;
            if len > 2 {
                let max_gram = self
                    .max_search_gram
                    .map_or(len - 1, |limit| limit.min(len - 1));
                let mut seen: Vec<&'a str> = Vec::new();
                for gram in 2..=max_gram {
                    for start in 0..=len - gram {
                        let sub = &word[bounds[start]..bounds[start + gram]];
                        if self.dictionary.contains(sub) && !seen.contains(&sub) {
                            seen.push(sub);
                            words.push(sub);
                        }
                    }
                }
            }
            words.push(word);
        }
        words
    }

    fn cut_block<'a>(&self, block: &'a str, words: &mut Vec<&'a str>) {
        let chars: Vec<char> = block.chars().collect();
        let bounds = char_bounds(block);
        let dag = Dag::build(&chars, self.dictionary);
        let route = Route::find_best(&dag, self.dictionary, self.tie_break);

        let mut run_start: Option<usize> = None;
        for span in route.spans() {
            if span.is_fallback() {
                run_start.get_or_insert(span.start);
                continue;
            }
            if let Some(start) = run_start.take() {
                self.cut_run(&block[bounds[start]..bounds[span.start]], words);
            }
            words.push(&block[bounds[span.start]..bounds[span.end]]);
        }
        if let Some(start) = run_start {
            self.cut_run(&block[bounds[start]..], words);
        }
    }

    /// Handle a run of characters the dictionary did not cover.
    fn cut_run<'a>(&self, run: &'a str, words: &mut Vec<&'a str>) {
        if run.chars().nth(1).is_none() {
            words.push(run);
            return;
        }
        match self.hmm {
            Some(model) => cut_run_hmm(model, run, words),
            None => cut_run_plain(run, words),
        }
    }

    /// Every dictionary edge of the block. A maximal run of non-CJK
    /// characters is also emitted whole at its start, unless a dictionary
    /// word already spans exactly that run.
    fn cut_all_block<'a>(&self, block: &'a str, words: &mut Vec<&'a str>) {
        let chars: Vec<char> = block.chars().collect();
        let bounds = char_bounds(block);
        let dag = Dag::build(&chars, self.dictionary);
        let run_ends = non_han_run_ends(&chars);
        for (start, edges) in dag.iter() {
            let mut ends: Vec<usize> = edges
                .iter()
                .filter(|edge| edge.in_dictionary)
                .map(|edge| edge.end)
                .collect();
            if let Some(run_end) = run_ends[start] {
                if !ends.contains(&run_end) {
                    ends.push(run_end);
                    ends.sort_unstable();
                }
            }
            for end in ends {
                words.push(&block[bounds[start]..bounds[end + 1]]);
            }
        }
    }
}

/// For each position that starts a maximal run of non-CJK characters, the
/// inclusive end of that run.
fn non_han_run_ends(chars: &[char]) -> Vec<Option<usize>> {
    let is_han = |ch: char| ('\u{4E00}'..='\u{9FD5}').contains(&ch);
    let mut ends = vec![None; chars.len()];
    let mut start = 0;
    while start < chars.len() {
        if is_han(chars[start]) {
            start += 1;
            continue;
        }
        let mut end = start;
        while end + 1 < chars.len() && !is_han(chars[end + 1]) {
            end += 1;
        }
        ends[start] = Some(end);
        start = end + 1;
    }
    ends
}

/// Decode CJK parts of a run with the HMM; keep ASCII words and numbers
/// whole; emit anything else per character.
fn cut_run_hmm<'a>(model: &HmmModel, run: &'a str, words: &mut Vec<&'a str>) {
    for piece in block::split_matches(&RE_HAN, run) {
        match piece {
            Piece::Matched(han) => {
                let chars: Vec<char> = han.chars().collect();
                let bounds = char_bounds(han);
                for (start, end) in model.decode(&chars) {
                    words.push(&han[bounds[start]..bounds[end]]);
                }
            }
            Piece::Gap(other) => {
                for sub in block::split_matches(&RE_ALNUM, other) {
                    match sub {
                        Piece::Matched(word) => words.push(word),
                        Piece::Gap(rest) => block::push_chars(rest, words),
                    }
                }
            }
        }
    }
}

/// Without an HMM, consecutive ASCII alphanumerics are merged and every
/// other character stays single.
fn cut_run_plain<'a>(run: &'a str, words: &mut Vec<&'a str>) {
    let mut alnum_start: Option<usize> = None;
    for (i, ch) in run.char_indices() {
        if ch.is_ascii_alphanumeric() {
            alnum_start.get_or_insert(i);
            continue;
        }
        if let Some(start) = alnum_start.take() {
            words.push(&run[start..i]);
        }
        words.push(&run[i..i + ch.len_utf8()]);
    }
    if let Some(start) = alnum_start {
        words.push(&run[start..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryBuilder;

    fn dictionary() -> Dictionary {
        let mut builder = DictionaryBuilder::new();
        for (word, freq) in [
            ("我", 1000),
            ("来到", 300),
            ("北京", 800),
            ("清华", 200),
            ("清华大学", 150),
            ("华大", 20),
            ("大学", 600),
        ] {
            builder.add_word(word, freq).unwrap();
        }
        builder.build()
    }

    fn engine<'a>(dictionary: &'a Dictionary, hmm: Option<&'static HmmModel>) -> Engine<'a> {
        Engine {
            dictionary,
            hmm,
            tie_break: TieBreak::Longest,
            max_search_gram: None,
        }
    }

    #[test]
    fn test_cut() {
        let dict = dictionary();
        let words = engine(&dict, None).cut("我来到北京清华大学");
        assert_eq!(words, vec!["我", "来到", "北京", "清华大学"]);
    }

    #[test]
    fn test_cut_run_plain_merges_ascii() {
        let mut words = Vec::new();
        cut_run_plain("ab12龘c", &mut words);
        assert_eq!(words, vec!["ab12", "龘", "c"]);
    }

    #[test]
    fn test_cut_run_hmm_keeps_numbers() {
        let model = HmmModel::default();
        let mut words = Vec::new();
        cut_run_hmm(&model, "v1.5%龘靐,x", &mut words);
        assert_eq!(words, vec!["v1.5%", "龘靐", ",", "x"]);
    }

    #[test]
    fn test_cut_all_skips_fallback_edges() {
        let dict = dictionary();
        let words = engine(&dict, None).cut_all("清华大学很好");
        assert_eq!(words, vec!["清华", "清华大学", "华大", "大学"]);
    }

    #[test]
    fn test_cut_all_finds_mixed_script_words() {
        let mut builder = DictionaryBuilder::new();
        for (word, freq) in [("T恤", 100), ("买", 50), ("A-B", 10)] {
            builder.add_word(word, freq).unwrap();
        }
        let dict = builder.build();
        let full = engine(&dict, None);
        assert_eq!(full.cut_all("买T恤"), vec!["买", "T", "T恤"]);
        assert_eq!(full.cut_all("买A-B"), vec!["买", "A-B"]);
        assert_eq!(full.cut_all("南京abc"), vec!["abc"]);
    }

    #[test]
    fn test_cut_for_search() {
        let dict = dictionary();
        let words = engine(&dict, None).cut_for_search("清华大学");
        assert_eq!(words, vec!["清华", "华大", "大学", "清华大学"]);
    }

    #[test]
    fn test_cut_for_search_gram_limit() {
        let mut builder = DictionaryBuilder::new();
        for (word, freq) in [("中华人民", 100), ("中华", 5), ("中华人", 3), ("人民", 4)] {
            builder.add_word(word, freq).unwrap();
        }
        let dict = builder.build();
        let mut search = engine(&dict, None);

        assert_eq!(
            search.cut_for_search("中华人民"),
            vec!["中华", "人民", "中华人", "中华人民"]
        );

        search.max_search_gram = Some(2);
        assert_eq!(
            search.cut_for_search("中华人民"),
            vec!["中华", "人民", "中华人民"]
        );
    }
}
