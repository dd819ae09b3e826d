//! Maximum-likelihood path search over the word DAG.
//!
//! Scores are computed right to left with an explicit table:
//!
//! ```text
//! score[N] = 0
//! score[i] = max over edges (i, j) of ln(freq(i..=j) + 1) - ln(total + 1) + score[j + 1]
//! ```
//!
//! Every frequency is at most the total, so every increment is non-positive
//! and finite, and a fallback edge (frequency 0) still contributes `ln(1)`.

use serde::{Deserialize, Serialize};

use crate::dag::Dag;
use crate::dictionary::Dictionary;

/// Which edge wins when two edges out of the same index score equally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Prefer the longer word (fewer, longer tokens).
    #[default]
    Longest,
    /// Prefer the shorter word.
    Shortest,
}

/// One token of a path: characters `start..end` (end exclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Whether the token is a genuine dictionary word.
    pub in_dictionary: bool,
}

impl Span {
    /// Number of characters covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// A single character chosen only because nothing in the dictionary covered it.
    pub fn is_fallback(&self) -> bool {
        self.len() == 1 && !self.in_dictionary
    }
}

/// The optimal segmentation path of one sentence.
#[derive(Clone, Debug, Default)]
pub struct Route {
    spans: Vec<Span>,
    scores: Vec<f64>,
}

impl Route {
    /// Find the maximum log-probability path through `dag`.
    ///
    /// An empty DAG yields an empty route.
    pub fn find_best(dag: &Dag, dictionary: &Dictionary, tie_break: TieBreak) -> Self {
        let n = dag.len();
        let log_total = (dictionary.total_freq() as f64 + 1.0).ln();

        let mut scores = vec![0.0f64; n + 1];
        let mut choice: Vec<usize> = vec![0; n];

        for start in (0..n).rev() {
            let mut best: Option<(f64, usize)> = None;
            for (idx, edge) in dag.edges(start).iter().enumerate() {
                let score = (edge.freq as f64 + 1.0).ln() - log_total + scores[edge.end + 1];
                let better = match best {
                    None => true,
                    // Edges come in ascending end order.
                    Some((best_score, _)) => match tie_break {
                        TieBreak::Longest => score >= best_score,
                        TieBreak::Shortest => score > best_score,
                    },
                };
                if better {
                    best = Some((score, idx));
                }
            }
            // Every index has at least the fallback edge.
            let (score, idx) = best.unwrap_or((f64::NEG_INFINITY, 0));
            scores[start] = score;
            choice[start] = idx;
        }

        let mut spans = Vec::with_capacity(n / 2 + 1);
        let mut start = 0;
        while start < n {
            let edge = dag.edges(start)[choice[start]];
            spans.push(Span {
                start,
                end: edge.end + 1,
                in_dictionary: edge.in_dictionary,
            });
            start = edge.end + 1;
        }

        Route { spans, scores }
    }

    /// Tokens of the path, left to right, covering the whole sentence.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Score table, `scores[i]` being the best log-probability of the suffix
    /// starting at `i` (`scores[N] == 0`).
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Consume the route and return its spans.
    pub fn into_spans(self) -> Vec<Span> {
        self.spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryBuilder;

    fn dictionary() -> Dictionary {
        let mut builder = DictionaryBuilder::new();
        for (word, freq) in [
            ("网球", 100),
            ("网球拍", 50),
            ("球拍", 80),
            ("拍卖", 120),
            ("拍卖会", 60),
            ("网", 200),
            ("球", 200),
            ("拍", 300),
            ("卖", 150),
            ("会", 400),
        ] {
            builder.add_word(word, freq).unwrap();
        }
        builder.build()
    }

    fn words(sentence: &str, route: &Route) -> Vec<String> {
        let chars: Vec<char> = sentence.chars().collect();
        route
            .spans()
            .iter()
            .map(|span| chars[span.start..span.end].iter().collect())
            .collect()
    }

    #[test]
    fn test_find_best() {
        let dict = dictionary();
        let sentence = "网球拍卖会";
        let chars: Vec<char> = sentence.chars().collect();
        let dag = Dag::build(&chars, &dict);
        let route = Route::find_best(&dag, &dict, TieBreak::Longest);

        assert_eq!(words(sentence, &route), vec!["网球", "拍卖会"]);
    }

    #[test]
    fn test_route_covers_sentence() {
        let dict = dictionary();
        let sentence = "球拍网球会卖拍";
        let chars: Vec<char> = sentence.chars().collect();
        let dag = Dag::build(&chars, &dict);
        let route = Route::find_best(&dag, &dict, TieBreak::Longest);

        let mut expected_start = 0;
        for span in route.spans() {
            assert_eq!(span.start, expected_start);
            assert!(!span.is_empty());
            expected_start = span.end;
        }
        assert_eq!(expected_start, chars.len());
        assert_eq!(words(sentence, &route).concat(), sentence);
    }

    #[test]
    fn test_scores_finite_and_non_increasing() {
        let dict = dictionary();
        let chars: Vec<char> = "未知网球拍卖会".chars().collect();
        let dag = Dag::build(&chars, &dict);
        let route = Route::find_best(&dag, &dict, TieBreak::Longest);

        let scores = route.scores();
        assert_eq!(scores.len(), chars.len() + 1);
        assert_eq!(scores[chars.len()], 0.0);
        assert!(scores.iter().all(|s| s.is_finite()));
        for span in route.spans() {
            assert!(scores[span.start] <= scores[span.end]);
        }
    }

    #[test]
    fn test_empty_sentence() {
        let dict = dictionary();
        let dag = Dag::build(&[], &dict);
        let route = Route::find_best(&dag, &dict, TieBreak::Longest);
        assert!(route.spans().is_empty());
        assert_eq!(route.scores(), &[0.0]);
    }

    #[test]
    fn test_empty_dictionary_is_finite() {
        let dict = Dictionary::new();
        let chars: Vec<char> = "空词典".chars().collect();
        let dag = Dag::build(&chars, &dict);
        let route = Route::find_best(&dag, &dict, TieBreak::Longest);
        assert_eq!(route.spans().len(), 3);
        assert!(route.spans().iter().all(|span| span.is_fallback()));
        assert!(route.scores().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_tie_break() {
        // "ab|c" and "a|bc" sum the same two increments.
        let mut builder = DictionaryBuilder::new();
        builder.add_word("a", 3).unwrap();
        builder.add_word("c", 3).unwrap();
        builder.add_word("ab", 5).unwrap();
        builder.add_word("bc", 5).unwrap();
        let dict = builder.build();
        let chars: Vec<char> = "abc".chars().collect();
        let dag = Dag::build(&chars, &dict);

        let longest = Route::find_best(&dag, &dict, TieBreak::Longest);
        assert_eq!(words("abc", &longest), vec!["ab", "c"]);

        let shortest = Route::find_best(&dag, &dict, TieBreak::Shortest);
        assert_eq!(words("abc", &shortest), vec!["a", "bc"]);
    }
}
