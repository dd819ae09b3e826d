//! Directed acyclic graph of candidate word boundaries.
//!
//! For a sentence of `N` characters the DAG maps every start index `i` to the
//! end indices `j` (inclusive) such that `sentence[i..=j]` is a dictionary
//! word. The single-character edge `(i, i)` is always present, so every index
//! has an outgoing edge and the graph is traversable from `0` to `N - 1`.

use crate::dictionary::Dictionary;

/// An outgoing edge of the DAG.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Inclusive end character index.
    pub end: usize,
    /// Dictionary frequency of the word (0 for a fallback edge).
    pub freq: u64,
    /// Whether the word is a genuine dictionary entry rather than the
    /// single-character fallback.
    pub in_dictionary: bool,
}

/// Word-boundary DAG of one sentence.
#[derive(Clone, Debug, Default)]
pub struct Dag {
    edges: Vec<Vec<Edge>>,
}

impl Dag {
    /// Build the DAG of `chars` against `dictionary`.
    ///
    /// Scans at most `max_word_len` characters forward from each index and
    /// stops early once the fragment is no longer a dictionary prefix.
    /// O(N × max_word_len).
    pub fn build(chars: &[char], dictionary: &Dictionary) -> Self {
        let n = chars.len();
        let max_len = dictionary.max_word_len().max(1);
        let mut edges = Vec::with_capacity(n);

        for start in 0..n {
            let limit = (start + max_len).min(n);
            let mut out: Vec<Edge> = dictionary
                .prefixes_of(&chars[start..limit])
                .into_iter()
                .filter(|&(_, freq)| freq > 0)
                .map(|(len, freq)| Edge {
                    end: start + len - 1,
                    freq,
                    in_dictionary: true,
                })
                .collect();

            if out.first().map(|edge| edge.end) != Some(start) {
                out.insert(
                    0,
                    Edge {
                        end: start,
                        freq: 0,
                        in_dictionary: false,
                    },
                );
            }
            edges.push(out);
        }

        Dag { edges }
    }

    /// Number of start indices (the sentence length).
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the DAG is empty.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Outgoing edges of `start`, in ascending end order.
    pub fn edges(&self, start: usize) -> &[Edge] {
        &self.edges[start]
    }

    /// Inclusive end indices reachable from `start`, in ascending order.
    pub fn ends(&self, start: usize) -> Vec<usize> {
        self.edges[start].iter().map(|edge| edge.end).collect()
    }

    /// Iterate `(start, edges)` in ascending start order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Edge])> {
        self.edges
            .iter()
            .enumerate()
            .map(|(start, edges)| (start, edges.as_slice()))
    }
}
