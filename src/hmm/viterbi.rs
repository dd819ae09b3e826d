//! Viterbi decoding over the B/M/E/S states.

use crate::hmm::{HmmModel, State};

/// Most likely state sequence for `chars`.
///
/// Uses an explicit `N × 4` score table and back-pointers. The last state is
/// restricted to `E` or `S`. Ties go to the earlier state in `B, M, E, S`
/// order.
pub fn best_states(model: &HmmModel, chars: &[char]) -> Vec<State> {
    let n = chars.len();
    if n == 0 {
        return Vec::new();
    }

    let mut scores: Vec<[f64; 4]> = vec![[0.0; 4]; n];
    let mut back: Vec<[usize; 4]> = vec![[0; 4]; n];

    for state in State::ALL {
        scores[0][state.index()] = model.start(state) + model.emission(state, chars[0]);
    }

    for t in 1..n {
        for state in State::ALL {
            let emit = model.emission(state, chars[t]);
            let mut best_score = f64::NEG_INFINITY;
            let mut best_prev = 0;
            for prev in State::ALL {
                let score = scores[t - 1][prev.index()] + model.transition(prev, state);
                if score > best_score {
                    best_score = score;
                    best_prev = prev.index();
                }
            }
            scores[t][state.index()] = best_score + emit;
            back[t][state.index()] = best_prev;
        }
    }

    let last = &scores[n - 1];
    let mut state = if last[State::Single.index()] > last[State::End.index()] {
        State::Single.index()
    } else {
        State::End.index()
    };

    let mut path = vec![State::Single; n];
    for t in (0..n).rev() {
        path[t] = State::ALL[state];
        state = back[t][state];
    }
    path
}

/// Turn a state sequence into `(start, end)` spans, end exclusive.
///
/// `B` opens a word, `E` closes it, `S` is a word of its own. Malformed
/// sequences are closed leniently: a stray `M` opens a word, a `B` or `S`
/// inside an open word flushes it first, and an open word at the end is
/// flushed as is.
pub fn states_to_spans(states: &[State]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;

    for (i, state) in states.iter().enumerate() {
        match state {
            State::Begin => {
                if let Some(start) = open.take() {
                    spans.push((start, i));
                }
                open = Some(i);
            }
            State::Middle => {
                if open.is_none() {
                    open = Some(i);
                }
            }
            State::End => {
                let start = open.take().unwrap_or(i);
                spans.push((start, i + 1));
            }
            State::Single => {
                if let Some(start) = open.take() {
                    spans.push((start, i));
                }
                spans.push((i, i + 1));
            }
        }
    }

    if let Some(start) = open {
        spans.push((start, states.len()));
    }
    spans
}
