//! Hidden Markov model for recovering out-of-vocabulary words.
//!
//! Each character of an unknown run is labelled with one of four states:
//! `B` (begins a word), `M` (inside a word), `E` (ends a word) or `S` (a
//! single-character word). Start, transition and emission tables are stored as
//! log probabilities; [`HmmModel::decode`] finds the most likely labelling with
//! Viterbi and turns it into word spans.
//!
//! Parameters are read from a JSON document:
//!
//! ```json
//! {
//!   "start": { "B": -0.26, "S": -1.47 },
//!   "transitions": { "B": { "E": -0.51, "M": -0.92 } },
//!   "emissions": { "B": { "杭": -8.0 } },
//!   "unseen_emission": -3.14e100
//! }
//! ```
//!
//! Missing start and transition entries are impossible events.

pub mod viterbi;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{QieError, Result};

/// Log probability used for impossible events.
pub const MIN_LOG_PROB: f64 = -3.14e100;

/// Hidden state of a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Begin,
    Middle,
    End,
    Single,
}

impl State {
    /// All states in table order.
    pub const ALL: [State; 4] = [State::Begin, State::Middle, State::End, State::Single];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-letter label used in parameter files.
    pub fn letter(self) -> char {
        match self {
            State::Begin => 'B',
            State::Middle => 'M',
            State::End => 'E',
            State::Single => 'S',
        }
    }

    /// Parse a state label.
    pub fn from_letter(label: &str) -> Result<Self> {
        match label {
            "B" => Ok(State::Begin),
            "M" => Ok(State::Middle),
            "E" => Ok(State::End),
            "S" => Ok(State::Single),
            other => Err(QieError::hmm(format!("Unknown state '{other}'"))),
        }
    }
}

/// Four-state HMM parameters.
///
/// [`HmmModel::default`] is a small demonstration model; trained parameters
/// load through [`HmmModel::from_path`].
#[derive(Clone, Debug)]
pub struct HmmModel {
    start: [f64; 4],
    trans: [[f64; 4]; 4],
    emit: [AHashMap<char, f64>; 4],
    unseen_emission: f64,
}

/// On-disk layout of the parameters.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HmmParameters {
    #[serde(default)]
    start: BTreeMap<String, f64>,
    #[serde(default)]
    transitions: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    emissions: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    unseen_emission: Option<f64>,
}

const DEFAULT_START: [f64; 4] = [-0.26268660809250016, MIN_LOG_PROB, MIN_LOG_PROB, -1.4652633398537678];

const DEFAULT_TRANS: [[f64; 4]; 4] = [
    // B -> B, M, E, S
    [MIN_LOG_PROB, -0.916290731874155, -0.510825623765990, MIN_LOG_PROB],
    // M -> B, M, E, S
    [MIN_LOG_PROB, -1.2603623820268226, -0.33344856811948514, MIN_LOG_PROB],
    // E -> B, M, E, S
    [-0.5897149736854513, MIN_LOG_PROB, MIN_LOG_PROB, -0.8085250474669937],
    // S -> B, M, E, S
    [-0.7211965654669841, MIN_LOG_PROB, MIN_LOG_PROB, -0.6658631448798212],
];

/// Emissions of the built-in model as `(char, [B, M, E, S])`.
const DEFAULT_EMIT: &[(char, [f64; 4])] = &[
    ('杭', [-8.0, MIN_LOG_PROB, MIN_LOG_PROB, -11.0]),
    ('研', [-9.5, -9.0, -7.5, -10.5]),
    ('中', [-5.2, -7.9, -8.4, -6.3]),
    ('国', [-7.6, -7.4, -4.9, -7.1]),
    ('人', [-6.0, -6.6, -5.1, -5.4]),
    ('大', [-5.4, -7.8, -8.2, -6.2]),
    ('学', [-6.9, -7.0, -5.6, -7.6]),
    ('生', [-6.5, -6.8, -5.7, -7.3]),
    ('公', [-5.6, -8.6, -9.9, -9.5]),
    ('司', [-10.2, -8.4, -5.9, -10.9]),
    ('市', [-8.3, -7.9, -6.0, -8.1]),
    ('长', [-6.1, -8.0, -8.2, -6.9]),
    ('小', [-5.7, -8.2, -8.9, -6.8]),
    ('明', [-6.8, -7.3, -6.5, -8.6]),
    ('新', [-6.0, -7.7, -8.3, -7.0]),
    ('发', [-6.2, -7.9, -7.6, -7.7]),
    ('展', [-9.6, -8.8, -6.3, -10.4]),
    ('的', [-10.9, -10.2, -8.7, -3.2]),
    ('了', [-10.5, -10.0, -7.9, -4.3]),
    ('是', [-9.4, -9.1, -8.8, -4.9]),
    ('在', [-8.0, -9.2, -9.5, -5.1]),
    ('和', [-8.3, -9.3, -8.6, -5.3]),
    ('有', [-7.1, -8.4, -8.0, -5.5]),
    ('我', [-8.7, -9.6, -9.9, -5.3]),
    ('他', [-8.1, -9.8, -10.0, -5.6]),
    ('这', [-6.9, -9.4, -10.1, -6.0]),
    ('不', [-6.3, -7.8, -8.5, -5.8]),
    ('上', [-7.3, -8.1, -6.9, -6.4]),
    ('一', [-5.5, -6.9, -8.4, -5.9]),
    ('子', [-10.6, -8.6, -5.8, -9.3]),
];

/// A demonstration model.
///
/// Start and transition tables are the usual B/M/E/S values, but emissions
/// cover only a few dozen common characters. Every other character is
/// labelled by transitions alone, which tends to pair unknown characters
/// into two-character words. Load a trained model with
/// [`HmmModel::from_path`] for real use.
impl Default for HmmModel {
    fn default() -> Self {
        let mut emit: [AHashMap<char, f64>; 4] = Default::default();
        for (ch, probs) in DEFAULT_EMIT {
            for state in State::ALL {
                let prob = probs[state.index()];
                if prob > MIN_LOG_PROB {
                    emit[state.index()].insert(*ch, prob);
                }
            }
        }

        HmmModel {
            start: DEFAULT_START,
            trans: DEFAULT_TRANS,
            emit,
            unseen_emission: MIN_LOG_PROB,
        }
    }
}

impl HmmModel {
    /// Build a model from explicit tables.
    pub fn new(
        start: [f64; 4],
        trans: [[f64; 4]; 4],
        emit: [AHashMap<char, f64>; 4],
        unseen_emission: f64,
    ) -> Result<Self> {
        let model = HmmModel {
            start,
            trans,
            emit,
            unseen_emission,
        };
        model.validate()?;
        Ok(model)
    }

    /// Read parameters from a JSON document.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let params: HmmParameters = serde_json::from_reader(reader)
            .map_err(|e| QieError::hmm(format!("Failed to parse HMM parameters: {e}")))?;
        Self::from_parameters(params)
    }

    /// Read parameters from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_reader(json.as_bytes())
    }

    /// Read parameters from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            QieError::hmm(format!("Failed to open HMM parameters '{}': {e}", path.display()))
        })?;
        let model = Self::from_json_reader(BufReader::new(file))?;
        log::info!(
            "Loaded HMM parameters ({} emission entries) from {}",
            model.emit.iter().map(|m| m.len()).sum::<usize>(),
            path.display()
        );
        Ok(model)
    }

    fn from_parameters(params: HmmParameters) -> Result<Self> {
        let mut start = [MIN_LOG_PROB; 4];
        for (label, prob) in &params.start {
            start[State::from_letter(label)?.index()] = *prob;
        }

        let mut trans = [[MIN_LOG_PROB; 4]; 4];
        for (from, row) in &params.transitions {
            let from = State::from_letter(from)?;
            for (to, prob) in row {
                trans[from.index()][State::from_letter(to)?.index()] = *prob;
            }
        }

        let mut emit: [AHashMap<char, f64>; 4] = Default::default();
        for (label, table) in &params.emissions {
            let state = State::from_letter(label)?;
            for (key, prob) in table {
                let mut chars = key.chars();
                let ch = match (chars.next(), chars.next()) {
                    (Some(ch), None) => ch,
                    _ => {
                        return Err(QieError::hmm(format!(
                            "Emission key '{key}' of state {label} must be a single character"
                        )));
                    }
                };
                emit[state.index()].insert(ch, *prob);
            }
        }

        Self::new(
            start,
            trans,
            emit,
            params.unseen_emission.unwrap_or(MIN_LOG_PROB),
        )
    }

    fn validate(&self) -> Result<()> {
        let check = |what: &str, prob: f64| {
            if prob.is_nan() || prob > 0.0 {
                Err(QieError::hmm(format!(
                    "{what} must be a log probability, got {prob}"
                )))
            } else {
                Ok(())
            }
        };

        for state in State::ALL {
            check(&format!("start[{}]", state.letter()), self.start[state.index()])?;
            for to in State::ALL {
                check(
                    &format!("transition {}->{}", state.letter(), to.letter()),
                    self.trans[state.index()][to.index()],
                )?;
            }
            for (ch, prob) in &self.emit[state.index()] {
                check(&format!("emission {}({ch})", state.letter()), *prob)?;
            }
        }
        check("unseen_emission", self.unseen_emission)
    }

    /// Log probability of starting in `state`.
    pub fn start(&self, state: State) -> f64 {
        self.start[state.index()]
    }

    /// Log probability of moving from `from` to `to`.
    pub fn transition(&self, from: State, to: State) -> f64 {
        self.trans[from.index()][to.index()]
    }

    /// Log probability of `state` emitting `ch`.
    ///
    /// A character absent from every state's table is neutral (0.0), so only
    /// the transitions decide its label.
    pub fn emission(&self, state: State, ch: char) -> f64 {
        if let Some(prob) = self.emit[state.index()].get(&ch) {
            return *prob;
        }
        if self.emit.iter().any(|table| table.contains_key(&ch)) {
            self.unseen_emission
        } else {
            0.0
        }
    }

    /// Segment `chars` into words, returning `(start, end)` spans (end
    /// exclusive) relative to `chars`.
    pub fn decode(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let states = viterbi::best_states(self, chars);
        viterbi::states_to_spans(&states)
    }
}
