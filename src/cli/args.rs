//! Command line argument parsing for the qie CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::segmenter::TokenizeMode;

/// qie - Chinese word segmentation
#[derive(Parser, Debug, Clone)]
#[command(name = "qie")]
#[command(about = "Dictionary and HMM based Chinese word segmentation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct QieArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl QieArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Segment text
    Cut(CutArgs),

    /// Suggest the frequency that keeps a segment together
    Suggest(SuggestArgs),

    /// Compile a text dictionary into a cache file
    Compile(CompileArgs),
}

/// Where the dictionary comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct DictionaryArgs {
    /// Main dictionary file (`word freq [tag]` lines); the built-in one by default
    #[arg(long, value_name = "DICT_FILE")]
    pub dict: Option<PathBuf>,

    /// Compiled dictionary cache, used instead of --dict
    #[arg(long, value_name = "CACHE_FILE", conflicts_with = "dict")]
    pub cache: Option<PathBuf>,

    /// User dictionary merged on top of the main one
    #[arg(long, value_name = "USER_DICT_FILE")]
    pub user_dict: Option<PathBuf>,
}

/// Arguments for segmenting text
#[derive(Parser, Debug, Clone)]
pub struct CutArgs {
    /// Text to segment; reads --file or standard input when omitted
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Segment every line of this file
    #[arg(short = 'i', long, value_name = "FILE", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Segmentation mode
    #[arg(short, long, default_value = "accurate")]
    pub mode: CutMode,

    /// Disable HMM recovery of unknown words
    #[arg(long)]
    pub no_hmm: bool,

    #[command(flatten)]
    pub dictionary: DictionaryArgs,

    /// HMM parameter file (JSON); the built-in model by default
    #[arg(long, value_name = "HMM_FILE")]
    pub hmm: Option<PathBuf>,

    /// Print character offsets with every word
    #[arg(long)]
    pub offsets: bool,

    /// Separator between words in human output
    #[arg(short, long, default_value = " / ")]
    pub separator: String,

    /// Number of worker threads (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

impl CutArgs {
    /// Whether HMM recovery should run.
    pub fn hmm_enabled(&self) -> bool {
        !self.no_hmm
    }
}

/// Arguments for frequency suggestion
#[derive(Parser, Debug, Clone)]
pub struct SuggestArgs {
    /// Segment that should be kept as one word
    #[arg(value_name = "SEGMENT")]
    pub segment: String,

    #[command(flatten)]
    pub dictionary: DictionaryArgs,
}

/// Arguments for compiling a dictionary cache
#[derive(Parser, Debug, Clone)]
pub struct CompileArgs {
    /// Text dictionary to compile
    #[arg(value_name = "DICT_FILE")]
    pub dict: PathBuf,

    /// Cache file to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

/// Segmentation modes
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    /// Most probable segmentation
    Accurate,
    /// Every dictionary word
    Full,
    /// Accurate plus sub-words of long words
    Search,
}

impl From<CutMode> for TokenizeMode {
    fn from(mode: CutMode) -> Self {
        match mode {
            CutMode::Accurate => TokenizeMode::Accurate,
            CutMode::Full => TokenizeMode::Full,
            CutMode::Search => TokenizeMode::Search,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
