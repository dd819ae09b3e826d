//! Command implementations for the qie CLI.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;

use crate::analysis::token::Token;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::dictionary::Dictionary;
use crate::error::{QieError, Result};
use crate::segmenter::{Segmenter, TokenizeMode, validate_input};

/// Execute a CLI command.
pub fn execute_command(args: QieArgs) -> Result<()> {
    match &args.command {
        Command::Cut(cut_args) => cut_text(cut_args, &args),
        Command::Suggest(suggest_args) => suggest_freq(suggest_args, &args),
        Command::Compile(compile_args) => compile_dictionary(compile_args, &args),
    }
}

/// Load the main dictionary named by the arguments.
fn load_dictionary(args: &DictionaryArgs) -> Result<Dictionary> {
    match (&args.cache, &args.dict) {
        (Some(cache), _) => Dictionary::load_cache(cache),
        (None, Some(dict)) => Dictionary::from_path(dict),
        (None, None) => Dictionary::builtin(),
    }
}

/// Build a segmenter from the dictionary arguments and an optional HMM file.
fn build_segmenter(args: &DictionaryArgs, hmm: Option<&Path>) -> Result<Segmenter> {
    let mut builder = Segmenter::builder().dictionary(load_dictionary(args)?);
    if let Some(hmm) = hmm {
        builder = builder.hmm_path(hmm);
    }
    let segmenter = builder.build()?;

    if let Some(user_dict) = &args.user_dict {
        segmenter.load_dict_path(user_dict)?;
    }
    Ok(segmenter)
}

/// Read the lines to segment.
fn read_input(args: &CutArgs) -> Result<Vec<String>> {
    let lines = if let Some(text) = &args.text {
        vec![text.clone()]
    } else if let Some(file) = &args.file {
        let content = fs::read_to_string(file)?;
        content.lines().map(str::to_string).collect()
    } else {
        let stdin = io::stdin();
        stdin.lock().lines().collect::<io::Result<Vec<_>>>()?
    };
    for line in &lines {
        validate_input(line)?;
    }
    Ok(lines)
}

/// Segment text.
fn cut_text(args: &CutArgs, cli_args: &QieArgs) -> Result<()> {
    let segmenter = build_segmenter(&args.dictionary, args.hmm.as_deref())?;
    let lines = read_input(args)?;
    let mode = TokenizeMode::from(args.mode);
    let hmm = args.hmm_enabled();

    debug!("Segmenting {} lines in {:?} mode (hmm: {hmm})", lines.len(), mode);

    let start_time = Instant::now();
    let segment = || -> Vec<CutLine> {
        if args.offsets {
            lines
                .par_iter()
                .map(|line| {
                    let tokens: Vec<Token> = segmenter.tokenize(line, mode, hmm);
                    CutLine {
                        words: tokens.iter().map(|t| t.text.clone()).collect(),
                        tokens: Some(tokens),
                    }
                })
                .collect()
        } else {
            segmenter
                .cut_batch(&lines, mode, hmm)
                .into_iter()
                .map(|words| CutLine {
                    words: words.into_iter().map(str::to_string).collect(),
                    tokens: None,
                })
                .collect()
        }
    };

    let cut_lines = match args.threads {
        Some(0) => return Err(QieError::invalid_argument("threads must be positive")),
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| QieError::other(format!("Failed to create thread pool: {e}")))?;
            pool.install(segment)
        }
        None => segment(),
    };
    let duration = start_time.elapsed();

    info!(
        "Segmented {} lines in {:.2} ms",
        cut_lines.len(),
        duration.as_secs_f64() * 1000.0
    );

    output_result(
        &format!("Segmented {} lines", cut_lines.len()),
        &CutResult {
            mode: format!("{mode:?}").to_lowercase(),
            lines: cut_lines,
            duration_ms: duration.as_millis() as u64,
            separator: args.separator.clone(),
        },
        cli_args,
    )
}

/// Suggest a frequency for a segment.
fn suggest_freq(args: &SuggestArgs, cli_args: &QieArgs) -> Result<()> {
    let segmenter = build_segmenter(&args.dictionary, None)?;
    let current_freq = segmenter.dictionary().get(&args.segment);
    let suggested_freq = segmenter.suggest_freq(&args.segment);

    output_result(
        "Suggested frequency",
        &SuggestResult {
            segment: args.segment.clone(),
            current_freq,
            suggested_freq,
        },
        cli_args,
    )
}

/// Compile a text dictionary into a cache file.
fn compile_dictionary(args: &CompileArgs, cli_args: &QieArgs) -> Result<()> {
    let start_time = Instant::now();
    let dictionary = Dictionary::from_path(&args.dict)?;

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    dictionary.save_cache(&args.output)?;

    output_result(
        "Dictionary compiled successfully",
        &CompileResult {
            output: args.output.display().to_string(),
            words: dictionary.len(),
            total_freq: dictionary.total_freq(),
            max_word_len: dictionary.max_word_len(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )
}
