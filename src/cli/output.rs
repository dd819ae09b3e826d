//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::cli::args::{OutputFormat, QieArgs};
use crate::error::Result;

/// Human-readable rendering of a command result.
pub trait HumanReadable {
    fn to_human(&self) -> String;
}

/// Result of segmenting one or more lines.
#[derive(Debug, Serialize, Deserialize)]
pub struct CutResult {
    pub mode: String,
    pub lines: Vec<CutLine>,
    pub duration_ms: u64,
    #[serde(skip)]
    pub separator: String,
}

/// Words of one input line.
#[derive(Debug, Serialize, Deserialize)]
pub struct CutLine {
    pub words: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tokens: Option<Vec<Token>>,
}

/// Result of a frequency suggestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestResult {
    pub segment: String,
    pub current_freq: Option<u64>,
    pub suggested_freq: u64,
}

/// Result of compiling a dictionary cache.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompileResult {
    pub output: String,
    pub words: usize,
    pub total_freq: u64,
    pub max_word_len: usize,
    pub duration_ms: u64,
}

impl HumanReadable for CutResult {
    fn to_human(&self) -> String {
        self.lines
            .iter()
            .map(|line| match &line.tokens {
                Some(tokens) => tokens
                    .iter()
                    .map(Token::to_string)
                    .collect::<Vec<_>>()
                    .join(&self.separator),
                None => line.words.join(&self.separator),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl HumanReadable for SuggestResult {
    fn to_human(&self) -> String {
        match self.current_freq {
            Some(current) => format!(
                "{}\t{} (current: {current})",
                self.segment, self.suggested_freq
            ),
            None => format!("{}\t{}", self.segment, self.suggested_freq),
        }
    }
}

impl HumanReadable for CompileResult {
    fn to_human(&self) -> String {
        format!(
            "Compiled {} words (total frequency {}, longest word {} chars) into {} in {} ms",
            self.words, self.total_freq, self.max_word_len, self.output, self.duration_ms
        )
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &QieArgs) -> Result<()>
where
    T: Serialize + HumanReadable,
{
    let rendered = render(message, result, args)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

/// Render a result without printing it.
pub fn render<T>(message: &str, result: &T, args: &QieArgs) -> Result<String>
where
    T: Serialize + HumanReadable,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                eprintln!("{message}");
            }
            Ok(result.to_human())
        }
        OutputFormat::Json => render_json(result, args),
    }
}

fn render_json<T: Serialize>(result: &T, args: &QieArgs) -> Result<String> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cut_result(tokens: bool) -> CutResult {
        CutResult {
            mode: "accurate".to_string(),
            lines: vec![CutLine {
                words: vec!["你好".to_string(), "世界".to_string()],
                tokens: tokens.then(|| {
                    vec![
                        Token::with_offsets("你好", 0, 0, 2),
                        Token::with_offsets("世界", 1, 2, 4),
                    ]
                }),
            }],
            duration_ms: 0,
            separator: " / ".to_string(),
        }
    }

    #[test]
    fn test_human_cut() {
        assert_eq!(cut_result(false).to_human(), "你好 / 世界");
        assert_eq!(cut_result(true).to_human(), "你好[0..2] / 世界[2..4]");
    }

    #[test]
    fn test_json_cut() {
        let args = QieArgs::try_parse_from(["qie", "-f", "json", "cut", "x"]).unwrap();
        let json = render("", &cut_result(false), &args).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lines"][0]["words"][1], "世界");
        assert!(value["lines"][0].get("tokens").is_none());
        assert!(value.get("separator").is_none());
    }

    #[test]
    fn test_human_suggest() {
        let result = SuggestResult {
            segment: "杭研".to_string(),
            current_freq: None,
            suggested_freq: 1,
        };
        assert_eq!(result.to_human(), "杭研\t1");
    }
}
