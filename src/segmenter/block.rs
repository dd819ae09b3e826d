//! Splitting sentences into blocks the engine segments and literal text it
//! passes through.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_SEGMENT_DEFAULT: Regex =
        Regex::new(r"[\u{4E00}-\u{9FD5}a-zA-Z0-9+#&\._%\-]+").unwrap();
    static ref RE_SKIP_DEFAULT: Regex = Regex::new(r"\r\n|\s").unwrap();
    pub(crate) static ref RE_HAN: Regex = Regex::new(r"[\u{4E00}-\u{9FD5}]+").unwrap();
    static ref RE_SKIP_FULL: Regex = Regex::new(r"[^a-zA-Z0-9+#\n]").unwrap();
    pub(crate) static ref RE_ALNUM: Regex = Regex::new(r"[a-zA-Z0-9]+(?:\.\d+)?%?").unwrap();
}

/// A piece of text relative to a regex: either a match or the text between
/// matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Matched(&'a str),
    Gap(&'a str),
}

/// Split `text` into alternating matches and gaps of `re`, in order.
/// Concatenating the pieces reproduces `text`.
pub(crate) fn split_matches<'a>(re: &Regex, text: &'a str) -> Vec<Piece<'a>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            pieces.push(Piece::Gap(&text[last..m.start()]));
        }
        if !m.as_str().is_empty() {
            pieces.push(Piece::Matched(m.as_str()));
        }
        last = m.end();
    }
    if last < text.len() {
        pieces.push(Piece::Gap(&text[last..]));
    }
    pieces
}

/// Push each character of `text` as its own slice.
pub(crate) fn push_chars<'a>(text: &'a str, out: &mut Vec<&'a str>) {
    for (i, ch) in text.char_indices() {
        out.push(&text[i..i + ch.len_utf8()]);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Block<'a> {
    /// Text to run through the word graph.
    Segment(&'a str),
    /// Text emitted as one token.
    Literal(&'a str),
}

/// Blocks for accurate and search mode.
///
/// Runs of CJK ideographs, ASCII alphanumerics and `+#&._%-` are segmented.
/// Everything else is emitted as literals: `\r\n` and each whitespace
/// character whole, other characters one at a time.
pub(crate) fn split_default(sentence: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    for piece in split_matches(&RE_SEGMENT_DEFAULT, sentence) {
        match piece {
            Piece::Matched(text) => blocks.push(Block::Segment(text)),
            Piece::Gap(gap) => {
                for skip in split_matches(&RE_SKIP_DEFAULT, gap) {
                    match skip {
                        Piece::Matched(ws) => blocks.push(Block::Literal(ws)),
                        Piece::Gap(other) => {
                            for (i, ch) in other.char_indices() {
                                blocks.push(Block::Literal(&other[i..i + ch.len_utf8()]));
                            }
                        }
                    }
                }
            }
        }
    }
    blocks
}

/// Blocks for full mode.
///
/// Segmented blocks are the same as in accurate mode, so mixed-script words
/// reach the word graph. Between them, runs of `\n` are literals as a whole
/// and any other character stands on its own.
pub(crate) fn split_full(sentence: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    for piece in split_matches(&RE_SEGMENT_DEFAULT, sentence) {
        match piece {
            Piece::Matched(text) => blocks.push(Block::Segment(text)),
            Piece::Gap(gap) => {
                for skip in split_matches(&RE_SKIP_FULL, gap) {
                    match skip {
                        Piece::Matched(text) | Piece::Gap(text) => {
                            blocks.push(Block::Literal(text))
                        }
                    }
                }
            }
        }
    }
    blocks
}
