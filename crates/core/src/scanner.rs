//! Code Scanner
//!
//! Counts keyword evidence for every syllabus topic in a blob of source text.
//! Comments and literal contents are stripped first so that a keyword mentioned
//! in prose or inside a string does not count as practice. Matching is literal,
//! non-overlapping substring counting: it is a heuristic and will happily count
//! `int` inside `print`.

use crate::syllabus::Syllabus;
use crate::topic::ScanCounts;
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
    Quoted,
    Raw,
    Rune,
}

/// Removes line comments, block comments and the contents of string and rune
/// literals. Newlines are kept so line structure survives.
pub fn strip_non_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut mode = Mode::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    mode = Mode::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    mode = Mode::BlockComment;
                }
                '"' => mode = Mode::Quoted,
                '`' => mode = Mode::Raw,
                '\'' => mode = Mode::Rune,
                _ => out.push(c),
            },
            Mode::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    mode = Mode::Code;
                } else if c == '\n' {
                    out.push('\n');
                }
            }
            Mode::Quoted | Mode::Rune => {
                let close = if mode == Mode::Quoted { '"' } else { '\'' };
                if c == '\\' {
                    chars.next();
                } else if c == close {
                    mode = Mode::Code;
                } else if c == '\n' {
                    // Unterminated literal; resume scanning on the next line.
                    out.push('\n');
                    mode = Mode::Code;
                }
            }
            Mode::Raw => {
                if c == '`' {
                    mode = Mode::Code;
                } else if c == '\n' {
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Counts keyword occurrences for every topic in a single blob.
pub fn scan(syllabus: &Syllabus, text: &str) -> ScanCounts {
    let code = strip_non_code(text);
    let mut counts = ScanCounts::new();

    for topic in syllabus.topics() {
        for keyword in topic.keywords.iter().filter(|k| !k.is_empty()) {
            let hits = code.matches(keyword.as_str()).count() as u64;
            if hits > 0 {
                debug!(topic = %topic.name, keyword = %keyword, hits, "Keyword matched");
                counts.add(&topic.name, hits);
            }
        }
    }

    counts
}

/// Scans many blobs and sums their counters.
pub fn scan_all<'a, I>(syllabus: &Syllabus, blobs: I) -> ScanCounts
where
    I: IntoIterator<Item = &'a str>,
{
    blobs
        .into_iter()
        .map(|blob| scan(syllabus, blob))
        .fold(ScanCounts::new(), |mut acc, counts| {
            acc.merge(counts);
            acc
        })
}
