//! Cleanup of raw Project Gutenberg book files into plain sentence lines.
//!
//! The output feeds the corpus adapter: one line per sentence run, front and
//! back matter removed, hard line wraps joined back together.

/// Characters that close a sentence; a raw line ending in one of these also
/// closes an output line.
const SENTENCE_END_CHARS: [char; 3] = ['.', '!', '?'];

const BOOK_START_MARKER: &str = "*** START OF THE PROJECT GUTENBERG EBOOK";
const BOOK_END_MARKER: &str = "*** END OF THE PROJECT GUTENBERG EBOOK";

/// Normalizes one raw book into clean text lines.
///
/// - Keeps only the text between the start and end markers
/// - Drops blank lines, lines starting with `_`, the `CONTENTS` caption, and
///   chapter/letter captions
/// - Joins consecutive lines until one ends with a sentence-ending character
/// - Strips curly quotation marks and underscores, normalizes curly
///   apostrophes to `'`
pub fn normalize_book(raw: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut reached_start = false;

    for line in raw.lines() {
        if !reached_start {
            if line.starts_with(BOOK_START_MARKER) {
                reached_start = true;
            }
            continue;
        }
        if line.starts_with(BOOK_END_MARKER) {
            break;
        }

        let stripped = line.trim();
        if stripped.is_empty()
            || stripped.starts_with('_')
            || stripped == "CONTENTS"
            || is_caption(stripped)
        {
            continue;
        }

        let ends_sentence = stripped
            .chars()
            .last()
            .is_some_and(|c| SENTENCE_END_CHARS.contains(&c));

        current.push_str(&clean(stripped));
        if ends_sentence {
            lines.push(std::mem::take(&mut current));
        } else {
            current.push(' ');
        }
    }

    // A book that stops mid-sentence still contributes its tail.
    let tail = current.trim_end();
    if !tail.is_empty() {
        lines.push(tail.to_owned());
    }

    lines
}

/// Matches chapter and letter captions such as `CHAPTER 12` or `Letter 3`.
fn is_caption(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["chapter", "letter"].iter().any(|prefix| {
        lower
            .strip_prefix(prefix)
            .is_some_and(|rest| {
                rest.starts_with(char::is_whitespace)
                    && rest.trim_start().starts_with(|c: char| c.is_ascii_digit())
            })
    })
}

fn clean(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, '\u{201c}' | '\u{201d}' | '_'))
        .map(|c| if c == '\u{2019}' { '\'' } else { c })
        .collect()
}
