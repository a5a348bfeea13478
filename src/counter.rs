//! The byte-level lexical state machine: given a file's raw bytes and its
//! resolved [`LanguageFeature`], classify every physical line as code,
//! comment, or blank, and count word-boundary complexity keyword hits.
//!
//! The alphabet is raw bytes, not chars — multi-byte comment/string
//! delimiters are matched as exact byte sequences, so this never needs to
//! validate UTF-8.

use crate::languages::LanguageFeature;

/// Per-file scalar output of a single counting pass. `weighted_complexity`
/// is deliberately absent — the summariser computes it from `complexity`
/// and `lines`, the Counter never touches it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountResult {
    pub bytes: u64,
    pub lines: u64,
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
    pub complexity: u64,
}

enum State {
    Code,
    LineComment,
    /// `opener` is retained only to detect nested occurrences of the same
    /// pair; unused when `nested` is false.
    BlockComment { depth: u32, opener: &'static str, closer: &'static str, nested: bool },
    StringLiteral { closer: &'static str, escape: bool, raw: bool },
    DocString { closer: &'static str, escape: bool },
}

enum LineClass {
    Code,
    Comment,
    Blank,
}

fn classify(saw_non_ws: bool, saw_comment: bool, saw_code: bool) -> LineClass {
    if !saw_non_ws {
        LineClass::Blank
    } else if saw_comment && !saw_code {
        LineClass::Comment
    } else {
        LineClass::Code
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn starts_with_at(content: &[u8], i: usize, needle: &str) -> bool {
    let needle = needle.as_bytes();
    content.len() >= i + needle.len() && &content[i..i + needle.len()] == needle
}

/// Longest matching doc-string opener at `i`, if any. Doc-strings are
/// checked ahead of plain strings so a language whose doc-string and string
/// delimiters are textually identical (Python's `"""`) resolves as a
/// doc-string — conventional docstrings should read as comments, not code.
fn match_doc_string(content: &[u8], i: usize, feature: &LanguageFeature) -> Option<(&'static str, &'static str)> {
    feature
        .doc_strings
        .iter()
        .filter(|(open, _)| starts_with_at(content, i, open))
        .max_by_key(|(open, _)| open.len())
        .copied()
}

fn match_string(content: &[u8], i: usize, feature: &LanguageFeature) -> Option<&crate::languages::StringDelim> {
    // `feature.strings` is pre-sorted longest-open-first; the first match wins.
    feature.strings.iter().find(|d| starts_with_at(content, i, d.open))
}

fn match_block_comment(content: &[u8], i: usize, feature: &LanguageFeature) -> Option<(&'static str, &'static str)> {
    feature
        .multi_line_comments
        .iter()
        .find(|(open, _)| starts_with_at(content, i, open))
        .copied()
}

fn match_line_comment(content: &[u8], i: usize, feature: &LanguageFeature) -> Option<&'static str> {
    feature.line_comments.iter().find(|open| starts_with_at(content, i, open)).copied()
}

fn match_keyword<'a>(content: &[u8], i: usize, feature: &'a LanguageFeature) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    for kw in feature.complexity_checks.iter() {
        let kwb = kw.as_bytes();
        if !starts_with_at(content, i, kw) {
            continue;
        }
        let before_ok = i == 0 || !is_word_byte(content[i - 1]) || !is_word_byte(kwb[0]);
        let after_idx = i + kwb.len();
        let after_ok = after_idx >= content.len()
            || !is_word_byte(content[after_idx])
            || !is_word_byte(kwb[kwb.len() - 1]);
        if before_ok && after_ok && best.is_none_or(|b: &str| b.len() < kw.len()) {
            best = Some(kw);
        }
    }
    best
}

/// Run the state machine over `content` against `feature`, producing line
/// and complexity metrics. Pass `count_complexity = false` to skip keyword
/// scanning entirely (`-c/--no-complexity`).
pub fn count(content: &[u8], feature: &LanguageFeature, count_complexity: bool) -> CountResult {
    let mut result = CountResult { bytes: content.len() as u64, ..Default::default() };
    if content.is_empty() {
        return result;
    }

    let mut state = State::Code;
    let mut saw_code = false;
    let mut saw_comment = false;
    let mut saw_non_ws = false;
    let mut line_started = false;
    let len = content.len();
    let mut i = 0usize;

    let mut flush = |result: &mut CountResult, saw_non_ws: bool, saw_comment: bool, saw_code: bool| {
        result.lines += 1;
        match classify(saw_non_ws, saw_comment, saw_code) {
            LineClass::Blank => result.blank += 1,
            LineClass::Comment => result.comment += 1,
            LineClass::Code => result.code += 1,
        }
    };

    while i < len {
        let b = content[i];

        if b == b'\n' {
            flush(&mut result, saw_non_ws, saw_comment, saw_code);
            saw_code = false;
            saw_comment = false;
            saw_non_ws = false;
            line_started = false;
            i += 1;
            // A line comment does not survive its terminating newline.
            if matches!(state, State::LineComment) {
                state = State::Code;
            } else {
                // Block comments, doc-strings and string literals continue;
                // the next line starts already "inside" that state.
                match &state {
                    State::BlockComment { .. } | State::DocString { .. } => {
                        saw_comment = true;
                        saw_non_ws = true;
                    }
                    State::StringLiteral { .. } => {
                        saw_code = true;
                        saw_non_ws = true;
                    }
                    State::Code | State::LineComment => {}
                }
            }
            continue;
        }

        line_started = true;

        match &mut state {
            State::Code => {
                if b == b'\r' {
                    i += 1;
                    continue;
                }
                if let Some((open, close)) = match_doc_string(content, i, feature) {
                    let escape = feature
                        .strings
                        .iter()
                        .find(|d| d.open == open)
                        .map(|d| d.escape)
                        .unwrap_or(true);
                    state = State::DocString { closer: close, escape };
                    saw_comment = true;
                    saw_non_ws = true;
                    i += open.len();
                    continue;
                }
                if let Some(delim) = match_string(content, i, feature) {
                    state = State::StringLiteral { closer: delim.close, escape: delim.escape, raw: delim.raw };
                    saw_code = true;
                    saw_non_ws = true;
                    i += delim.open.len();
                    continue;
                }
                if let Some((open, close)) = match_block_comment(content, i, feature) {
                    state = State::BlockComment { depth: 1, opener: open, closer: close, nested: feature.nested };
                    saw_comment = true;
                    saw_non_ws = true;
                    i += open.len();
                    continue;
                }
                if let Some(open) = match_line_comment(content, i, feature) {
                    state = State::LineComment;
                    saw_comment = true;
                    saw_non_ws = true;
                    i += open.len();
                    continue;
                }
                if count_complexity {
                    if let Some(kw) = match_keyword(content, i, feature) {
                        result.complexity += 1;
                        saw_code = true;
                        saw_non_ws = true;
                        i += kw.len();
                        continue;
                    }
                }
                if b == b' ' || b == b'\t' {
                    i += 1;
                } else {
                    saw_code = true;
                    saw_non_ws = true;
                    i += 1;
                }
            }
            State::LineComment => {
                i += 1;
            }
            State::BlockComment { depth, opener, closer, nested } => {
                if starts_with_at(content, i, closer) {
                    *depth -= 1;
                    let done = *depth == 0;
                    i += closer.len();
                    if done {
                        state = State::Code;
                    }
                } else if *nested && starts_with_at(content, i, opener) {
                    *depth += 1;
                    i += opener.len();
                } else {
                    i += 1;
                }
            }
            State::StringLiteral { closer, escape, raw } => {
                if !*raw && *escape && b == b'\\' {
                    i += if i + 1 < len { 2 } else { 1 };
                } else if starts_with_at(content, i, closer) {
                    i += closer.len();
                    state = State::Code;
                } else {
                    i += 1;
                }
            }
            State::DocString { closer, escape } => {
                if *escape && b == b'\\' {
                    i += if i + 1 < len { 2 } else { 1 };
                } else if starts_with_at(content, i, closer) {
                    i += closer.len();
                    state = State::Code;
                } else {
                    i += 1;
                }
            }
        }
    }

    if line_started {
        flush(&mut result, saw_non_ws, saw_comment, saw_code);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::registry;

    fn feature(name: &str) -> &'static LanguageFeature {
        registry::get(name).expect("known language")
    }

    #[test]
    fn empty_file_is_all_zero() {
        let r = count(b"", feature("Rust"), true);
        assert_eq!(r, CountResult::default());
    }

    #[test]
    fn newline_only_file_is_one_blank_line() {
        let r = count(b"\n", feature("Rust"), true);
        assert_eq!(r.lines, 1);
        assert_eq!(r.blank, 1);
        assert_eq!(r.code, 0);
        assert_eq!(r.comment, 0);
    }

    #[test]
    fn scenario_line_comment_then_code() {
        let r = count(b"//hi\ncode()\n", feature("Rust"), true);
        assert_eq!(r.lines, 2);
        assert_eq!(r.comment, 1);
        assert_eq!(r.code, 1);
        assert_eq!(r.blank, 0);
        assert_eq!(r.complexity, 0);
    }

    #[test]
    fn scenario_block_comment_spanning_lines() {
        let r = count(b"/*a\nb*/\nx\n", feature("Rust"), true);
        assert_eq!(r.lines, 3);
        assert_eq!(r.comment, 2);
        assert_eq!(r.code, 1);
        assert_eq!(r.blank, 0);
    }

    #[test]
    fn scenario_block_comment_opener_inside_string_is_inert() {
        let r = count(b"\"/*x\"\n", feature("Rust"), true);
        assert_eq!(r.lines, 1);
        assert_eq!(r.code, 1);
        assert_eq!(r.comment, 0);
    }

    #[test]
    fn scenario_keyword_complexity_hits() {
        let r = count(b"if (x) { return; }\n", feature("C"), true);
        assert_eq!(r.code, 1);
        assert!(r.complexity >= 1);
    }

    #[test]
    fn file_without_trailing_newline_still_counts_final_line() {
        let r = count(b"x = 1", feature("Rust"), true);
        assert_eq!(r.lines, 1);
        assert_eq!(r.code, 1);
    }

    #[test]
    fn unterminated_block_comment_is_tolerated() {
        let r = count(b"/* never closed\nstill going\n", feature("Rust"), true);
        assert_eq!(r.lines, 2);
        assert_eq!(r.comment, 2);
    }

    #[test]
    fn crlf_newlines_do_not_create_extra_lines() {
        let r = count(b"a\r\nb\r\n", feature("Rust"), true);
        assert_eq!(r.lines, 2);
        assert_eq!(r.code, 2);
    }

    #[test]
    fn doubling_a_file_doubles_every_metric() {
        let single = b"// c\nfn f() { if x {} }\n";
        let doubled: Vec<u8> = single.iter().chain(single.iter()).copied().collect();
        let a = count(single, feature("Rust"), true);
        let b = count(&doubled, feature("Rust"), true);
        assert_eq!(b.lines, a.lines * 2);
        assert_eq!(b.code, a.code * 2);
        assert_eq!(b.comment, a.comment * 2);
        assert_eq!(b.blank, a.blank * 2);
        assert_eq!(b.bytes, a.bytes * 2);
        assert_eq!(b.complexity, a.complexity * 2);
    }

    #[test]
    fn skips_complexity_scan_when_disabled() {
        let r = count(b"if x { if y {} }\n", feature("Rust"), false);
        assert_eq!(r.complexity, 0);
    }
}
