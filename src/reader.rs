//! The Reader stage: loads a [`FileJob`]'s content, detects binary files,
//! and disambiguates among its candidate languages.
//!
//! Disambiguation tries, in order, a `#!` shebang line, a feature's
//! first-line regex, then a key-phrase presence count over the whole file —
//! falling back to the first candidate on a total tie. That fallback is
//! deliberate, not a bug: it mirrors the behaviour this pipeline is modeled
//! on, so tests pin it rather than "fixing" it.

use crate::languages::{self, registry};
use std::hash::{Hash, Hasher};
use std::io;
use std::path::Path;

use crate::job::FileJob;

/// First N bytes scanned for a NUL byte to flag a file as binary.
const BINARY_SNIFF_LEN: usize = 256;

pub struct ReadOutcome {
    pub binary: bool,
}

/// Read `job.location`, fill `content`/`bytes`/`binary`, resolve `language`,
/// and (when requested) the content hash used for duplicate detection.
pub fn read_job(job: &mut FileJob, detect_binary: bool, hash_duplicates: bool) -> io::Result<ReadOutcome> {
    let content = std::fs::read(&job.location)?;
    job.bytes = content.len() as u64;

    let binary = detect_binary && sniff_binary(&content);
    job.binary = binary;

    if binary {
        job.content = None;
        job.language = job.possible_languages.first().copied();
        return Ok(ReadOutcome { binary: true });
    }

    if hash_duplicates {
        job.hash = Some(content_hash(&content));
    }

    job.language = Some(resolve_language(&job.possible_languages, &content));
    job.content = Some(content);
    Ok(ReadOutcome { binary: false })
}

fn sniff_binary(content: &[u8]) -> bool {
    let n = content.len().min(BINARY_SNIFF_LEN);
    content[..n].contains(&0)
}

fn content_hash(content: &[u8]) -> u64 {
    let mut hasher = ahash::AHasher::default();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Pick one of `candidates` for `content`. `candidates` is never empty —
/// the Walker only emits jobs with at least one candidate language.
fn resolve_language(candidates: &[&'static str], content: &[u8]) -> &'static str {
    if candidates.len() == 1 {
        return candidates[0];
    }

    if let Some(shebang) = first_line(content).filter(|l| l.starts_with("#!")) {
        if let Some(lang) = by_shebang(candidates, shebang) {
            return lang;
        }
    }

    if let Some(line) = first_line(content) {
        if let Some(lang) = by_first_line_pattern(candidates, line) {
            return lang;
        }
    }

    by_key_phrase_count(candidates, content).unwrap_or(candidates[0])
}

fn first_line(content: &[u8]) -> Option<&str> {
    let end = content.iter().position(|&b| b == b'\n').unwrap_or(content.len());
    std::str::from_utf8(&content[..end]).ok()
}

fn by_shebang(candidates: &[&'static str], shebang_line: &str) -> Option<&'static str> {
    candidates.iter().copied().find(|&name| {
        registry::get(name)
            .map(|f| f.shebangs.iter().any(|interp| shebang_line.contains(interp)))
            .unwrap_or(false)
    })
}

fn by_first_line_pattern(candidates: &[&'static str], line: &str) -> Option<&'static str> {
    candidates.iter().copied().find(|&name| {
        registry::get(name)
            .and_then(|f| f.first_line_pattern.as_ref().map(|re| re.is_match(line)))
            .unwrap_or(false)
    })
}

/// Highest key-phrase count wins; a tie (including the all-zero case) keeps
/// the first candidate in `candidates` order. `Iterator::max_by_key` would
/// instead keep the *last* of equal-count candidates, so this walks by hand
/// and only replaces the leader on a strictly greater count.
fn by_key_phrase_count(candidates: &[&'static str], content: &[u8]) -> Option<&'static str> {
    let text = String::from_utf8_lossy(content);
    let mut best: Option<(&'static str, usize)> = None;

    for &name in candidates {
        let count = registry::get(name)
            .map(|f| f.keywords.iter().map(|kw| text.matches(kw).count()).sum::<usize>())
            .unwrap_or(0);
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }

    best.filter(|(_, count)| *count > 0).map(|(name, _)| name)
}

/// Whether `path`'s extension/name maps to at least one language, without
/// performing any I/O — used by the Walker to skip a file entirely.
pub fn has_known_language(path: &Path) -> bool {
    languages::candidates_for(path).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_candidate_skips_disambiguation() {
        assert_eq!(resolve_language(&["Rust"], b"fn main() {}"), "Rust");
    }

    #[test]
    fn shebang_overrides_extension_based_candidates() {
        let content = b"#!/usr/bin/env perl\nuse strict;\n";
        assert_eq!(resolve_language(&["Perl", "Prolog"], content), "Perl");
    }

    #[test]
    fn key_phrase_count_breaks_ties_between_candidates() {
        let content = b"function foo(x)\n  if x > 0\n    disp(x)\n  end\nend\n";
        assert_eq!(resolve_language(&["Objective-C", "MATLAB"], content), "MATLAB");
    }

    #[test]
    fn falls_back_to_first_candidate_with_no_signal() {
        assert_eq!(resolve_language(&["Objective-C", "MATLAB"], b"\n"), "Objective-C");
    }

    #[test]
    fn key_phrase_count_prefers_first_candidate_on_a_nonzero_tie() {
        // "sub " (Perl) and ":-" (Prolog) each match exactly once.
        let content = b"sub foo {}\n:- dynamic(x).\n";
        assert_eq!(by_key_phrase_count(&["Perl", "Prolog"], content), Some("Perl"));
        assert_eq!(by_key_phrase_count(&["Prolog", "Perl"], content), Some("Prolog"));
    }

    #[test]
    fn sniffs_nul_byte_as_binary() {
        let mut content = vec![b'a'; 10];
        content.push(0);
        assert!(sniff_binary(&content));
        assert!(!sniff_binary(b"plain text, no nul bytes here"));
    }
}
