//! The [`FileJob`] record that flows Walker -> Reader -> Counter -> Summariser.
//!
//! Ownership passes stage by stage: the Walker creates a job and fills
//! identity, the Reader fills content and resolves `language`, the Counter
//! fills the scalar metrics and then drops `content`. No two stages mutate
//! the same job concurrently.

use crate::languages::LanguageFeature;
use std::path::PathBuf;

/// One candidate file, mutable as it is handed down the pipeline.
#[derive(Debug, Clone)]
pub struct FileJob {
    /// Absolute path on disk.
    pub location: PathBuf,
    /// Bare file name (`Cargo.toml`, not the full path).
    pub filename: String,
    /// Normalised (lowercased) extension, empty for extension-less names.
    pub extension: String,

    /// Candidate languages in disambiguation order. Never empty, never
    /// mutated after the Walker emits the job.
    pub possible_languages: Vec<&'static str>,
    /// Resolved language name, set by the Reader before the Counter runs.
    pub language: Option<&'static str>,

    /// Raw file bytes, owned transiently; cleared by the Counter once
    /// counting finishes so a long pipeline doesn't retain file contents.
    pub content: Option<Vec<u8>>,

    pub bytes: u64,
    pub lines: u64,
    pub code: u64,
    pub comment: u64,
    pub blank: u64,
    pub complexity: u64,
    /// Set by the summariser (`complexity / lines * weight`), not the Counter.
    pub weighted_complexity: f64,
    pub binary: bool,

    /// Content hash for duplicate detection, computed by the Reader when
    /// enabled.
    pub hash: Option<u64>,
}

impl FileJob {
    pub fn new(location: PathBuf, filename: String, extension: String, possible_languages: Vec<&'static str>) -> Self {
        Self {
            location,
            filename,
            extension,
            possible_languages,
            language: None,
            content: None,
            bytes: 0,
            lines: 0,
            code: 0,
            comment: 0,
            blank: 0,
            complexity: 0,
            weighted_complexity: 0.0,
            binary: false,
            hash: None,
        }
    }

    /// `Lines = Code + Comment + Blank` must hold for every counted,
    /// non-binary file.
    pub fn total_lines(&self) -> u64 {
        self.code + self.comment + self.blank
    }

    pub fn language_feature(&self) -> Option<&'static LanguageFeature> {
        crate::languages::registry::get(self.language?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_lines_matches_invariant() {
        let mut job = FileJob::new("a.rs".into(), "a.rs".into(), "rs".into(), vec!["Rust"]);
        job.code = 3;
        job.comment = 2;
        job.blank = 1;
        assert_eq!(job.total_lines(), 6);
    }
}
