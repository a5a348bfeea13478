//! The Walker: traverses each input root, applies directory/file filtering,
//! resolves candidate languages, and emits [`FileJob`]s onto a bounded
//! channel.
//!
//! Traversal fans out one worker per top-level entry of each root — real
//! trees have top-level breadth far greater than the hardware thread count,
//! so no deeper fan-out is needed. `.gitignore`/`.ignore` are read once from
//! the root, not re-read at every directory level.

use crate::error::Error;
use crate::job::FileJob;
use crossbeam_channel::Sender;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub roots: Vec<PathBuf>,
    pub exclude_dirs: Vec<String>,
    pub not_match: Vec<Regex>,
    pub include_exts: Vec<String>,
    pub use_gitignore: bool,
    pub use_ignore: bool,
    pub verbose: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            exclude_dirs: vec![".git".into(), ".hg".into(), ".svn".into()],
            not_match: Vec::new(),
            include_exts: Vec::new(),
            use_gitignore: true,
            use_ignore: true,
            verbose: false,
        }
    }
}

/// The root-only ignore matcher: a "disabled" matcher (when the
/// corresponding flag turns it off) always reports no match, rather than
/// branching at every call site.
enum RootMatcher {
    Active(Gitignore),
    Disabled,
}

impl RootMatcher {
    fn load(root: &Path, filename: &str, enabled: bool) -> Self {
        if !enabled {
            return RootMatcher::Disabled;
        }
        let candidate = root.join(filename);
        if !candidate.is_file() {
            return RootMatcher::Disabled;
        }
        let mut builder = GitignoreBuilder::new(root);
        if builder.add(&candidate).is_some() {
            return RootMatcher::Disabled;
        }
        match builder.build() {
            Ok(gi) => RootMatcher::Active(gi),
            Err(_) => RootMatcher::Disabled,
        }
    }

    fn is_match(&self, path: &Path, is_dir: bool) -> bool {
        match self {
            RootMatcher::Disabled => false,
            RootMatcher::Active(gi) => gi.matched(path, is_dir).is_ignore(),
        }
    }
}

/// Union of the root's `.gitignore` and `.ignore` matchers: either matching
/// is enough to exclude (see the open question this preserves).
struct IgnoreSet {
    gitignore: RootMatcher,
    ignore: RootMatcher,
}

impl IgnoreSet {
    fn load(root: &Path, config: &WalkerConfig) -> Self {
        Self {
            gitignore: RootMatcher::load(root, ".gitignore", config.use_gitignore),
            ignore: RootMatcher::load(root, ".ignore", config.use_ignore),
        }
    }

    /// A root that is itself a file has no directory to load `.gitignore`/
    /// `.ignore` from, so it is scanned with both matchers disabled.
    fn disabled() -> Self {
        Self { gitignore: RootMatcher::Disabled, ignore: RootMatcher::Disabled }
    }

    fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        self.gitignore.is_match(path, is_dir) || self.ignore.is_match(path, is_dir)
    }
}

fn is_blacklisted_dir(name: &str, config: &WalkerConfig) -> bool {
    config.exclude_dirs.iter().any(|prefix| name.starts_with(prefix.as_str()))
}

fn matches_user_regex(name: &str, config: &WalkerConfig) -> bool {
    config.not_match.iter().any(|re| re.is_match(name))
}

fn extension_allowed(ext: &str, config: &WalkerConfig) -> bool {
    config.include_exts.is_empty() || config.include_exts.iter().any(|e| e.eq_ignore_ascii_case(ext))
}

/// Walk every configured root, sending a [`FileJob`] for each surviving file
/// on `tx`. Returns once every root has been fully traversed; the caller
/// closes the pipeline by dropping its own sender clones.
pub fn walk(config: &WalkerConfig, tx: Sender<FileJob>) -> Result<(), Error> {
    for root in &config.roots {
        if !root.exists() {
            return Err(Error::RootNotFound(root.clone()));
        }
        walk_root(root, config, &tx)?;
    }
    Ok(())
}

fn walk_root(root: &Path, config: &WalkerConfig, tx: &Sender<FileJob>) -> Result<(), Error> {
    if root.is_file() {
        emit_if_matched(root, config, &IgnoreSet::disabled(), tx);
        return Ok(());
    }

    let ignores = IgnoreSet::load(root, config);
    let entries: Vec<PathBuf> = match std::fs::read_dir(root) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => return Ok(()), // unreadable root directory: nothing to traverse, not fatal
    };

    entries.par_iter().for_each(|entry| {
        walk_entry(entry, config, &ignores, tx);
    });

    Ok(())
}

/// Walk one top-level entry (file or directory) to completion. This is the
/// unit of fan-out: one rayon task per top-level entry.
fn walk_entry(entry: &Path, config: &WalkerConfig, ignores: &IgnoreSet, tx: &Sender<FileJob>) {
    if entry.is_file() {
        emit_if_matched(entry, config, ignores, tx);
        return;
    }
    if !entry.is_dir() {
        return;
    }

    let walker = walkdir::WalkDir::new(entry).into_iter().filter_entry(|de| {
        if !de.file_type().is_dir() {
            return true;
        }
        let name = de.file_name().to_string_lossy();
        if is_blacklisted_dir(&name, config) || matches_user_regex(&name, config) {
            return false;
        }
        !ignores.is_excluded(de.path(), true)
    });

    for de in walker.filter_map(Result::ok) {
        if de.file_type().is_file() {
            emit_if_matched(de.path(), config, ignores, tx);
        }
    }
}

fn emit_if_matched(path: &Path, config: &WalkerConfig, ignores: &IgnoreSet, tx: &Sender<FileJob>) {
    let filename = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return,
    };

    if matches_user_regex(filename, config) || ignores.is_excluded(path, false) {
        return;
    }

    let Some((ext, candidates)) = crate::languages::candidates_for(path) else {
        if config.verbose {
            eprintln!("skip: no known language for {}", path.display());
        }
        return;
    };

    if !ext.is_empty() && !extension_allowed(&ext, config) {
        return;
    }

    let job = FileJob::new(path.to_path_buf(), filename.to_string(), ext, candidates);
    let _ = tx.send(job);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(config: &WalkerConfig) -> Vec<FileJob> {
        let (tx, rx) = crossbeam_channel::unbounded();
        walk(config, tx).unwrap();
        rx.into_iter().collect()
    }

    #[test]
    fn finds_files_with_known_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("notes.unknownext"), "x").unwrap();

        let config = WalkerConfig { roots: vec![dir.path().to_path_buf()], ..Default::default() };
        let jobs = collect(&config);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].filename, "main.rs");
    }

    #[test]
    fn prunes_default_blacklisted_directories() {
        let dir = TempDir::new().unwrap();
        let git = dir.path().join(".git");
        fs::create_dir(&git).unwrap();
        fs::write(git.join("x.go"), "package main").unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();

        let config = WalkerConfig { roots: vec![dir.path().to_path_buf()], ..Default::default() };
        let jobs = collect(&config);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].filename, "main.rs");
    }

    #[test]
    fn honors_root_gitignore() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored.rs\n").unwrap();
        fs::write(dir.path().join("ignored.rs"), "fn f() {}").unwrap();
        fs::write(dir.path().join("kept.rs"), "fn g() {}").unwrap();

        let config = WalkerConfig { roots: vec![dir.path().to_path_buf()], ..Default::default() };
        let jobs = collect(&config);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].filename, "kept.rs");
    }

    #[test]
    fn missing_root_is_fatal() {
        let config = WalkerConfig { roots: vec![PathBuf::from("/no/such/path-xyz")], ..Default::default() };
        let (tx, _rx) = crossbeam_channel::unbounded();
        assert!(matches!(walk(&config, tx), Err(Error::RootNotFound(_))));
    }

    #[test]
    fn restricts_to_include_exts_when_set() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(dir.path().join("main.go"), "package main").unwrap();

        let config = WalkerConfig {
            roots: vec![dir.path().to_path_buf()],
            include_exts: vec!["go".to_string()],
            ..Default::default()
        };
        let jobs = collect(&config);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].filename, "main.go");
    }
}
