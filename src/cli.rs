//! Command-line surface, built with `clap`'s derive API the same way the
//! source this models wires up its flags.

use crate::coordinator::CoordinatorConfig;
use crate::output::{OutputConfig, OutputFormat};
use crate::stats::SortKey;
use crate::walker::WalkerConfig;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "codetally", version, about = "A parallel source code line, comment and complexity counter")]
pub struct Cli {
    /// Paths to scan; defaults to the current directory.
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Average engineer-year wage used by the COCOMO cost estimate.
    #[arg(long, default_value_t = 56_286)]
    pub avg_wage: i64,

    /// Disable binary-file detection; count every file as text.
    #[arg(long)]
    pub binary: bool,

    /// Print one row per file in addition to the per-language summary.
    #[arg(long)]
    pub by_file: bool,

    /// Suppress the COCOMO cost-estimate section.
    #[arg(long)]
    pub cocomo: bool,

    /// Disable `.ignore` file handling.
    #[arg(long)]
    pub no_ignore: bool,

    /// Disable `.gitignore` file handling.
    #[arg(long)]
    pub no_gitignore: bool,

    /// Log at debug level.
    #[arg(long)]
    pub debug: bool,

    /// Log at trace level.
    #[arg(long)]
    pub trace: bool,

    /// Log at verbose (info) level.
    #[arg(long)]
    pub verbose: bool,

    /// Directory name prefixes to exclude from traversal.
    #[arg(long, value_delimiter = ',', default_value = ".git,.hg,.svn")]
    pub exclude_dir: Vec<String>,

    /// Files counted before the memory-pressure controller logs its
    /// threshold crossing.
    #[arg(long, default_value_t = 10_000)]
    pub file_gc_count: u64,

    /// Output format.
    #[arg(short = 'f', long, default_value = "tabular")]
    pub format: String,

    /// Restrict counted files to these extensions (matched case-insensitively).
    #[arg(short = 'i', long, value_delimiter = ',')]
    pub include_ext: Vec<String>,

    /// Print the known language feature table and exit.
    #[arg(short = 'l', long)]
    pub languages: bool,

    /// Skip complexity accumulation.
    #[arg(short = 'c', long)]
    pub no_complexity: bool,

    /// Deduplicate files by content hash, keeping the first occurrence of
    /// each unique file.
    #[arg(short = 'd', long)]
    pub no_duplicates: bool,

    /// Regexes; a file or directory name matching any of these is excluded.
    #[arg(short = 'M', long)]
    pub not_match: Vec<String>,

    /// Write output to this path instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Sort key for the per-language (and, with --by-file, per-file) rows.
    #[arg(short = 's', long, default_value = "files")]
    pub sort: String,

    /// Wide tabular output; implies complexity counting.
    #[arg(short = 'w', long)]
    pub wide: bool,
}

#[derive(Debug)]
pub struct ResolvedConfig {
    pub coordinator: CoordinatorConfig,
    pub output: OutputConfig,
    pub sort: SortKey,
    pub avg_wage: f64,
    pub show_cocomo: bool,
    pub output_path: Option<PathBuf>,
}

impl Cli {
    /// Translate the parsed flags into the pipeline's own config types.
    /// Returns an error for anything the flag parser itself can't reject,
    /// such as an unknown `--format`/`--sort` value or a malformed regex.
    pub fn resolve(&self) -> Result<ResolvedConfig, crate::error::Error> {
        let mut format = OutputFormat::parse(&self.format)
            .ok_or_else(|| crate::error::Error::InvalidConfig(format!("unknown format: {}", self.format)))?;
        if self.wide && format == OutputFormat::Tabular {
            format = OutputFormat::Wide;
        }
        let sort = SortKey::parse(&self.sort)
            .ok_or_else(|| crate::error::Error::InvalidConfig(format!("unknown sort key: {}", self.sort)))?;

        let not_match = self
            .not_match
            .iter()
            .map(|pat| {
                Regex::new(pat)
                    .map_err(|e| crate::error::Error::InvalidConfig(format!("bad --not-match regex {pat}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let walker = WalkerConfig {
            roots: self.paths.clone(),
            exclude_dirs: self.exclude_dir.clone(),
            not_match,
            include_exts: self.include_ext.clone(),
            use_gitignore: !self.no_gitignore,
            use_ignore: !self.no_ignore,
            verbose: self.verbose || self.debug || self.trace,
        };

        let count_complexity = self.wide || !self.no_complexity;

        let coordinator = CoordinatorConfig {
            walker,
            detect_binary: !self.binary,
            dedupe_by_hash: self.no_duplicates,
            count_complexity,
            file_gc_count: self.file_gc_count,
            workers: rayon::current_num_threads(),
        };

        let output = OutputConfig { format, by_file: self.by_file };

        Ok(ResolvedConfig {
            coordinator,
            output,
            sort,
            avg_wage: self.avg_wage as f64,
            show_cocomo: !self.cocomo,
            output_path: self.output.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_tabular_sorted_by_files() {
        let cli = Cli::parse_from(["codetally", "."]);
        let resolved = cli.resolve().unwrap();
        assert_eq!(resolved.sort, SortKey::Files);
        assert!(matches!(resolved.output.format, OutputFormat::Tabular));
        assert!(resolved.coordinator.detect_binary);
        assert!(!resolved.coordinator.dedupe_by_hash);
        assert!(resolved.coordinator.count_complexity);
    }

    #[test]
    fn wide_forces_complexity_even_with_no_complexity() {
        let cli = Cli::parse_from(["codetally", "--wide", "--no-complexity", "."]);
        let resolved = cli.resolve().unwrap();
        assert!(resolved.coordinator.count_complexity);
        assert!(matches!(resolved.output.format, OutputFormat::Wide));
    }

    #[test]
    fn explicit_format_flag_overrides_wide_shorthand() {
        let cli = Cli::parse_from(["codetally", "--wide", "-f", "json", "."]);
        let resolved = cli.resolve().unwrap();
        assert!(matches!(resolved.output.format, OutputFormat::Json));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let cli = Cli::parse_from(["codetally", "-f", "bogus", "."]);
        assert!(cli.resolve().is_err());
    }

    #[test]
    fn no_duplicates_flag_enables_hash_dedup() {
        let cli = Cli::parse_from(["codetally", "-d", "."]);
        let resolved = cli.resolve().unwrap();
        assert!(resolved.coordinator.dedupe_by_hash);
    }
}
