//! # codetally
//!
//! A parallel source-tree line counter: it walks one or more root paths,
//! classifies each file's language, and tallies code/comment/blank lines and
//! a keyword-based complexity score per file and per language.
//!
//! The pipeline is four stages connected by bounded channels — a Walker that
//! discovers candidate files, a Reader that loads content and disambiguates
//! language, a Counter that runs a byte-level lexical state machine per file,
//! and a Summariser that aggregates the results. [`coordinator::run`] drives
//! all three concurrent stages; [`stats::Summary`] is what the Summariser
//! produces.
//!
//! ```no_run
//! use codetally::coordinator::{self, CoordinatorConfig};
//! use codetally::stats::Summary;
//! use codetally::walker::WalkerConfig;
//! use std::time::Instant;
//!
//! let config = CoordinatorConfig {
//!     walker: WalkerConfig { roots: vec![".".into()], ..Default::default() },
//!     detect_binary: true,
//!     dedupe_by_hash: false,
//!     count_complexity: true,
//!     file_gc_count: 10_000,
//!     workers: rayon::current_num_threads(),
//! };
//!
//! let start = Instant::now();
//! let jobs = coordinator::run(&config).unwrap();
//! let summary = Summary::from_jobs(&jobs, start.elapsed(), false);
//! for lang in &summary.languages {
//!     println!("{}: {} files, {} code", lang.name, lang.files, lang.code);
//! }
//! ```

pub mod cocomo;
pub mod coordinator;
pub mod counter;
pub mod error;
pub mod gc;
pub mod job;
pub mod languages;
pub mod reader;
pub mod stats;
pub mod walker;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod output;
