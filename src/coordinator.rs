//! The concurrency fabric: three bounded channels (Walker -> Reader, Reader
//! -> Counter, Counter -> Summariser) and a pool of workers on each edge.
//!
//! The Walker runs as a single task (it already fans out internally, one
//! rayon task per top-level directory entry). Reader and Counter each get a
//! pool sized to the hardware thread count. Every edge is a bounded MPMC
//! `crossbeam_channel`, so a fast producer blocks rather than growing memory
//! without bound; closing a channel is implicit once every sender clone on
//! that edge has been dropped, which cascades shutdown downstream exactly
//! like the wait-group in the source this models.

use crate::error::Error;
use crate::gc::GcController;
use crate::job::FileJob;
use crate::{counter, reader, walker};
use ahash::AHashSet;
use crossbeam_channel::bounded;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub walker: walker::WalkerConfig,
    pub detect_binary: bool,
    pub dedupe_by_hash: bool,
    pub count_complexity: bool,
    pub file_gc_count: u64,
    pub workers: usize,
}

/// Run the full Walker -> Reader -> Counter pipeline to completion and
/// return every surviving, fully-counted [`FileJob`] (binary files included,
/// with zero metrics; duplicates removed when `dedupe_by_hash` is set).
pub fn run(config: &CoordinatorConfig) -> Result<Vec<FileJob>, Error> {
    let workers = config.workers.max(1);
    let capacity = workers * 4;

    let (walk_tx, walk_rx) = bounded::<FileJob>(capacity);
    let (read_tx, read_rx) = bounded::<FileJob>(capacity);
    let (done_tx, done_rx) = bounded::<FileJob>(capacity);

    let gc = GcController::new(config.file_gc_count);
    let walk_result: Mutex<Result<(), Error>> = Mutex::new(Ok(()));
    let mut results = Vec::new();
    let mut seen_hashes: AHashSet<u64> = AHashSet::new();

    rayon::scope(|scope| {
        {
            let walk_tx = walk_tx;
            let walk_result = &walk_result;
            let walker_config = &config.walker;
            scope.spawn(move |_| {
                *walk_result.lock().unwrap() = walker::walk(walker_config, walk_tx);
            });
        }

        for _ in 0..workers {
            let walk_rx = walk_rx.clone();
            let read_tx = read_tx.clone();
            let detect_binary = config.detect_binary;
            let dedupe_by_hash = config.dedupe_by_hash;
            scope.spawn(move |_| {
                while let Ok(mut job) = walk_rx.recv() {
                    if reader::read_job(&mut job, detect_binary, dedupe_by_hash).is_ok()
                        && read_tx.send(job).is_err()
                    {
                        break;
                    }
                }
            });
        }
        drop(read_tx);
        drop(walk_rx);

        for _ in 0..workers {
            let read_rx = read_rx.clone();
            let done_tx = done_tx.clone();
            let gc = &gc;
            let count_complexity = config.count_complexity;
            scope.spawn(move |_| {
                while let Ok(mut job) = read_rx.recv() {
                    gc.record_file();
                    count_job(&mut job, count_complexity);
                    if done_tx.send(job).is_err() {
                        break;
                    }
                }
            });
        }
        drop(done_tx);
        drop(read_rx);

        for job in done_rx.iter() {
            if config.dedupe_by_hash {
                if let Some(hash) = job.hash {
                    if !seen_hashes.insert(hash) {
                        continue;
                    }
                }
            }
            results.push(job);
        }
    });

    walk_result.into_inner().unwrap()?;
    Ok(results)
}

/// The Counter stage for one job: run the byte-level state machine if the
/// job isn't binary, fill scalar metrics, then drop `content` so the
/// pipeline never retains file bytes past this point.
fn count_job(job: &mut FileJob, count_complexity: bool) {
    if !job.binary {
        if let Some(feature) = job.language_feature() {
            let content = job.content.take().unwrap_or_default();
            let result = counter::count(&content, feature, count_complexity);
            job.bytes = result.bytes;
            job.lines = result.lines;
            job.code = result.code;
            job.comment = result.comment;
            job.blank = result.blank;
            job.complexity = result.complexity;
        }
    }
    job.content = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config(root: &std::path::Path) -> CoordinatorConfig {
        CoordinatorConfig {
            walker: walker::WalkerConfig { roots: vec![root.to_path_buf()], ..Default::default() },
            detect_binary: true,
            dedupe_by_hash: false,
            count_complexity: true,
            file_gc_count: 10_000,
            workers: 2,
        }
    }

    #[test]
    fn runs_end_to_end_and_fills_metrics() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.rs"), "fn main() {\n    if true {}\n}\n").unwrap();

        let jobs = run(&config(dir.path())).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].language, Some("Rust"));
        assert_eq!(jobs[0].lines, jobs[0].code + jobs[0].comment + jobs[0].blank);
        assert!(jobs[0].content.is_none());
    }

    #[test]
    fn deduplicates_identical_content_when_enabled() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn f() {}\n").unwrap();
        fs::write(dir.path().join("b.rs"), "fn f() {}\n").unwrap();

        let mut cfg = config(dir.path());
        cfg.dedupe_by_hash = true;
        let jobs = run(&cfg).unwrap();
        assert_eq!(jobs.len(), 1);
    }

    #[test]
    fn missing_root_propagates_fatal_error() {
        let cfg = config(std::path::Path::new("/no/such/path-xyz"));
        assert!(matches!(run(&cfg), Err(Error::RootNotFound(_))));
    }
}
