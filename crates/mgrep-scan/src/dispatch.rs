//! Multi-threaded directory scanning.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::thread;

use mgrep_cache::PatternHandle;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::engine::{scan_file, ScanOutcome};
use crate::error::{ScanError, ScanResult};
use crate::matcher::Matcher;
use crate::walk::{enumerate, FileEntry};

/// Split `len` items into `workers` contiguous ranges.
///
/// Every range but the last holds `len / workers` items; the last one also
/// takes the remainder. `workers` below 1 is treated as 1.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let chunk = len / workers;
    (0..workers)
        .map(|i| {
            let start = i * chunk;
            let end = if i + 1 == workers { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// A per-file failure that did not stop the scan.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ScanError,
}

/// Totals for one scan invocation.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files read and committed for the first time.
    pub created: usize,
    /// Files read again because their mtime changed.
    pub rescanned: usize,
    /// Files skipped because their mtime matched.
    pub unchanged: usize,
    /// Matched lines committed during this invocation.
    pub matches: usize,
    /// Per-file failures, in slice order.
    pub failures: Vec<FileFailure>,
}

impl ScanReport {
    /// Number of files the scan looked at.
    pub fn files(&self) -> usize {
        self.created + self.rescanned + self.unchanged + self.failures.len()
    }

    /// `true` if every file scanned cleanly.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The failure to surface to the user, if any.
    pub fn first_failure(&self) -> Option<&FileFailure> {
        self.failures.first()
    }

    fn record(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Unchanged => self.unchanged += 1,
            ScanOutcome::Scanned { matches, created } => {
                if created {
                    self.created += 1;
                } else {
                    self.rescanned += 1;
                }
                self.matches += matches;
            }
        }
    }

    fn merge(&mut self, other: ScanReport) {
        self.created += other.created;
        self.rescanned += other.rescanned;
        self.unchanged += other.unchanged;
        self.matches += other.matches;
        self.failures.extend(other.failures);
    }
}

/// Result of one worker's slice.
struct SliceResult {
    report: ScanReport,
    fatal: Option<ScanError>,
}

/// Scans a directory tree with a fixed number of worker threads.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    config: ScanConfig,
}

impl Dispatcher {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Threads used for `files` entries: the configured count, but never
    /// more than one per file.
    pub fn worker_count(&self, files: usize) -> usize {
        self.config.threads.clamp(1, files.max(1))
    }

    /// Enumerate `root` and scan every regular file under it.
    pub fn scan_directory(
        &self,
        pattern: &PatternHandle<'_>,
        matcher: &dyn Matcher,
        root: &Path,
    ) -> ScanResult<ScanReport> {
        let files = enumerate(root)?;
        info!(
            root = %root.display(),
            files = files.len(),
            threads = self.worker_count(files.len()),
            "scanning directory"
        );
        self.scan_entries(pattern, matcher, &files)
    }

    /// Scan an already enumerated file list.
    ///
    /// Per-file failures are collected into the report. A fatal error stops
    /// the worker that hit it; the other workers run to completion and the
    /// first fatal error, in slice order, is returned after all have joined.
    pub fn scan_entries(
        &self,
        pattern: &PatternHandle<'_>,
        matcher: &dyn Matcher,
        files: &[FileEntry],
    ) -> ScanResult<ScanReport> {
        let slices = partition(files.len(), self.worker_count(files.len()));

        let results: ScanResult<Vec<SliceResult>> = thread::scope(|s| {
            let mut workers = Vec::with_capacity(slices.len());
            for (worker, range) in slices.into_iter().enumerate() {
                let slice = &files[range];
                let handle = thread::Builder::new()
                    .name(format!("mgrep-scan-{worker}"))
                    .spawn_scoped(s, move || scan_slice(worker, pattern, matcher, slice))
                    .map_err(|source| ScanError::Spawn { worker, source })?;
                workers.push(handle);
            }

            Ok(workers
                .into_iter()
                .map(|w| w.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect())
        });
        let results = results?;

        let mut report = ScanReport::default();
        let mut fatal = None;
        for result in results {
            report.merge(result.report);
            if fatal.is_none() {
                fatal = result.fatal;
            }
        }

        if let Some(err) = fatal {
            return Err(err);
        }
        debug!(
            created = report.created,
            rescanned = report.rescanned,
            unchanged = report.unchanged,
            failed = report.failures.len(),
            "directory scan finished"
        );
        Ok(report)
    }
}

fn scan_slice(
    worker: usize,
    pattern: &PatternHandle<'_>,
    matcher: &dyn Matcher,
    slice: &[FileEntry],
) -> SliceResult {
    debug!(worker, files = slice.len(), "worker started");
    let mut report = ScanReport::default();

    for entry in slice {
        match scan_file(pattern, matcher, &entry.path, entry.mtime) {
            Ok(outcome) => report.record(outcome),
            Err(err) if err.is_fatal() => {
                warn!(worker, path = %entry.path.display(), error = %err, "worker stopped");
                return SliceResult {
                    report,
                    fatal: Some(err),
                };
            }
            Err(err) => {
                warn!(worker, error = %err, "file skipped");
                report.failures.push(FileFailure {
                    path: entry.path.clone(),
                    error: err,
                });
            }
        }
    }

    SliceResult {
        report,
        fatal: None,
    }
}

/// Scan `path` under `pattern`: a directory goes through the [`Dispatcher`],
/// a regular file is scanned directly.
pub fn scan_path(
    pattern: &PatternHandle<'_>,
    matcher: &dyn Matcher,
    path: &Path,
    config: &ScanConfig,
) -> ScanResult<ScanReport> {
    let metadata =
        std::fs::metadata(path).map_err(|_| ScanError::InvalidInput(path.to_path_buf()))?;

    if metadata.is_dir() {
        return Dispatcher::new(config.clone()).scan_directory(pattern, matcher, path);
    }
    if !metadata.is_file() {
        return Err(ScanError::InvalidInput(path.to_path_buf()));
    }

    let mut report = ScanReport::default();
    let scanned = FileEntry::stat(path)
        .and_then(|entry| scan_file(pattern, matcher, &entry.path, entry.mtime));
    match scanned {
        Ok(outcome) => report.record(outcome),
        Err(err) if err.is_fatal() => return Err(err),
        Err(err) => {
            warn!(error = %err, "file skipped");
            report.failures.push(FileFailure {
                path: path.to_path_buf(),
                error: err,
            });
        }
    }
    Ok(report)
}
