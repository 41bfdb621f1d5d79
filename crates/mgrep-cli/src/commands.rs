use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use mgrep_cache::MatchCache;
use mgrep_scan::{scan_path, RegexMatcher, ScanConfig, ScanReport};
use mgrep_store::{StoreConfig, SyncMode};

use crate::cli::{Cli, OutputFormat};
use crate::report::{
    write_json, write_pattern, write_pattern_list, write_scan_summary, PatternList, PatternReport,
    ScanSummary,
};

/// How a successful run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The scan finished but at least one file could not be processed.
    FileFailures,
}

impl Status {
    /// Process exit status. 1 is taken by fatal errors and 2 by usage errors.
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::FileFailures => 3,
        }
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        ExitCode::from(status.code())
    }
}

pub fn store_config(cli: &Cli) -> StoreConfig {
    let sync_mode = if cli.no_sync {
        SyncMode::OsDefault
    } else {
        SyncMode::EveryCommit
    };
    StoreConfig::default()
        .with_sync_mode(sync_mode)
        .with_capacity(cli.capacity_mib.saturating_mul(1024 * 1024))
}

pub fn run_command<W: Write>(cli: &Cli, out: &mut W) -> anyhow::Result<Status> {
    let cache = MatchCache::open_or_create(&cli.store, store_config(cli))
        .with_context(|| format!("cannot open store {}", cli.store.display()))?;

    let Some(text) = cli.pattern.as_deref() else {
        return cmd_list(&cache, cli.format, out);
    };
    match &cli.path {
        None => cmd_show(&cache, text, cli.format, out),
        Some(path) => cmd_scan(&cache, text, path, cli, out),
    }
}

fn cmd_list<W: Write>(cache: &MatchCache, format: OutputFormat, out: &mut W) -> anyhow::Result<Status> {
    let patterns = cache.patterns();
    let list = PatternList {
        count: patterns.len(),
        patterns: &patterns,
    };
    match format {
        OutputFormat::Text => write_pattern_list(out, &list)?,
        OutputFormat::Json => write_json(out, &list)?,
    }
    Ok(Status::Success)
}

fn cmd_show<W: Write>(
    cache: &MatchCache,
    text: &str,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<Status> {
    RegexMatcher::new(text)?;
    let pattern = cache
        .find_or_create_pattern(text)
        .with_context(|| format!("cannot load pattern {text:?}"))?;
    let files = pattern.files()?;
    let report = PatternReport::new(pattern.text(), &files);
    match format {
        OutputFormat::Text => write_pattern(out, &report)?,
        OutputFormat::Json => write_json(out, &report)?,
    }
    Ok(Status::Success)
}

fn cmd_scan<W: Write>(
    cache: &MatchCache,
    text: &str,
    path: &std::path::Path,
    cli: &Cli,
    out: &mut W,
) -> anyhow::Result<Status> {
    let matcher = RegexMatcher::new(text)?;
    let pattern = cache
        .find_or_create_pattern(text)
        .with_context(|| format!("cannot load pattern {text:?}"))?;

    let config = ScanConfig::with_threads(cli.threads);
    let report = scan_path(&pattern, &matcher, path, &config)
        .with_context(|| format!("scan of {} failed", path.display()))?;

    Ok(finish_scan(pattern.text(), &report, cli.format, out)?)
}

/// Report a finished scan and decide the run's status.
fn finish_scan<W: Write>(
    pattern: &str,
    report: &ScanReport,
    format: OutputFormat,
    out: &mut W,
) -> std::io::Result<Status> {
    for failure in &report.failures {
        eprintln!(
            "{} problems processing file {}: {}",
            "warning:".yellow().bold(),
            failure.path.display(),
            failure.error
        );
    }

    let summary = ScanSummary::new(pattern, report);
    match format {
        OutputFormat::Text => write_scan_summary(out, &summary)?,
        OutputFormat::Json => write_json(out, &summary)?,
    }

    if report.is_success() {
        Ok(Status::Success)
    } else {
        Ok(Status::FileFailures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mgrep_scan::{enumerate, Dispatcher, ScanError};
    use std::fs;
    use std::path::Path;

    fn run(args: &[&str]) -> (anyhow::Result<Status>, String) {
        let mut argv = vec!["mgrep", "--no-sync"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        let result = run_command(&cli, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn s(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn new_store_lists_no_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");
        let (result, out) = run(&[s(&store)]);
        assert_eq!(result.unwrap(), Status::Success);
        assert_eq!(out, "0 PATTERNS PROCESSED\n");
        assert!(store.exists());
    }

    #[test]
    fn showing_unknown_pattern_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");

        let (result, out) = run(&[s(&store), "ERROR"]);
        assert_eq!(result.unwrap(), Status::Success);
        assert_eq!(out, "PATTERN = ERROR\n\t0 file(s) scanned\n files\n");

        let (_, out) = run(&[s(&store)]);
        assert_eq!(out, "1 PATTERNS PROCESSED\nERROR\n");
    }

    #[test]
    fn scan_then_show() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");
        let log = dir.path().join("a.log");
        fs::write(&log, "ok\nERROR: disk full\n").unwrap();

        let (result, out) = run(&[s(&store), "ERROR", s(&log)]);
        assert_eq!(result.unwrap(), Status::Success);
        assert!(out.starts_with("1 file(s) checked"));

        let (_, out) = run(&[s(&store), "ERROR"]);
        let expected = format!(
            "PATTERN = ERROR\n\t1 file(s) scanned\n files\n###############\nFILE = {}\n###############\n*** pattern present in 1 lines ***\n2: ERROR: disk full\n",
            log.display()
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn directory_scan_with_threads() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");
        let tree = dir.path().join("logs");
        fs::create_dir(&tree).unwrap();
        for i in 0..5 {
            fs::write(tree.join(format!("{i}.log")), "ERROR x\n").unwrap();
        }

        let (result, _) = run(&[s(&store), "ERROR", s(&tree), "--nt", "0"]);
        assert_eq!(result.unwrap(), Status::Success);

        let (_, out) = run(&[s(&store), "ERROR", s(&tree), "-t", "3", "--format", "json"]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["files"], 5);
        assert_eq!(value["unchanged"], 5);
    }

    #[test]
    fn invalid_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");
        let missing = dir.path().join("missing");

        let (result, _) = run(&[s(&store), "ERROR", s(&missing)]);
        let err = result.unwrap_err();
        let scan = err.downcast_ref::<ScanError>().unwrap();
        assert!(matches!(scan, ScanError::InvalidInput(_)));
    }

    #[test]
    fn invalid_pattern_is_rejected_before_caching() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");

        let (result, _) = run(&[s(&store), "(open", s(dir.path())]);
        assert!(result.is_err());

        let (_, out) = run(&[s(&store)]);
        assert_eq!(out, "0 PATTERNS PROCESSED\n");
    }

    #[test]
    fn invalid_pattern_is_not_created_when_shown() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("grep.store");

        let (result, out) = run(&[s(&store), "(open"]);
        assert!(result.is_err());
        assert!(out.is_empty());

        let (_, out) = run(&[s(&store)]);
        assert_eq!(out, "0 PATTERNS PROCESSED\n");
    }

    #[test]
    fn vanished_file_ends_with_file_failures() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("logs");
        fs::create_dir(&tree).unwrap();
        for i in 0..10 {
            fs::write(tree.join(format!("{i}.log")), "ERROR x\n").unwrap();
        }
        let cache = MatchCache::open_or_create(
            &dir.path().join("grep.store"),
            StoreConfig::default().with_sync_mode(SyncMode::OsDefault),
        )
        .unwrap();
        let pattern = cache.find_or_create_pattern("ERROR").unwrap();
        let matcher = RegexMatcher::new("ERROR").unwrap();

        let files = enumerate(&tree).unwrap();
        fs::remove_file(&files[3].path).unwrap();
        let report = Dispatcher::new(ScanConfig::with_threads(4))
            .scan_entries(&pattern, &matcher, &files)
            .unwrap();

        let mut out = Vec::new();
        let status = finish_scan("ERROR", &report, OutputFormat::Text, &mut out).unwrap();
        assert_eq!(status, Status::FileFailures);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("10 file(s) checked"), "{out}");
        assert!(out.contains("9 new"), "{out}");
        assert!(out.contains("1 failed"), "{out}");

        let mut out = Vec::new();
        let status = finish_scan("ERROR", &report, OutputFormat::Json, &mut out).unwrap();
        assert_eq!(status, Status::FileFailures);
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["failures"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(Status::Success.code(), 0);
        assert_eq!(Status::FileFailures.code(), 3);
    }

    #[test]
    fn non_store_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("notes.txt");
        fs::write(&bogus, "not a store").unwrap();
        let (result, _) = run(&[s(&bogus)]);
        assert!(result.is_err());
    }
}
