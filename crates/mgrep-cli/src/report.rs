//! Text and JSON renderings of cache contents and scan results.

use std::io::{self, Write};

use mgrep_cache::FileRecord;
use mgrep_scan::ScanReport;
use mgrep_types::MatchedLine;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PatternList<'a> {
    pub count: usize,
    pub patterns: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct PatternReport<'a> {
    pub pattern: &'a str,
    pub files: Vec<FileReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub path: &'a str,
    pub scanned: bool,
    pub lines: &'a [MatchedLine],
}

impl<'a> PatternReport<'a> {
    /// `files` is expected most recent first, as returned by the cache.
    pub fn new(pattern: &'a str, files: &'a [FileRecord]) -> Self {
        Self {
            pattern,
            files: files
                .iter()
                .map(|f| FileReport {
                    path: &f.path,
                    scanned: !f.mtime.is_unscanned(),
                    lines: &f.lines,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanSummary<'a> {
    pub pattern: &'a str,
    pub files: usize,
    pub created: usize,
    pub rescanned: usize,
    pub unchanged: usize,
    pub matches: usize,
    pub failures: Vec<FailureReport>,
}

#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub path: String,
    pub error: String,
}

impl<'a> ScanSummary<'a> {
    pub fn new(pattern: &'a str, report: &ScanReport) -> Self {
        Self {
            pattern,
            files: report.files(),
            created: report.created,
            rescanned: report.rescanned,
            unchanged: report.unchanged,
            matches: report.matches,
            failures: report
                .failures
                .iter()
                .map(|f| FailureReport {
                    path: f.path.display().to_string(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

// ---- text ----

pub fn write_pattern_list<W: Write>(out: &mut W, list: &PatternList<'_>) -> io::Result<()> {
    writeln!(out, "{} PATTERNS PROCESSED", list.count)?;
    for pattern in list.patterns {
        writeln!(out, "{pattern}")?;
    }
    Ok(())
}

pub fn write_pattern<W: Write>(out: &mut W, report: &PatternReport<'_>) -> io::Result<()> {
    writeln!(out, "PATTERN = {}", report.pattern)?;
    writeln!(out, "\t{} file(s) scanned", report.files.len())?;
    writeln!(out, " files")?;
    for file in &report.files {
        writeln!(out, "###############")?;
        writeln!(out, "FILE = {}", file.path)?;
        writeln!(out, "###############")?;
        writeln!(out, "*** pattern present in {} lines ***", file.lines.len())?;
        for line in file.lines.iter().rev() {
            writeln!(out, "{}: {}", line.line_number, line.text)?;
        }
    }
    Ok(())
}

pub fn write_scan_summary<W: Write>(out: &mut W, summary: &ScanSummary<'_>) -> io::Result<()> {
    writeln!(
        out,
        "{} file(s) checked for {:?}: {} new, {} rescanned, {} unchanged, {} failed, {} matching line(s)",
        summary.files,
        summary.pattern,
        summary.created,
        summary.rescanned,
        summary.unchanged,
        summary.failures.len(),
        summary.matches
    )
}

// ---- json ----

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}
