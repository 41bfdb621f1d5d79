//! Incremental per-file scanning.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use mgrep_cache::PatternHandle;
use mgrep_types::{MatchedLine, Mtime};
use tracing::{debug, trace};

use crate::error::{ScanError, ScanResult};
use crate::matcher::Matcher;

/// What [`scan_file`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The stored mtime matched; nothing was read or written.
    Unchanged,
    /// The file was read and its record replaced.
    Scanned {
        matches: usize,
        /// `true` if the record was created by this call.
        created: bool,
    },
}

/// Bring `path`'s record under `pattern` up to date with `mtime`.
///
/// A record whose stored mtime equals `mtime` is left alone. Otherwise the
/// file is read in full and the new line set and mtime are committed in one
/// transaction. If the file cannot be read the record keeps its previous
/// state.
pub fn scan_file(
    pattern: &PatternHandle<'_>,
    matcher: &dyn Matcher,
    path: &Path,
    mtime: Mtime,
) -> ScanResult<ScanOutcome> {
    let key = path.to_string_lossy();
    let slot = pattern.find_or_create_file(&key)?;
    if !slot.created && slot.mtime == mtime {
        trace!(path = %key, "unchanged");
        return Ok(ScanOutcome::Unchanged);
    }

    let unreadable = |source| ScanError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    let lines = collect_matches(BufReader::new(file), matcher).map_err(unreadable)?;

    let matches = lines.len();
    let seq = pattern.stage_scan(slot.id, mtime, lines)?.commit()?;
    debug!(path = %key, matches, seq, "scanned");

    Ok(ScanOutcome::Scanned {
        matches,
        created: slot.created,
    })
}

/// Run `matcher` over every line of `reader`, numbering from 1.
///
/// Lines are split on `\n` only; invalid UTF-8 is replaced rather than
/// rejected.
fn collect_matches<R: BufRead>(mut reader: R, matcher: &dyn Matcher) -> io::Result<Vec<MatchedLine>> {
    let mut matches = Vec::new();
    let mut buf = Vec::new();
    let mut line_number = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_number += 1;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }

        let text = String::from_utf8_lossy(&buf);
        if matcher.is_match(&text) {
            matches.push(MatchedLine {
                line_number,
                text: text.into_owned(),
            });
        }
    }

    Ok(matches)
}
