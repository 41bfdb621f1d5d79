//! Directory enumeration.

use std::io;
use std::path::{Path, PathBuf};

use mgrep_types::Mtime;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ScanError, ScanResult};

/// A regular file found under a scan root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub mtime: Mtime,
}

impl FileEntry {
    /// Stat `path` and build an entry from its modification time.
    pub fn stat(path: &Path) -> ScanResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|source| ScanError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            mtime: mtime_of(path, &metadata)?,
        })
    }
}

/// List every regular file under `root`, depth first.
///
/// Symbolic links are followed; entries that vanish or dangle while the walk
/// is in progress are skipped. Any other traversal error aborts the walk and
/// no partial list is returned.
pub fn enumerate(root: &Path) -> ScanResult<Vec<FileEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() > 0 && is_not_found(&err) => {
                debug!(path = ?err.path(), "skipping vanished entry");
                continue;
            }
            Err(err) => {
                let dir = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                return Err(ScanError::EnumerationFailed {
                    dir,
                    source: err.into(),
                });
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(|err| ScanError::EnumerationFailed {
            dir: entry.path().to_path_buf(),
            source: err.into(),
        })?;
        files.push(FileEntry {
            mtime: mtime_of(entry.path(), &metadata)?,
            path: entry.into_path(),
        });
    }

    debug!(root = %root.display(), files = files.len(), "enumerated tree");
    Ok(files)
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound)
}

fn mtime_of(path: &Path, metadata: &std::fs::Metadata) -> ScanResult<Mtime> {
    let modified = metadata.modified().map_err(|source| ScanError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Mtime::from_system_time(modified).map_err(|source| ScanError::Timestamp {
        path: path.to_path_buf(),
        source,
    })
}
