//! On-disk layout of a store file.
//!
//! ```text
//! [8 bytes: magic "MGREPSTO"]
//! [4 bytes: format version (little-endian u32)]
//! [4 bytes: layout name length (little-endian u32)]
//! [N bytes: layout name (UTF-8)]
//! then zero or more frames:
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized record)]
//! ```

use std::io::{self, Read};
use std::path::Path;

use mgrep_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::transaction::Op;

pub(crate) const MAGIC: &[u8; 8] = b"MGREPSTO";
pub(crate) const FORMAT_VERSION: u32 = 1;
pub(crate) const FRAME_HEADER_SIZE: u64 = 8;

const MAX_LAYOUT_LEN: u32 = 4096;

/// Largest payload a frame's length field can describe.
pub(crate) const MAX_FRAME_PAYLOAD: u64 = u32::MAX as u64;

/// A committed transaction.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CommitRecord<T> {
    pub seq: u64,
    pub next_id: u64,
    pub ops: Vec<Op<T>>,
}

/// Full image of the live objects, written by compaction.
#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotRecord<T> {
    pub seq: u64,
    pub next_id: u64,
    pub objects: Vec<(ObjectId, T)>,
}

/// Borrowing twin of [`SnapshotRecord`]; serializes to identical bytes.
#[derive(Serialize)]
pub(crate) struct SnapshotView<'a, T> {
    pub seq: u64,
    pub next_id: u64,
    pub objects: Vec<(ObjectId, &'a T)>,
}

/// Record as read back from disk.
#[derive(Debug, Deserialize)]
pub(crate) enum Record<T> {
    Snapshot(SnapshotRecord<T>),
    Commit(CommitRecord<T>),
}

/// Record as written; variant order must match [`Record`].
#[derive(Serialize)]
pub(crate) enum RecordRef<'a, T> {
    Snapshot(SnapshotView<'a, T>),
    Commit(&'a CommitRecord<T>),
}

pub(crate) fn encode_record<T: Serialize>(record: &RecordRef<'_, T>) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(crate) fn decode_record<T: for<'de> Deserialize<'de>>(payload: &[u8]) -> StoreResult<Record<T>> {
    bincode::deserialize(payload).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(crate) fn encode_header(layout: &str) -> StoreResult<Vec<u8>> {
    let layout_len = u32::try_from(layout.len())
        .ok()
        .filter(|len| *len <= MAX_LAYOUT_LEN)
        .ok_or(StoreError::LayoutTooLong {
            len: layout.len(),
            max: MAX_LAYOUT_LEN as usize,
        })?;

    let mut buf = Vec::with_capacity(16 + layout.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&layout_len.to_le_bytes());
    buf.extend_from_slice(layout.as_bytes());
    Ok(buf)
}

/// Validate the header and return its length in bytes.
pub(crate) fn read_header<R: Read>(reader: &mut R, path: &Path, expected_layout: &str) -> StoreResult<u64> {
    let mut fixed = [0u8; 16];
    match reader.read_exact(&mut fixed) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(StoreError::NotAStore(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }

    if &fixed[..8] != MAGIC {
        return Err(StoreError::NotAStore(path.to_path_buf()));
    }

    let version = u32::from_le_bytes([fixed[8], fixed[9], fixed[10], fixed[11]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            expected: FORMAT_VERSION,
            found: version,
        });
    }

    let layout_len = u32::from_le_bytes([fixed[12], fixed[13], fixed[14], fixed[15]]);
    if layout_len > MAX_LAYOUT_LEN {
        return Err(StoreError::NotAStore(path.to_path_buf()));
    }

    let mut layout = vec![0u8; layout_len as usize];
    match reader.read_exact(&mut layout) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(StoreError::NotAStore(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    }

    let found = String::from_utf8_lossy(&layout).into_owned();
    if found != expected_layout {
        return Err(StoreError::LayoutMismatch {
            expected: expected_layout.to_string(),
            found,
        });
    }

    Ok(16 + layout_len as u64)
}

/// Checked length field for a payload of `len` bytes.
pub(crate) fn frame_length(len: usize) -> StoreResult<u32> {
    u32::try_from(len).map_err(|_| StoreError::FrameTooLarge {
        len: len as u64,
        max: MAX_FRAME_PAYLOAD,
    })
}

pub(crate) fn encode_frame(payload: &[u8]) -> StoreResult<Vec<u8>> {
    let length = frame_length(payload.len())?;
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE as usize + payload.len());
    buf.extend_from_slice(&length.to_le_bytes());
    buf.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Outcome of reading one frame during recovery.
#[derive(Debug)]
pub(crate) enum FrameRead {
    /// A complete frame whose CRC checked out.
    Frame(Vec<u8>),
    /// Clean end of file.
    End,
    /// The frame at this offset is incomplete or corrupt.
    Torn(&'static str),
}

/// Read the frame starting at `offset`. `file_len` bounds every read so a
/// garbage length never triggers a huge allocation.
pub(crate) fn read_frame<R: Read>(reader: &mut R, offset: u64, file_len: u64) -> io::Result<FrameRead> {
    if offset == file_len {
        return Ok(FrameRead::End);
    }
    if offset + FRAME_HEADER_SIZE > file_len {
        return Ok(FrameRead::Torn("truncated frame header"));
    }

    let mut header = [0u8; FRAME_HEADER_SIZE as usize];
    reader.read_exact(&mut header)?;
    let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    if length == 0 || offset + FRAME_HEADER_SIZE + length as u64 > file_len {
        return Ok(FrameRead::Torn("invalid frame length"));
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload)?;

    if crc32fast::hash(&payload) != expected_crc {
        return Ok(FrameRead::Torn("crc mismatch"));
    }

    Ok(FrameRead::Frame(payload))
}
