//! Durable append-only store.
//!
//! # File Layout
//!
//! ```text
//! {data_dir}/
//! └── catalog.log   <- one JSON line per committed batch
//! ```
//!
//! Each line is a [`LogEntry`] carrying a sequence number (starting at 1),
//! a BLAKE3 checksum of the encoded batch, and the batch's writes. A line
//! is only considered committed once its trailing newline is on disk; a
//! final line without one is a torn write and is cut off on open.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{CatalogStore, StoreError, StoreImage, StoreStats, WriteBatch};

/// Name of the log file inside the data directory.
pub const LOG_FILENAME: &str = "catalog.log";

#[derive(Debug, Serialize, Deserialize)]
struct LogEntry {
    seq: u64,
    /// Hex BLAKE3 digest of the batch's JSON encoding.
    checksum: String,
    batch: WriteBatch,
}

impl LogEntry {
    fn new(seq: u64, batch: WriteBatch) -> Result<Self, StoreError> {
        let checksum = batch_checksum(&batch)?;
        Ok(Self {
            seq,
            checksum,
            batch,
        })
    }

    /// Encodes the entry as one log line, newline included.
    fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Recomputes the checksum over the decoded batch.
    fn verify(&self) -> Result<(), String> {
        let actual = batch_checksum(&self.batch).map_err(|e| e.to_string())?;
        if actual != self.checksum {
            return Err(format!(
                "checksum mismatch for batch {}: stored {}, computed {actual}",
                self.seq, self.checksum
            ));
        }
        Ok(())
    }
}

fn batch_checksum(batch: &WriteBatch) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(batch)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

#[cfg(test)]
pub(crate) fn encode_line(seq: u64, batch: WriteBatch) -> Result<Vec<u8>, StoreError> {
    LogEntry::new(seq, batch)?.encode()
}

/// A store that appends every committed batch to a log file and replays
/// the log on open.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    file: File,
    image: StoreImage,
    /// Sequence number of the next batch.
    next_seq: u64,
    /// Length of the committed prefix of the file.
    len: u64,
    fsync: bool,
}

impl LogStore {
    /// Opens (or creates) the log in `data_dir` and replays it.
    ///
    /// With `fsync` set, every commit is synced to disk before it is
    /// acknowledged.
    pub fn open(data_dir: impl AsRef<Path>, fsync: bool) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOG_FILENAME);

        let contents = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let replayed = replay(&contents)?;

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        if replayed.len < contents.len() as u64 {
            warn!(
                path = %path.display(),
                committed = replayed.len,
                torn = contents.len() as u64 - replayed.len,
                "discarding torn trailing batch"
            );
            file.set_len(replayed.len)?;
        }

        info!(
            path = %path.display(),
            batches = replayed.next_seq - 1,
            collections = replayed.image.collection_count(),
            records = replayed.image.record_count(),
            tags = replayed.image.tag_count(),
            "catalog log opened"
        );

        Ok(Self {
            path,
            file,
            image: replayed.image,
            next_seq: replayed.next_seq,
            len: replayed.len,
            fsync,
        })
    }

    /// Returns the path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &[u8]) -> Result<(), StoreError> {
        self.file.write_all(line)?;
        if self.fsync {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

impl CatalogStore for LogStore {
    fn commit(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        // Rejected batches never reach the file
        self.image.check(&batch)?;

        let entry = LogEntry::new(self.next_seq, batch)?;
        let line = entry.encode()?;

        if let Err(e) = self.write_line(&line) {
            warn!(seq = entry.seq, error = %e, "log append failed, rolling back");
            if let Err(truncate) = self.file.set_len(self.len) {
                error!(seq = entry.seq, error = %truncate, "failed to truncate partial append");
            }
            return Err(e);
        }

        self.len += line.len() as u64;
        self.next_seq += 1;
        debug!(seq = entry.seq, ops = entry.batch.len(), bytes = line.len(), "batch committed");
        self.image.apply(entry.batch);

        Ok(())
    }

    fn image(&self) -> &StoreImage {
        &self.image
    }

    fn stats(&self) -> StoreStats {
        StoreStats::from_image(&self.image, self.next_seq - 1)
    }
}

struct Replayed {
    image: StoreImage,
    next_seq: u64,
    len: u64,
}

/// Rebuilds the image from log contents.
///
/// Stops at a trailing line without a newline. Any other line that fails
/// to decode or to verify its checksum is corruption, as is a break in the
/// sequence or a constraint violation.
fn replay(contents: &[u8]) -> Result<Replayed, StoreError> {
    let mut image = StoreImage::new();
    let mut next_seq = 1;
    let mut len = 0usize;

    for (index, line) in contents.split_inclusive(|b| *b == b'\n').enumerate() {
        let Some(body) = line.strip_suffix(b"\n") else {
            break;
        };
        let line_no = index + 1;

        let entry: LogEntry = serde_json::from_slice(body).map_err(|e| StoreError::Corrupt {
            line: line_no,
            reason: e.to_string(),
        })?;
        entry.verify().map_err(|reason| StoreError::Corrupt {
            line: line_no,
            reason,
        })?;
        if entry.seq != next_seq {
            return Err(StoreError::Corrupt {
                line: line_no,
                reason: format!("expected batch {next_seq}, found {}", entry.seq),
            });
        }
        image
            .check_and_apply(entry.batch)
            .map_err(|e| StoreError::Corrupt {
                line: line_no,
                reason: e.to_string(),
            })?;

        next_seq += 1;
        len += line.len();
    }

    Ok(Replayed {
        image,
        next_seq,
        len: len as u64,
    })
}
