//! JSONL KPI snapshot journal.
//!
//! Every `put_snapshot` appends the whole `KpiSnapshot` as one line. Replay
//! reads the file top to bottom and keeps the last line per
//! `(month, project_filter)`, so concurrent writers for one key resolve
//! last-write-wins without any merge.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempo_config::SnapshotConfig;
use tempo_core::kpi::KpiSnapshot;
use tempo_core::month::Month;

use crate::error::StoreError;

/// Append-only snapshot log backed by a single `.jsonl` file.
#[derive(Debug, Clone)]
pub struct SnapshotJournal {
    path: PathBuf,
}

impl SnapshotJournal {
    /// Open a journal at `path`, creating the parent directory if needed.
    ///
    /// The file itself is created lazily on first append.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the parent directory cannot be created.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Open the journal named by `[snapshots] journal_path`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the parent directory cannot be created.
    pub fn from_config(config: &SnapshotConfig) -> Result<Option<Self>, StoreError> {
        if !config.is_configured() {
            return Ok(None);
        }
        Self::new(&config.journal_path).map(Some)
    }

    /// Append one snapshot as a JSON line.
    ///
    /// A torn final line left by an interrupted write is terminated first,
    /// so the new snapshot always starts on a line of its own.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the write fails.
    pub fn append(&self, snapshot: &KpiSnapshot) -> Result<(), StoreError> {
        self.terminate_last_line()?;
        serde_jsonlines::append_json_lines(&self.path, [snapshot])?;
        Ok(())
    }

    fn terminate_last_line(&self) -> Result<(), StoreError> {
        let mut file = match OpenOptions::new().read(true).append(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if file.metadata()?.len() == 0 {
            return Ok(());
        }
        let mut last = [0_u8; 1];
        file.seek(SeekFrom::End(-1))?;
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            tracing::warn!(
                path = %self.path.display(),
                "terminating torn snapshot journal line"
            );
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Read every snapshot, keeping the last write per key.
    ///
    /// A missing file replays as empty. Lines that fail to deserialize,
    /// including a final line cut off mid-write, are skipped with a warning
    /// so one bad write cannot hide the other snapshots.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` for read failures other than bad lines.
    pub fn replay(&self) -> Result<BTreeMap<(Month, String), KpiSnapshot>, StoreError> {
        let mut latest = BTreeMap::new();
        if !self.path.exists() {
            return Ok(latest);
        }

        let lines = serde_jsonlines::json_lines::<KpiSnapshot, _>(&self.path)?;
        for (index, line) in lines.enumerate() {
            match line {
                Ok(snapshot) => {
                    latest.insert(snapshot.key(), snapshot);
                }
                Err(e) if is_unreadable_line(&e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        error = %e,
                        "skipping unreadable snapshot journal line"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(latest)
    }

    /// Rewrite the journal with only the latest snapshot per key.
    ///
    /// Returns the number of snapshots kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the journal cannot be read or rewritten.
    pub fn compact(&self) -> Result<usize, StoreError> {
        let latest = self.replay()?;
        serde_jsonlines::write_json_lines(&self.path, latest.values())?;
        tracing::debug!(
            path = %self.path.display(),
            kept = latest.len(),
            "compacted snapshot journal"
        );
        Ok(latest.len())
    }

    /// The journal file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A line that does not parse as JSON, or stops mid-value.
fn is_unreadable_line(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::InvalidData | ErrorKind::UnexpectedEof)
}
