//! KPI snapshot journal settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// Path of the JSONL snapshot journal. Empty = snapshots stay in memory.
    #[serde(default)]
    pub journal_path: String,
}

impl SnapshotConfig {
    /// Returns `true` when a journal path is set.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !self.journal_path.is_empty()
    }
}
