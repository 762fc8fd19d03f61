//! # Offline Snapshot
//!
//! Caches the last successfully fetched constellation, task list, and
//! sample cards for replay when connectivity is unavailable. The snapshot
//! lives in memory for the canvas lifetime and can optionally persist to a
//! data directory as JSON under fixed keys.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::model::{ConstellationEdge, ConstellationNode, SampleCard, TaskItem};

/// Fixed storage key for the combined snapshot.
pub const SNAPSHOT_KEY: &str = "spark_offline_snapshot";

/// Content cached for offline replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfflineSnapshot {
    /// Constellation topic nodes.
    pub nodes: Vec<ConstellationNode>,
    /// Constellation edges.
    pub edges: Vec<ConstellationEdge>,
    /// Task list for the orbit menu.
    pub tasks: Vec<TaskItem>,
    /// Content cards to replay.
    pub sample_cards: Vec<SampleCard>,
    /// When the snapshot was captured (ms since epoch).
    pub captured_at_ms: u64,
}

impl OfflineSnapshot {
    /// Serialize the snapshot to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Serialization)
    }

    /// Deserialize a snapshot from persisted JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(CoreError::Serialization)
    }
}

/// In-memory snapshot store with optional filesystem persistence.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshot: Option<OfflineSnapshot>,
    data_dir: Option<PathBuf>,
}

impl SnapshotStore {
    /// Create a store with no persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store persisting to `data_dir`. The directory is created
    /// if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> CoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self {
            snapshot: None,
            data_dir: Some(data_dir),
        })
    }

    /// Store a snapshot, persisting it when a data directory is set.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the in-memory copy is kept
    /// either way.
    pub fn save(&mut self, snapshot: OfflineSnapshot) -> CoreResult<()> {
        self.snapshot = Some(snapshot);

        if let (Some(dir), Some(snapshot)) = (&self.data_dir, &self.snapshot) {
            let path = dir.join(format!("{SNAPSHOT_KEY}.json"));
            let json = snapshot.to_json()?;
            fs::write(&path, json)?;
            tracing::debug!("Offline snapshot persisted to {}", path.display());
        }

        Ok(())
    }

    /// The latest snapshot, reading back the persisted copy when memory is
    /// empty. A corrupt persisted file degrades to `None`.
    pub fn load(&mut self) -> Option<&OfflineSnapshot> {
        if self.snapshot.is_none() {
            self.snapshot = self.load_persisted();
        }
        self.snapshot.as_ref()
    }

    /// Whether a snapshot is available in memory.
    #[must_use]
    pub const fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Drop the in-memory snapshot (persisted copy is untouched).
    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    fn load_persisted(&self) -> Option<OfflineSnapshot> {
        let dir = self.data_dir.as_ref()?;
        let path = dir.join(format!("{SNAPSHOT_KEY}.json"));
        let json = fs::read_to_string(&path).ok()?;
        match OfflineSnapshot::from_json(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Discarding corrupt offline snapshot: {e}");
                None
            }
        }
    }
}
