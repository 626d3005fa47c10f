//! Durable checkpoint record
//!
//! The record is a small JSON document written atomically (temp file and
//! rename) when a run is interrupted or fails, read at startup, and deleted
//! once a campaign finishes.

use crate::state::CampaignCheckpoint;
use crate::storage::traits::{CheckpointError, CheckpointResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Identifies the inputs a checkpoint was taken against, so a resume can
/// tell when they changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointLabels {
    pub modifier_file: String,
    pub output_file: String,
    pub config_hash: Option<String>,
}

/// The on-disk form of a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    #[serde(flatten)]
    pub position: CampaignCheckpoint,

    pub modifier_file: String,

    pub output_file: String,

    #[serde(default)]
    pub config_hash: Option<String>,

    pub saved_at: DateTime<Utc>,

    #[serde(default)]
    pub message: String,
}

impl CheckpointRecord {
    /// Captures `position` together with the labels of the current run
    pub fn new(position: &CampaignCheckpoint, labels: &CheckpointLabels) -> Self {
        Self {
            position: position.clone(),
            modifier_file: labels.modifier_file.clone(),
            output_file: labels.output_file.clone(),
            config_hash: labels.config_hash.clone(),
            saved_at: Utc::now(),
            message: "Run was interrupted. Re-run to resume from this point.".to_string(),
        }
    }

    /// Checks the fields a resume depends on
    pub fn validate(&self) -> CheckpointResult<()> {
        if self.position.seed_query.trim().is_empty() {
            return Err(CheckpointError::Invalid("seed query is empty".to_string()));
        }
        if self.position.query_text.trim().is_empty() {
            return Err(CheckpointError::Invalid("query text is empty".to_string()));
        }
        if self.position.next_page < 1 {
            return Err(CheckpointError::Invalid(format!(
                "next page must be >= 1, got {}",
                self.position.next_page
            )));
        }
        Ok(())
    }
}

/// Reads, writes, and removes the checkpoint file
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads and validates the checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No checkpoint file exists
    /// * `Ok(Some(record))` - A valid checkpoint
    /// * `Err(CheckpointError)` - The file is unreadable, malformed, or invalid
    pub fn load(&self) -> CheckpointResult<Option<CheckpointRecord>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: CheckpointRecord = serde_json::from_str(&content)?;
        record.validate()?;
        Ok(Some(record))
    }

    /// Loads the checkpoint, discarding it if it cannot be used
    ///
    /// Malformed or invalid records are deleted so the next run starts
    /// fresh. Read errors are logged and leave the file in place.
    pub fn load_or_discard(&self) -> Option<CheckpointRecord> {
        match self.load() {
            Ok(record) => record,
            Err(CheckpointError::Io(e)) => {
                tracing::warn!(
                    "Could not read checkpoint {}: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    "Checkpoint {} is unusable ({}). Starting fresh.",
                    self.path.display(),
                    e
                );
                if let Err(e) = self.clear() {
                    tracing::warn!("Could not remove {}: {}", self.path.display(), e);
                }
                None
            }
        }
    }

    /// Writes the checkpoint atomically
    pub fn save(&self, record: &CheckpointRecord) -> CheckpointResult<()> {
        let json = serde_json::to_string_pretty(record)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    /// Removes the checkpoint file
    ///
    /// Returns true if a file was removed.
    pub fn clear(&self) -> CheckpointResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
