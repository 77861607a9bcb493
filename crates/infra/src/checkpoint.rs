//! Run-log backed checkpoint store
//!
//! The checkpoint file is an append-only run log. Each line starts with a
//! `YYYY-mm-dd HH:MM:SS,mmm` timestamp followed by ` - <LEVEL> - <message>`;
//! the timestamp on the last non-empty line is the previous run's cutoff.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calsync_core::CheckpointStore;
use calsync_domain::{CalSyncError, Result};
use chrono::NaiveDateTime;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::errors::InfraError;

const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";
const FIELD_SEPARATOR: &str = " - ";

/// [`CheckpointStore`] reading and appending a plain-text run log.
#[derive(Debug, Clone)]
pub struct LogCheckpointStore {
    path: PathBuf,
}

impl LogCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Timestamp of the last non-empty line of a run log.
fn parse_last_line(contents: &str) -> Result<NaiveDateTime> {
    let line = contents
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| CalSyncError::NoCheckpoint("run log is empty".into()))?;

    let stamp = line.split_once(FIELD_SEPARATOR).map_or(line, |(stamp, _)| stamp);
    NaiveDateTime::parse_from_str(stamp.trim(), LOG_TIMESTAMP_FORMAT).map_err(|e| {
        CalSyncError::NoCheckpoint(format!("cannot parse run log timestamp {stamp:?}: {e}"))
    })
}

#[async_trait]
impl CheckpointStore for LogCheckpointStore {
    async fn last_checkpoint(&self) -> Result<NaiveDateTime> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CalSyncError::NoCheckpoint(format!(
                    "run log {} does not exist",
                    self.path.display()
                )));
            }
            Err(e) => return Err(InfraError::from(e).into()),
        };

        let checkpoint = parse_last_line(&contents)?;
        debug!(path = %self.path.display(), %checkpoint, "read checkpoint");
        Ok(checkpoint)
    }

    async fn record_checkpoint(&self, cutoff: NaiveDateTime) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let line = format!(
            "{}{sep}INFO{sep}reconciliation run complete\n",
            cutoff.format(LOG_TIMESTAMP_FORMAT),
            sep = FIELD_SEPARATOR
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(InfraError::from)?;
        file.write_all(line.as_bytes()).await.map_err(InfraError::from)?;
        file.flush().await.map_err(InfraError::from)?;

        info!(path = %self.path.display(), %cutoff, "recorded checkpoint");
        Ok(())
    }
}
