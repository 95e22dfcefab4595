//! Record sinks
//!
//! A job hands its complete record set to a [`RecordSink`] under a destination
//! identifier. Writing is all-or-nothing per destination from the job's point
//! of view: a sink error fails the job.

use super::batch::records_to_batch;
use super::writer::write_batch;
use crate::error::{Error, Result};
use crate::flatten::FlatRecord;
use crate::schema::TableSchema;
use crate::types::OutputFormat;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Destination for the records of one job
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write `records` to `destination`, replacing any previous contents
    ///
    /// Returns the number of rows written.
    async fn write(
        &self,
        destination: &str,
        schema: &TableSchema,
        records: &[FlatRecord],
    ) -> Result<usize>;
}

// ============================================================================
// File Sink
// ============================================================================

/// Writes each destination to `{dir}/{destination}.{ext}`
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Create a sink writing `format` files into `dir`
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Path a destination is written to
    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir
            .join(format!("{destination}.{}", self.format.extension()))
    }
}

#[async_trait]
impl RecordSink for FileSink {
    async fn write(
        &self,
        destination: &str,
        schema: &TableSchema,
        records: &[FlatRecord],
    ) -> Result<usize> {
        if destination.is_empty() || destination.contains(['/', '\\']) {
            return Err(Error::output(format!(
                "Invalid destination name '{destination}'"
            )));
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let batch = records_to_batch(schema, records)?;
        let path = self.path_for(destination);
        let rows = write_batch(&path, &batch, self.format)?;

        info!(path = %path.display(), rows, "Wrote output file");
        Ok(rows)
    }
}

// ============================================================================
// Memory Sink
// ============================================================================

/// A table held by [`MemorySink`]
#[derive(Debug, Clone)]
pub struct StoredTable {
    /// Schema the records were written with
    pub schema: TableSchema,
    /// Records in write order
    pub records: Vec<FlatRecord>,
}

/// Keeps written tables in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: Arc<RwLock<HashMap<String, StoredTable>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Table written to `destination`, if any
    pub async fn table(&self, destination: &str) -> Option<StoredTable> {
        self.tables.read().await.get(destination).cloned()
    }

    /// Names of all written destinations, sorted
    pub async fn destinations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write(
        &self,
        destination: &str,
        schema: &TableSchema,
        records: &[FlatRecord],
    ) -> Result<usize> {
        self.tables.write().await.insert(
            destination.to_string(),
            StoredTable {
                schema: schema.clone(),
                records: records.to_vec(),
            },
        );
        Ok(records.len())
    }
}
