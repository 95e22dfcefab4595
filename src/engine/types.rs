//! Engine types
//!
//! Per-job status and the report of a whole run.

use crate::error::{Error, ErrorKind};
use serde::Serialize;
use std::time::Duration;

/// Lifecycle of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobStatus {
    /// Not started
    Pending,
    /// In progress
    Running,
    /// Finished; zero rows means the source had no data
    Succeeded {
        /// Rows handed to the sink
        rows: usize,
    },
    /// Extraction, flattening, or writing failed
    Failed {
        /// Human-readable cause
        cause: String,
        /// Failure classification
        kind: ErrorKind,
        /// Whether the API rejected a breakdown combination
        breakdown_rejected: bool,
    },
}

impl JobStatus {
    /// Failed status for an error
    pub fn failed(error: &Error) -> Self {
        Self::Failed {
            cause: error.to_string(),
            kind: error.kind(),
            breakdown_rejected: error.is_breakdown_rejection(),
        }
    }

    /// Check if the job finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Check if the job succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Rows written, if the job succeeded
    pub fn rows(&self) -> Option<usize> {
        match self {
            Self::Succeeded { rows } => Some(*rows),
            _ => None,
        }
    }
}

/// Result of one job in a run
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    /// Job name
    pub name: String,
    /// Destination identifier
    pub destination: String,
    /// Final status
    pub status: JobStatus,
    /// Pages fetched by the last attempt
    pub pages: usize,
    /// Attempts made
    pub attempts: u32,
    /// Wall time across all attempts
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl JobOutcome {
    /// Rows written, if the job succeeded
    pub fn rows(&self) -> Option<usize> {
        self.status.rows()
    }
}

/// Outcomes of every job in a run, in execution order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Per-job outcomes
    pub jobs: Vec<JobOutcome>,
}

impl RunReport {
    /// Outcome of the named job
    pub fn job(&self, name: &str) -> Option<&JobOutcome> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Jobs that succeeded
    pub fn succeeded(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs.iter().filter(|j| j.status.is_success())
    }

    /// Jobs that failed
    pub fn failed(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs.iter().filter(|j| !j.status.is_success())
    }

    /// Check if every job succeeded
    pub fn all_succeeded(&self) -> bool {
        self.jobs.iter().all(|j| j.status.is_success())
    }

    /// Total rows written across jobs
    pub fn total_rows(&self) -> usize {
        self.jobs.iter().filter_map(JobOutcome::rows).sum()
    }
}
