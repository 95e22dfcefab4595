// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # ads-extract
//!
//! Extracts ad metadata and insight reports from a Graph-API-style ad account
//! and writes them as flat tables.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Follows `paging.next` continuation URLs lazily
//! - **Creative Flattening**: Link, carousel, and video creatives mapped to fixed columns
//! - **Per-Job Isolation**: A rejected breakdown fails one job, never the run
//! - **Arrow Output**: CSV, Parquet, or JSON Lines files via Arrow
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ads_extract::{ExtractorConfig, FileSink, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> ads_extract::Result<()> {
//!     let config = ExtractorConfig::from_file("ads.yaml")?.with_env();
//!     let ctx = config.resolve_now()?;
//!
//!     let sink = FileSink::new(&config.output_dir, config.format);
//!     let report = Orchestrator::from_context(ctx, None)?
//!         .run(&config.jobs(), &sink)
//!         .await;
//!
//!     for job in report.failed() {
//!         eprintln!("{} failed: {:?}", job.name, job.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Orchestrator (engine)                     │
//! │   for each job: request → pages → records → sink.write()     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬─────────────────┼───────────────┬───────────────┐
//! │   HTTP    │   Paginate      │   Flatten     │   Output      │
//! ├───────────┼─────────────────┼───────────────┼───────────────┤
//! │ GET       │ paging.next     │ Ad creatives  │ CSV           │
//! │ Rate Limit│ Page delay      │ Insight rows  │ Parquet       │
//! │ Bearer    │ Lazy stream     │ Fixed schemas │ JSON Lines    │
//! └───────────┴─────────────────┴───────────────┴───────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and failure taxonomy
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with rate limiting
pub mod http;

/// Page envelope and error body decoding
pub mod decode;

/// Cursor pagination
pub mod pagination;

/// Output column sets
pub mod schema;

/// Record flattening
pub mod flatten;

/// Arrow output and record sinks
pub mod output;

/// Job orchestration
pub mod engine;

/// Configuration and API context
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{ApiContext, ExtractorConfig};
pub use engine::{ExtractionJob, JobStatus, Orchestrator, RunReport};
pub use output::{FileSink, MemorySink, RecordSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
