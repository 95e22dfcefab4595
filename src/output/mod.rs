//! Output module
//!
//! Turns a job's flat records into Arrow RecordBatches and writes them out.
//!
//! # Overview
//!
//! - [`records_to_batch`] builds a RecordBatch typed by the job's schema
//! - [`FileSink`] writes CSV, Parquet, or JSON Lines files
//! - [`MemorySink`] keeps tables in memory

mod batch;
mod sink;
mod writer;

pub use batch::{arrow_schema, arrow_type, records_to_batch};
pub use sink::{FileSink, MemorySink, RecordSink, StoredTable};
pub use writer::{
    write_batch, write_csv, write_jsonl, write_parquet, ParquetOptions, DEFAULT_ROW_GROUP_ROWS,
};

#[cfg(test)]
mod tests;
