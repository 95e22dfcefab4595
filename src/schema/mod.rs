//! Output schema module
//!
//! Every record produced within one job shares the job's [`TableSchema`], so
//! tabular writers can union records without schema drift.

mod catalog;
mod types;

pub use catalog::{
    ad_metadata_schema, insight_column_kind, insight_schema, AD_METADATA_COLUMNS,
    AD_METADATA_FIELDS, DEFAULT_INSIGHT_FIELDS, PLACEMENT_BREAKDOWNS,
};
pub use types::{Column, ColumnKind, TableSchema};
