//! Fixed column sets for the ad metadata and insight reports

use super::types::{Column, ColumnKind, TableSchema};

/// Output columns of a flattened ad metadata record, in order
pub const AD_METADATA_COLUMNS: &[&str] = &[
    "ad_id",
    "ad_name",
    "ad_status",
    "ad_effective_status",
    "ad_created_time",
    "ad_updated_time",
    "adset_id",
    "adset_name",
    "campaign_id",
    "campaign_name",
    "creative_id",
    "creative_name",
    "thumbnail_url",
    "effective_object_story_id",
    "primary_text",
    "headline",
    "description",
    "display_link",
    "caption",
    "call_to_action_type",
    "image_hash",
    "carousel_headline_first",
    "carousel_desc_first",
    "carousel_json",
    "video_description",
    "video_call_to_action_type",
];

/// Fields requested for the ad metadata report
pub const AD_METADATA_FIELDS: &[&str] = &[
    "id",
    "name",
    "status",
    "effective_status",
    "created_time",
    "updated_time",
    "adset{id,name}",
    "campaign{id,name}",
    "creative{id,name,thumbnail_url,effective_object_story_id,object_story_spec}",
];

/// Fields requested for insight reports unless a job overrides them
pub const DEFAULT_INSIGHT_FIELDS: &[&str] = &[
    "date_start",
    "date_stop",
    "campaign_id",
    "campaign_name",
    "adset_id",
    "adset_name",
    "ad_id",
    "ad_name",
    "impressions",
    "reach",
    "clicks",
    "unique_clicks",
    "inline_link_clicks",
    "spend",
    "cpc",
    "ctr",
    "cpm",
];

/// Breakdown dimensions of the placement report
pub const PLACEMENT_BREAKDOWNS: &[&str] =
    &["publisher_platform", "platform_position", "device_platform"];

const INTEGER_METRICS: &[&str] = &[
    "impressions",
    "reach",
    "clicks",
    "unique_clicks",
    "inline_link_clicks",
    "unique_inline_link_clicks",
];

const FLOAT_METRICS: &[&str] = &[
    "spend",
    "cpc",
    "ctr",
    "cpm",
    "cpp",
    "frequency",
    "unique_ctr",
    "cost_per_inline_link_click",
    "inline_link_click_ctr",
];

/// Storage type of an insight field
///
/// Known metrics are numeric; everything else, including breakdowns, is text.
pub fn insight_column_kind(field: &str) -> ColumnKind {
    if INTEGER_METRICS.contains(&field) {
        ColumnKind::Integer
    } else if FLOAT_METRICS.contains(&field) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

/// Schema of the flattened ad metadata report
pub fn ad_metadata_schema() -> TableSchema {
    TableSchema::new(AD_METADATA_COLUMNS.iter().map(|name| Column::text(*name)))
}

/// Schema of an insight report: requested fields followed by breakdown dimensions
pub fn insight_schema(fields: &[String], breakdowns: &[String]) -> TableSchema {
    TableSchema::new(
        fields
            .iter()
            .chain(breakdowns)
            .map(|name| Column::new(name.as_str(), insight_column_kind(name))),
    )
}
