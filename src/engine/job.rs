//! Extraction job definitions

use crate::config::ApiContext;
use crate::error::{Error, Result};
use crate::pagination::QueryParams;
use crate::schema::{
    ad_metadata_schema, insight_schema, TableSchema, AD_METADATA_FIELDS, DEFAULT_INSIGHT_FIELDS,
    PLACEMENT_BREAKDOWNS,
};
use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Page size of metadata jobs
pub const METADATA_PAGE_SIZE: u32 = 500;

/// Page size of insight jobs
pub const INSIGHTS_PAGE_SIZE: u32 = 5000;

/// Lookback windows the API offers as `last_{n}d` presets
pub const PRESET_LOOKBACK_DAYS: &[u32] = &[3, 7, 14, 28, 30, 90];

/// Aggregation level of an insight report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    /// Whole account
    Account,
    /// Per campaign
    Campaign,
    /// Per ad set
    Adset,
    /// Per ad
    #[default]
    Ad,
}

impl InsightLevel {
    /// Value of the `level` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Campaign => "campaign",
            Self::Adset => "adset",
            Self::Ad => "ad",
        }
    }
}

/// What a job extracts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    /// Ad metadata; records are flattened
    Metadata,
    /// Insight report; records are already flat
    Insights {
        /// Aggregation level
        level: InsightLevel,
        /// Breakdown dimensions
        breakdowns: Vec<String>,
        /// Time granularity in days
        time_increment: Option<u32>,
    },
}

/// Reporting window sent with insight requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// `date_preset=last_{n}d`
    Preset(u32),
    /// Explicit `time_range`, both ends inclusive
    Between {
        /// First day
        since: NaiveDate,
        /// Last day
        until: NaiveDate,
    },
}

impl DateRange {
    /// Window covering the `days` days up to `today`
    ///
    /// Fails when the window starts before the earliest representable date.
    pub fn from_lookback(days: u32, today: NaiveDate) -> Result<Self> {
        if PRESET_LOOKBACK_DAYS.contains(&days) {
            return Ok(Self::Preset(days));
        }
        let since = ChronoDuration::try_days(i64::from(days))
            .and_then(|window| today.checked_sub_signed(window))
            .ok_or_else(|| {
                Error::invalid_value(
                    "lookback_days",
                    format!("{days} days before {today} is out of range"),
                )
            })?;
        Ok(Self::Between {
            since,
            until: today,
        })
    }

    /// Add the window to request parameters
    pub fn apply(&self, params: &mut QueryParams) {
        match self {
            Self::Preset(days) => params.insert("date_preset", format!("last_{days}d")),
            Self::Between { since, until } => params.insert(
                "time_range",
                serde_json::json!({
                    "since": since.format("%Y-%m-%d").to_string(),
                    "until": until.format("%Y-%m-%d").to_string(),
                })
                .to_string(),
            ),
        }
    }
}

/// A unit of extraction work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    /// Job name
    pub name: String,
    /// Destination identifier handed to the sink
    pub destination: String,
    /// Account edge the job reads (`ads`, `insights`)
    pub edge: String,
    /// What the job extracts
    pub kind: JobKind,
    /// Requested fields
    pub fields: Vec<String>,
    /// Page size hint
    pub page_size: u32,
}

impl ExtractionJob {
    /// Ad metadata job
    pub fn ad_metadata(name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            edge: "ads".to_string(),
            kind: JobKind::Metadata,
            fields: AD_METADATA_FIELDS.iter().map(ToString::to_string).collect(),
            page_size: METADATA_PAGE_SIZE,
        }
    }

    /// Insight job with the default fields
    pub fn insights(
        name: impl Into<String>,
        destination: impl Into<String>,
        level: InsightLevel,
    ) -> Self {
        Self {
            name: name.into(),
            destination: destination.into(),
            edge: "insights".to_string(),
            kind: JobKind::Insights {
                level,
                breakdowns: Vec::new(),
                time_increment: None,
            },
            fields: DEFAULT_INSIGHT_FIELDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            page_size: INSIGHTS_PAGE_SIZE,
        }
    }

    /// Set breakdown dimensions (insight jobs only)
    #[must_use]
    pub fn with_breakdowns<S: AsRef<str>>(mut self, dims: &[S]) -> Self {
        if let JobKind::Insights { breakdowns, .. } = &mut self.kind {
            *breakdowns = dims.iter().map(|d| d.as_ref().to_string()).collect();
        }
        self
    }

    /// Set time granularity in days (insight jobs only)
    #[must_use]
    pub fn with_time_increment(mut self, days: u32) -> Self {
        if let JobKind::Insights { time_increment, .. } = &mut self.kind {
            *time_increment = Some(days);
        }
        self
    }

    /// Replace the requested fields
    #[must_use]
    pub fn with_fields<S: AsRef<str>>(mut self, fields: &[S]) -> Self {
        self.fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Set the page size hint
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Check if records of this job are flattened
    pub fn is_metadata(&self) -> bool {
        matches!(self.kind, JobKind::Metadata)
    }

    /// Column set every record of this job has
    pub fn schema(&self) -> TableSchema {
        match &self.kind {
            JobKind::Metadata => ad_metadata_schema(),
            JobKind::Insights { breakdowns, .. } => insight_schema(&self.fields, breakdowns),
        }
    }

    /// First-page locator and parameters (page size excluded)
    pub fn request(&self, ctx: &ApiContext) -> Result<(String, QueryParams)> {
        let locator = ctx.edge_url(&self.edge)?;
        let mut params = QueryParams::new().with("fields", self.fields.clone());

        if let JobKind::Insights {
            level,
            breakdowns,
            time_increment,
        } = &self.kind
        {
            params.insert("level", level.as_str());
            DateRange::from_lookback(ctx.lookback_days, ctx.today)?.apply(&mut params);
            if !breakdowns.is_empty() {
                params.insert("breakdowns", breakdowns.clone());
            }
            if let Some(days) = time_increment {
                params.insert("time_increment", *days);
            }
        }

        Ok((locator, params))
    }
}

/// The standard job set: ad metadata plus ad-level, daily, and placement insights
pub fn standard_jobs() -> Vec<ExtractionJob> {
    vec![
        ExtractionJob::ad_metadata("ads_meta", "facebook_ads_meta"),
        ExtractionJob::insights("insights", "facebook_ads_insights", InsightLevel::Ad),
        ExtractionJob::insights(
            "insights_daily",
            "facebook_ads_insights_daily",
            InsightLevel::Ad,
        )
        .with_time_increment(1),
        ExtractionJob::insights(
            "insights_placement",
            "facebook_ads_insights_placement",
            InsightLevel::Ad,
        )
        .with_breakdowns(PLACEMENT_BREAKDOWNS),
    ]
}
