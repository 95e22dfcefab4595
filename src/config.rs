//! Extractor configuration
//!
//! Settings are read from an optional YAML file, then overlaid with the
//! `FB_*` environment variables. The result is validated and resolved into an
//! [`ApiContext`] that is passed explicitly to the rest of the crate.

use crate::engine::{standard_jobs, ExtractionJob, InsightLevel, JobKind, RetryPolicy};
use crate::error::{Error, Result, ResultExt};
use crate::types::{BackoffType, OutputFormat};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the access token
pub const ENV_ACCESS_TOKEN: &str = "FB_ACCESS_TOKEN";
/// Environment variable holding the ad account id
pub const ENV_ACCOUNT_ID: &str = "FB_AD_ACCOUNT_ID";
/// Environment variable holding the API version
pub const ENV_API_VERSION: &str = "FB_API_VER";
/// Environment variable holding the lookback window in days
pub const ENV_LOOKBACK_DAYS: &str = "FB_LOOKBACK_DAYS";
/// Environment variable holding the output directory
pub const ENV_OUTPUT_DIR: &str = "FB_OUT_DIR";

/// Prefix of ad account ids
pub const ACCOUNT_PREFIX: &str = "act_";

/// Longest lookback accepted; insights are retained for 37 months
pub const MAX_LOOKBACK_DAYS: u32 = 1131;

// ============================================================================
// File Configuration
// ============================================================================

/// Complete extractor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// API access token
    #[serde(default)]
    pub access_token: Option<String>,

    /// Ad account id (`act_<digits>`)
    #[serde(default)]
    pub account_id: Option<String>,

    /// API version path segment
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Reporting window in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Directory output files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output file format
    #[serde(default)]
    pub format: OutputFormat,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional request quota
    #[serde(default)]
    pub requests_per_second: Option<u32>,

    /// Job retry settings
    #[serde(default)]
    pub retry: RetryConfig,

    /// Jobs to run; the standard set when empty
    #[serde(default)]
    pub jobs: Vec<JobDefinition>,
}

fn default_api_version() -> String {
    "v20.0".to_string()
}

fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_lookback_days() -> u32 {
    7
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("analytics/dataprocessed")
}

fn default_timeout_secs() -> u64 {
    90
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            account_id: None,
            api_version: default_api_version(),
            base_url: default_base_url(),
            lookback_days: default_lookback_days(),
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: None,
            retry: RetryConfig::default(),
            jobs: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Parse configuration from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Overlay values from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an environment lookup
    ///
    /// Empty values are ignored. An unparseable lookback value is kept as zero
    /// so that validation reports it.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(account) = get(ENV_ACCOUNT_ID) {
            self.account_id = Some(account);
        }
        if let Some(version) = get(ENV_API_VERSION) {
            self.api_version = version;
        }
        if let Some(days) = get(ENV_LOOKBACK_DAYS) {
            self.lookback_days = days.trim().parse().unwrap_or(0);
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Check that every required value is present and sane
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            (ENV_ACCESS_TOKEN, self.access_token.as_deref()),
            (ENV_ACCOUNT_ID, self.account_id.as_deref()),
        ]
        .into_iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(Error::missing_field(missing.join(", ")));
        }

        if let Some(account) = &self.account_id {
            normalize_account_id(account)?;
        }

        if self.lookback_days == 0 {
            return Err(Error::invalid_value(
                "lookback_days",
                "must be a positive number of days",
            ));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(Error::invalid_value(
                "lookback_days",
                format!("must be at most {MAX_LOOKBACK_DAYS} days"),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be positive"));
        }

        url::Url::parse(&self.base_url)?;

        for job in &self.jobs {
            job.validate()?;
        }

        Ok(())
    }

    /// Validate and resolve into an API context for `today`
    pub fn resolve(&self, today: NaiveDate) -> Result<ApiContext> {
        self.validate()?;

        let access_token = self
            .access_token
            .clone()
            .ok_or_else(|| Error::missing_field(ENV_ACCESS_TOKEN))?;
        let account = self
            .account_id
            .as_deref()
            .ok_or_else(|| Error::missing_field(ENV_ACCOUNT_ID))?;

        Ok(ApiContext {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_version: self.api_version.clone(),
            account_id: normalize_account_id(account)?,
            access_token,
            timeout: Duration::from_secs(self.timeout_secs),
            lookback_days: self.lookback_days,
            today,
        })
    }

    /// Validate and resolve into an API context for the current UTC date
    pub fn resolve_now(&self) -> Result<ApiContext> {
        self.resolve(Utc::now().date_naive())
    }

    /// The jobs to run
    pub fn jobs(&self) -> Vec<ExtractionJob> {
        if self.jobs.is_empty() {
            standard_jobs()
        } else {
            self.jobs.iter().map(JobDefinition::to_job).collect()
        }
    }

    /// The job retry policy
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.to_policy()
    }
}

/// Add the `act_` prefix to a bare numeric account id and reject anything else
pub fn normalize_account_id(account: &str) -> Result<String> {
    let account = account.trim();
    let digits = account.strip_prefix(ACCOUNT_PREFIX).unwrap_or(account);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid_value(
            "account_id",
            format!("expected '{ACCOUNT_PREFIX}<digits>', got '{account}'"),
        ));
    }

    Ok(format!("{ACCOUNT_PREFIX}{digits}"))
}

// ============================================================================
// Retry Configuration
// ============================================================================

/// Job retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff strategy
    #[serde(default)]
    pub backoff: BackoffType,

    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    2
}

fn default_initial_backoff_ms() -> u64 {
    2000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryConfig {
    /// Convert to a retry policy
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries).with_backoff(
            self.backoff,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
        )
    }
}

// ============================================================================
// Job Definitions
// ============================================================================

/// Kind of a configured job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobDefinitionKind {
    /// Ad metadata with creative content
    Metadata,
    /// Insight report
    Insights,
}

/// A job as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Job name
    pub name: String,

    /// Job kind
    pub kind: JobDefinitionKind,

    /// Destination identifier (output file stem); defaults to the name
    #[serde(default)]
    pub destination: Option<String>,

    /// Requested fields; the standard list when omitted
    #[serde(default)]
    pub fields: Option<Vec<String>>,

    /// Insight aggregation level
    #[serde(default)]
    pub level: Option<InsightLevel>,

    /// Insight breakdown dimensions
    #[serde(default)]
    pub breakdowns: Vec<String>,

    /// Insight time granularity in days
    #[serde(default)]
    pub time_increment: Option<u32>,

    /// Page size hint
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl JobDefinition {
    /// Check the definition is usable
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_value("jobs.name", "must not be empty"));
        }
        if self.kind == JobDefinitionKind::Metadata
            && (!self.breakdowns.is_empty() || self.time_increment.is_some())
        {
            return Err(Error::invalid_value(
                format!("jobs.{}", self.name),
                "breakdowns and time_increment apply to insight jobs only",
            ));
        }
        if self.time_increment == Some(0) {
            return Err(Error::invalid_value(
                format!("jobs.{}.time_increment", self.name),
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Build the extraction job
    pub fn to_job(&self) -> ExtractionJob {
        let destination = self.destination.clone().unwrap_or_else(|| self.name.clone());

        let mut job = match self.kind {
            JobDefinitionKind::Metadata => ExtractionJob::ad_metadata(&self.name, destination),
            JobDefinitionKind::Insights => {
                let mut job = ExtractionJob::insights(
                    &self.name,
                    destination,
                    self.level.unwrap_or_default(),
                );
                if let JobKind::Insights {
                    breakdowns,
                    time_increment,
                    ..
                } = &mut job.kind
                {
                    breakdowns.clone_from(&self.breakdowns);
                    *time_increment = self.time_increment;
                }
                job
            }
        };

        if let Some(fields) = &self.fields {
            job.fields.clone_from(fields);
        }
        if let Some(size) = self.page_size {
            job.page_size = size;
        }
        job
    }
}

/// Resolved settings shared by every job of a run
#[derive(Clone)]
pub struct ApiContext {
    /// API base URL without trailing slash
    pub base_url: String,
    /// API version path segment
    pub api_version: String,
    /// Normalized ad account id
    pub account_id: String,
    /// API access token
    pub access_token: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Reporting window in days
    pub lookback_days: u32,
    /// Date the reporting window ends on
    pub today: NaiveDate,
}

impl ApiContext {
    /// Absolute URL of an account edge (e.g. `ads`, `insights`)
    pub fn edge_url(&self, edge: &str) -> Result<String> {
        let url = url::Url::parse(&format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.api_version,
            self.account_id,
            edge.trim_start_matches('/')
        ))?;
        Ok(url.to_string())
    }
}

impl std::fmt::Debug for ApiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiContext")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("account_id", &self.account_id)
            .field("timeout", &self.timeout)
            .field("lookback_days", &self.lookback_days)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.api_version, "v20.0");
        assert_eq!(config.base_url, "https://graph.facebook.com");
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.output_dir, PathBuf::from("analytics/dataprocessed"));
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.timeout_secs, 90);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.jobs().len(), 4);
    }

    #[test]
    fn test_from_yaml() {
        let config = ExtractorConfig::from_yaml(
            r"
account_id: act_123
lookback_days: 14
format: parquet
retry:
  max_retries: 0
jobs:
  - name: campaign_daily
    kind: insights
    level: campaign
    time_increment: 1
    fields: [date_start, campaign_id, spend]
  - name: ads
    kind: metadata
    destination: ads_out
",
        )
        .unwrap();

        assert_eq!(config.account_id.as_deref(), Some("act_123"));
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.format, OutputFormat::Parquet);
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.initial_backoff_ms, 2000);

        let jobs = config.jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].name, "campaign_daily");
        assert_eq!(jobs[0].destination, "campaign_daily");
        assert_eq!(jobs[0].fields, vec!["date_start", "campaign_id", "spend"]);
        assert!(matches!(
            jobs[0].kind,
            JobKind::Insights {
                level: InsightLevel::Campaign,
                time_increment: Some(1),
                ..
            }
        ));
        assert_eq!(jobs[1].destination, "ads_out");
        assert!(jobs[1].is_metadata());
    }

    #[test]
    fn test_env_overlay() {
        let config = ExtractorConfig::from_yaml("api_version: v19.0\nlookback_days: 3")
            .unwrap()
            .with_env_from(env(&[
                (ENV_ACCESS_TOKEN, "token"),
                (ENV_ACCOUNT_ID, "9018283094917961"),
                (ENV_API_VERSION, "v21.0"),
                (ENV_LOOKBACK_DAYS, "28"),
                (ENV_OUTPUT_DIR, "/tmp/out"),
            ]));

        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.api_version, "v21.0");
        assert_eq!(config.lookback_days, 28);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));

        let ctx = config.resolve(today()).unwrap();
        assert_eq!(ctx.account_id, "act_9018283094917961");
        assert_eq!(ctx.timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_env_overlay_ignores_empty_values() {
        let config = ExtractorConfig::default().with_env_from(env(&[(ENV_API_VERSION, "  ")]));
        assert_eq!(config.api_version, "v20.0");
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let err = ExtractorConfig::default().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config field: FB_ACCESS_TOKEN, FB_AD_ACCOUNT_ID"
        );
    }

    #[test]
    fn test_validate_rejects_bad_lookback() {
        let config = ExtractorConfig::default().with_env_from(env(&[
            (ENV_ACCESS_TOKEN, "t"),
            (ENV_ACCOUNT_ID, "act_1"),
            (ENV_LOOKBACK_DAYS, "week"),
        ]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("lookback_days"));
    }

    #[test]
    fn test_validate_rejects_oversized_lookback() {
        let config = ExtractorConfig::default().with_env_from(env(&[
            (ENV_ACCESS_TOKEN, "t"),
            (ENV_ACCOUNT_ID, "act_1"),
            (ENV_LOOKBACK_DAYS, "200000000"),
        ]));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 1131 days"));

        let config = ExtractorConfig {
            lookback_days: MAX_LOOKBACK_DAYS,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_metadata_breakdowns() {
        let config = ExtractorConfig::from_yaml(
            r"
access_token: t
account_id: act_1
jobs:
  - name: ads
    kind: metadata
    breakdowns: [device_platform]
",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_normalize_account_id() {
        assert_eq!(normalize_account_id("act_42").unwrap(), "act_42");
        assert_eq!(normalize_account_id(" 42 ").unwrap(), "act_42");
        assert!(normalize_account_id("act_").is_err());
        assert!(normalize_account_id("acct_42").is_err());
    }

    #[test]
    fn test_edge_url() {
        let config = ExtractorConfig {
            access_token: Some("t".into()),
            account_id: Some("act_7".into()),
            base_url: "https://graph.example.com/".into(),
            ..ExtractorConfig::default()
        };
        let ctx = config.resolve(today()).unwrap();
        assert_eq!(
            ctx.edge_url("ads").unwrap(),
            "https://graph.example.com/v20.0/act_7/ads"
        );
        assert!(!format!("{ctx:?}").contains("access_token"));
    }
}
