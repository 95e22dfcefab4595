//! Execution engine module
//!
//! Runs extraction jobs one after another and isolates their failures.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Orchestrator` - Runs jobs against the API and hands records to a sink
//! - `ExtractionJob` - What one job requests and where its records go
//! - `RetryPolicy` - Bounded whole-job retries for transient failures
//! - `RunReport` - Per-job outcomes of a run

mod job;
mod retry;
mod types;

pub use job::{
    standard_jobs, DateRange, ExtractionJob, InsightLevel, JobKind, INSIGHTS_PAGE_SIZE,
    METADATA_PAGE_SIZE, PRESET_LOOKBACK_DAYS,
};
pub use retry::RetryPolicy;
pub use types::{JobOutcome, JobStatus, RunReport};

use crate::config::ApiContext;
use crate::error::Result;
use crate::flatten::{flatten_ad, project_insight, FlatRecord};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::output::RecordSink;
use crate::pagination::CursorPaginator;
use crate::schema::TableSchema;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs extraction jobs sequentially over one shared HTTP client
#[derive(Debug)]
pub struct Orchestrator {
    client: HttpClient,
    ctx: ApiContext,
    retry: RetryPolicy,
}

impl Orchestrator {
    /// Create an orchestrator from an existing client
    ///
    /// The client must already carry the access token.
    pub fn new(client: HttpClient, ctx: ApiContext) -> Self {
        Self {
            client,
            ctx,
            retry: RetryPolicy::default(),
        }
    }

    /// Create an orchestrator with a client authenticated by the context's token
    pub fn from_context(ctx: ApiContext, requests_per_second: Option<u32>) -> Result<Self> {
        let mut builder = HttpClientConfig::builder()
            .base_url(ctx.base_url.clone())
            .timeout(ctx.timeout)
            .bearer_token(ctx.access_token.clone());
        builder = match requests_per_second {
            Some(rps) => builder.rate_limit(RateLimiterConfig::per_second(rps)),
            None => builder.no_rate_limit(),
        };
        let client = HttpClient::with_config(builder.build())?;
        Ok(Self::new(client, ctx))
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Get the API context
    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    /// Get the HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Run every job and report each outcome
    pub async fn run(&self, jobs: &[ExtractionJob], sink: &dyn RecordSink) -> RunReport {
        self.run_with(jobs, sink, |_, _| {}).await
    }

    /// Run every job, reporting each status transition to `on_status`
    ///
    /// Every job is reported `Pending` before the first one starts. A failed
    /// job never stops the run.
    pub async fn run_with(
        &self,
        jobs: &[ExtractionJob],
        sink: &dyn RecordSink,
        mut on_status: impl FnMut(&ExtractionJob, &JobStatus),
    ) -> RunReport {
        for job in jobs {
            on_status(job, &JobStatus::Pending);
        }

        let mut report = RunReport::default();
        for job in jobs {
            on_status(job, &JobStatus::Running);
            let outcome = self.run_job(job, sink).await;
            on_status(job, &outcome.status);
            report.jobs.push(outcome);
        }

        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            rows = report.total_rows(),
            "Run finished"
        );
        report
    }

    /// Run one job, retrying transient failures per the retry policy
    pub async fn run_job(&self, job: &ExtractionJob, sink: &dyn RecordSink) -> JobOutcome {
        let started = Instant::now();
        let schema = job.schema();
        let mut attempts = 0;
        let mut pages = 0;

        info!(job = %job.name, destination = %job.destination, "Starting job");

        let status = loop {
            attempts += 1;
            match self.attempt(job, &schema, sink, &mut pages).await {
                Ok(rows) => {
                    info!(job = %job.name, rows, pages, "Job succeeded");
                    break JobStatus::Succeeded { rows };
                }
                Err(e) if self.retry.should_retry(attempts, &e) => {
                    let delay = self.retry.backoff(attempts - 1);
                    warn!(
                        job = %job.name,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Job failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if e.is_breakdown_rejection() {
                        error!(job = %job.name, error = %e, "Breakdown combination rejected");
                    } else {
                        error!(job = %job.name, kind = %e.kind(), error = %e, "Job failed");
                    }
                    break JobStatus::failed(&e);
                }
            }
        };

        JobOutcome {
            name: job.name.clone(),
            destination: job.destination.clone(),
            status,
            pages,
            attempts,
            duration: started.elapsed(),
        }
    }

    /// One pass over every page of a job, then a single sink write
    async fn attempt(
        &self,
        job: &ExtractionJob,
        schema: &TableSchema,
        sink: &dyn RecordSink,
        pages: &mut usize,
    ) -> Result<usize> {
        *pages = 0;

        let (locator, params) = job.request(&self.ctx)?;
        let mut pager = CursorPaginator::new(&self.client, locator, params)
            .with_timeout(self.ctx.timeout)
            .with_page_size(job.page_size);

        let mut records: Vec<FlatRecord> = Vec::new();
        while let Some(page) = pager.next_page().await? {
            *pages = pager.pages_fetched();
            for raw in &page.records {
                let record = if job.is_metadata() {
                    flatten_ad(raw)?
                } else {
                    project_insight(raw, schema)?
                };
                records.push(record);
            }
            debug!(job = %job.name, page = *pages, total = records.len(), "Collected page");
        }

        sink.write(&job.destination, schema, &records).await
    }
}
