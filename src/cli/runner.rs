//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{ApiContext, ExtractorConfig};
use crate::engine::{ExtractionJob, JobKind, JobStatus, Orchestrator, RunReport};
use crate::error::{Error, Result, ResultExt};
use crate::http::RequestConfig;
use crate::output::FileSink;
use crate::types::OutputFormat;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How a command finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Everything succeeded
    Success,
    /// The run completed but at least one job failed
    JobsFailed,
}

impl CommandStatus {
    /// Process exit code
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::JobsFailed => ExitCode::FAILURE,
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
    env: EnvLookup,
}

impl Runner {
    /// Create a runner reading the process environment
    pub fn new(cli: Cli) -> Self {
        Self::with_env(cli, |key| std::env::var(key).ok())
    }

    /// Create a runner with an explicit environment lookup
    pub fn with_env(
        cli: Cli,
        env: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            cli,
            env: Box::new(env),
        }
    }

    /// Run the CLI command
    ///
    /// Fails when the configuration is unusable; a run with failed jobs
    /// completes and reports a failure exit code.
    pub async fn run(&self) -> Result<CommandStatus> {
        match &self.cli.command {
            Commands::Run {
                jobs,
                format,
                output_dir,
                lookback_days,
                report_json,
            } => {
                let overrides = RunOverrides {
                    format: *format,
                    output_dir: output_dir.clone(),
                    lookback_days: *lookback_days,
                };
                self.run_jobs(jobs, &overrides, report_json.as_deref())
                    .await
            }
            Commands::Jobs => self.list_jobs(),
            Commands::Check { offline } => self.check(*offline).await,
        }
    }

    /// Load configuration: file, then environment
    fn load_config(&self) -> Result<ExtractorConfig> {
        let config = match &self.cli.config {
            Some(path) => ExtractorConfig::from_file(path)?,
            None => ExtractorConfig::default(),
        };
        Ok(config.with_env_from(|key| (self.env)(key)))
    }

    async fn run_jobs(
        &self,
        selected: &[String],
        overrides: &RunOverrides,
        report_json: Option<&Path>,
    ) -> Result<CommandStatus> {
        let mut config = self.load_config()?;
        overrides.apply(&mut config);

        let ctx = config.resolve_now()?;
        let jobs = select_jobs(config.jobs(), selected)?;
        let sink = FileSink::new(&config.output_dir, config.format);

        let orchestrator = Orchestrator::from_context(ctx, config.requests_per_second)?
            .with_retry(config.retry_policy());
        let report = orchestrator.run(&jobs, &sink).await;

        print_report(&report, &sink);

        if let Some(path) = report_json {
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }

        Ok(if report.all_succeeded() {
            CommandStatus::Success
        } else {
            CommandStatus::JobsFailed
        })
    }

    fn list_jobs(&self) -> Result<CommandStatus> {
        let config = self.load_config()?;
        for job in config.jobs() {
            println!("{}", describe_job(&job));
        }
        Ok(CommandStatus::Success)
    }

    async fn check(&self, offline: bool) -> Result<CommandStatus> {
        let config = self.load_config()?;
        let ctx = config.resolve_now()?;

        println!(
            "Configuration OK: account {} on {} ({} day window, {} jobs)",
            ctx.account_id,
            ctx.api_version,
            ctx.lookback_days,
            config.jobs().len()
        );

        if offline {
            return Ok(CommandStatus::Success);
        }

        let account = fetch_account(&ctx, config.requests_per_second).await?;
        println!(
            "Access OK: {} (status {})",
            account["name"].as_str().unwrap_or("unnamed account"),
            account["account_status"]
        );
        Ok(CommandStatus::Success)
    }
}

/// Command-line values that take precedence over file and environment
#[derive(Debug, Default)]
struct RunOverrides {
    format: Option<OutputFormat>,
    output_dir: Option<PathBuf>,
    lookback_days: Option<u32>,
}

impl RunOverrides {
    fn apply(&self, config: &mut ExtractorConfig) {
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(days) = self.lookback_days {
            config.lookback_days = days;
        }
    }
}

/// Keep the named jobs, in configuration order; all of them when none are named
fn select_jobs(jobs: Vec<ExtractionJob>, names: &[String]) -> Result<Vec<ExtractionJob>> {
    let names: Vec<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Ok(jobs);
    }

    if let Some(unknown) = names.iter().find(|n| !jobs.iter().any(|j| j.name == **n)) {
        let known: Vec<&str> = jobs.iter().map(|j| j.name.as_str()).collect();
        return Err(Error::config(format!(
            "Unknown job '{unknown}' (available: {})",
            known.join(", ")
        )));
    }

    Ok(jobs
        .into_iter()
        .filter(|j| names.contains(&j.name.as_str()))
        .collect())
}

fn describe_job(job: &ExtractionJob) -> String {
    let detail = match &job.kind {
        JobKind::Metadata => "ad metadata".to_string(),
        JobKind::Insights {
            level,
            breakdowns,
            time_increment,
        } => {
            let mut detail = format!("insights level={}", level.as_str());
            if !breakdowns.is_empty() {
                detail.push_str(&format!(" breakdowns={}", breakdowns.join(",")));
            }
            if let Some(days) = time_increment {
                detail.push_str(&format!(" time_increment={days}"));
            }
            detail
        }
    };
    format!(
        "{:<24} -> {:<36} /{} {detail}",
        job.name, job.destination, job.edge
    )
}

fn print_report(report: &RunReport, sink: &FileSink) {
    for outcome in &report.jobs {
        match &outcome.status {
            JobStatus::Succeeded { rows } => println!(
                "{}: wrote {rows} rows to {}",
                outcome.name,
                sink.path_for(&outcome.destination).display()
            ),
            JobStatus::Failed { cause, .. } => {
                eprintln!(
                    "{}: FAILED after {} attempt(s): {cause}",
                    outcome.name, outcome.attempts
                );
            }
            JobStatus::Pending | JobStatus::Running => {}
        }
    }
}

async fn fetch_account(
    ctx: &ApiContext,
    requests_per_second: Option<u32>,
) -> Result<serde_json::Value> {
    let orchestrator = Orchestrator::from_context(ctx.clone(), requests_per_second)?;
    let account_node = format!("{}/{}", ctx.api_version, ctx.account_id);
    orchestrator
        .client()
        .get_json(
            &account_node,
            RequestConfig::new()
                .query("fields", "name,account_status")
                .timeout(ctx.timeout),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::standard_jobs;

    fn names(jobs: &[ExtractionJob]) -> Vec<&str> {
        jobs.iter().map(|j| j.name.as_str()).collect()
    }

    #[test]
    fn test_select_all_jobs() {
        let jobs = select_jobs(standard_jobs(), &[]).unwrap();
        assert_eq!(jobs.len(), 4);
    }

    #[test]
    fn test_select_jobs_keeps_config_order() {
        let selected = ["insights_placement".to_string(), " ads_meta".to_string()];
        let jobs = select_jobs(standard_jobs(), &selected).unwrap();
        assert_eq!(names(&jobs), vec!["ads_meta", "insights_placement"]);
    }

    #[test]
    fn test_select_unknown_job() {
        let err = select_jobs(standard_jobs(), &["nope".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown job 'nope'"));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = ExtractorConfig::default();
        RunOverrides {
            format: Some(OutputFormat::Json),
            output_dir: Some(PathBuf::from("out")),
            lookback_days: Some(30),
        }
        .apply(&mut config);

        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.lookback_days, 30);
    }

    #[test]
    fn test_describe_job() {
        let line = describe_job(&standard_jobs()[3]);
        assert!(line.starts_with("insights_placement"));
        assert!(line.contains("facebook_ads_insights_placement"));
        assert!(line.contains("breakdowns=publisher_platform,platform_position,device_platform"));
    }
}
