//! Analysis Jobs Module
//!
//! Each job is one batch analysis over the configured news and stock files.
//! Jobs are selected with `ANALYSIS_JOBS` and executed in order by the job
//! runner.
//!
//! # Available Jobs
//!
//! - `correlation_job` - Sentiment vs. daily return correlation (the core pipeline)
//! - `news_eda_job` - Publisher, frequency and timing statistics of the news feed
//! - `topic_modeling_job` - LDA topics and event phrases in the headlines
//! - `technical_analysis_job` - Moving averages, RSI and MACD per company
//!
//! Every job reads its inputs fresh, writes its artifacts under `OUTPUT_DIR`
//! and can be re-run safely.

pub mod correlation_job;
pub mod news_eda_job;
pub mod technical_analysis_job;
pub mod topic_modeling_job;

use crate::errors::AppError;
use crate::services::job_runner_service::{JobContext, JobResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Correlation,
    NewsEda,
    Topics,
    Indicators,
}

impl JobKind {
    pub const ALL: [JobKind; 4] = [
        JobKind::Correlation,
        JobKind::NewsEda,
        JobKind::Topics,
        JobKind::Indicators,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JobKind::Correlation => "correlation",
            JobKind::NewsEda => "eda",
            JobKind::Topics => "topics",
            JobKind::Indicators => "indicators",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .iter()
            .copied()
            .find(|job| job.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = JobKind::ALL.iter().map(|j| j.name()).collect();
                AppError::Config(format!(
                    "Unknown analysis job '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// Dispatch to the job's entry point.
pub fn run(job: JobKind, ctx: &JobContext) -> Result<JobResult, AppError> {
    match job {
        JobKind::Correlation => correlation_job::run_correlation_analysis(ctx),
        JobKind::NewsEda => news_eda_job::run_news_eda(ctx),
        JobKind::Topics => topic_modeling_job::run_topic_modeling(ctx),
        JobKind::Indicators => technical_analysis_job::run_technical_analysis(ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_names_round_trip() {
        for job in JobKind::ALL {
            assert_eq!(job.name().parse::<JobKind>().unwrap(), job);
        }
        assert_eq!(" Topics ".parse::<JobKind>().unwrap(), JobKind::Topics);
    }

    #[test]
    fn test_unknown_job_is_config_error() {
        assert!(matches!("forecast".parse::<JobKind>(), Err(AppError::Config(_))));
    }
}
