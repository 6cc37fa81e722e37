use crate::config::AnalysisConfig;
use crate::errors::AppError;
use crate::jobs::{self, JobKind};
use crate::services::sentiment_service::PolarityModel;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

// Context passed to job functions
#[derive(Clone)]
pub struct JobContext {
    pub config: Arc<AnalysisConfig>,
    pub polarity_model: Arc<dyn PolarityModel>,
}

impl JobContext {
    pub fn new(config: AnalysisConfig, polarity_model: Arc<dyn PolarityModel>) -> Self {
        Self {
            config: Arc::new(config),
            polarity_model,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobResult {
    pub items_processed: usize,
    pub items_failed: usize,
}

/// What happened to one job of a run.
#[derive(Debug)]
pub struct JobOutcome {
    pub job: JobKind,
    pub result: Result<JobResult, AppError>,
    pub duration_ms: u128,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs a single job, logging its start, completion or failure.
pub fn execute_job_with_tracking<F>(job: JobKind, context: &JobContext, job_fn: F) -> JobOutcome
where
    F: FnOnce(&JobContext) -> Result<JobResult, AppError>,
{
    info!("🏃 Starting job: {}", job);
    let started_at = Instant::now();

    let result = job_fn(context);
    let duration_ms = started_at.elapsed().as_millis();

    match &result {
        Ok(job_result) => info!(
            "✅ Job completed: {} (processed: {}, failed: {}, duration: {}ms)",
            job, job_result.items_processed, job_result.items_failed, duration_ms
        ),
        Err(e) => error!("❌ Job failed: {} - {}", job, e),
    }

    JobOutcome {
        job,
        result,
        duration_ms,
    }
}

/// Runs every configured job in order. A failing job does not stop the rest.
pub fn run_jobs(context: &JobContext) -> Vec<JobOutcome> {
    info!("🚀 Running {} analysis jobs", context.config.jobs.len());

    let outcomes: Vec<JobOutcome> = context
        .config
        .jobs
        .iter()
        .map(|&job| execute_job_with_tracking(job, context, |ctx| jobs::run(job, ctx)))
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(
        "🏁 Analysis run completed: {} succeeded, {} failed",
        outcomes.len() - failed,
        failed
    );
    outcomes
}
