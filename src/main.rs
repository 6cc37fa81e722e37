use anyhow::{bail, Context};
use stock_news_analyzer::config::AnalysisConfig;
use stock_news_analyzer::logging::{init_logging, LoggingConfig};
use stock_news_analyzer::services::job_runner_service::{run_jobs, JobContext};
use stock_news_analyzer::services::sentiment_service::VaderModel;
use std::sync::Arc;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    let logging = LoggingConfig::from_env();
    init_logging(&logging).context("Failed to initialize logging")?;

    let config = AnalysisConfig::from_env().context("Invalid analysis configuration")?;
    info!(
        "📂 News: {} | {} stock files | output: {}",
        config.news_path.display(),
        config.stock_sources.len(),
        config.output_dir.display()
    );

    let context = JobContext::new(config, Arc::new(VaderModel::new()));
    let outcomes = run_jobs(&context);

    let failed: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().err().map(|e| format!("{}: {}", o.job, e)))
        .collect();
    if !failed.is_empty() {
        bail!("{} job(s) failed: {}", failed.len(), failed.join("; "));
    }

    Ok(())
}
