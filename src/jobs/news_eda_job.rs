//! News EDA Job
//!
//! Descriptive statistics of the news feed itself: headline lengths,
//! publisher activity, email-publisher domains, daily publication frequency
//! with spikes, and the hours at which articles appear.

use crate::errors::AppError;
use crate::services::analytics_service::{ensure_output_dir, write_csv, write_json};
use crate::services::csv_import_service::load_news_articles;
use crate::services::job_runner_service::{JobContext, JobResult};
use crate::services::news_eda_service::analyze_news;
use tracing::info;

pub const REPORT_FILE: &str = "news_eda.json";
pub const FREQUENCY_FILE: &str = "publication_frequency.csv";

pub fn run_news_eda(ctx: &JobContext) -> Result<JobResult, AppError> {
    info!("📰 Starting news EDA job...");

    let articles = load_news_articles(&ctx.config.news_path)?;
    if articles.is_empty() {
        return Err(AppError::EmptyResult(format!(
            "no articles with a valid date in {}",
            ctx.config.news_path.display()
        )));
    }

    let report = analyze_news(&articles, &ctx.config);

    if let Some(stats) = &report.headline_length {
        info!(
            "📰 Headline length: mean {:.1}, median {:.1}, max {:.0}",
            stats.mean, stats.median, stats.max
        );
    }
    for publisher in report.top_publishers.iter().take(5) {
        info!("📰   {} - {} articles", publisher.name, publisher.articles);
    }

    let output_dir = &ctx.config.output_dir;
    ensure_output_dir(output_dir)?;
    write_json(&output_dir.join(REPORT_FILE), &report)?;
    write_csv(&output_dir.join(FREQUENCY_FILE), &report.daily_frequency)?;

    info!("🏁 News EDA job completed");
    Ok(JobResult {
        items_processed: report.total_articles,
        items_failed: 0,
    })
}
