//! Topic Modeling Job
//!
//! Cleans the headlines, fits an LDA model and looks for event phrases
//! ("FDA approval", "price target", ...). The fit is seeded, so two runs over
//! the same file report the same topics.

use crate::errors::AppError;
use crate::services::analytics_service::{ensure_output_dir, write_json};
use crate::services::csv_import_service::load_news_articles;
use crate::services::job_runner_service::{JobContext, JobResult};
use crate::services::news_eda_service::clean_headlines;
use crate::services::topic_service::model_topics;
use tracing::info;

pub const REPORT_FILE: &str = "topics.json";

pub fn run_topic_modeling(ctx: &JobContext) -> Result<JobResult, AppError> {
    info!("🧩 Starting topic modeling job...");

    let articles = load_news_articles(&ctx.config.news_path)?;
    let headlines = clean_headlines(&articles);
    let skipped = articles.len() - headlines.len();
    if skipped > 0 {
        info!("🧩 {} headlines were empty after cleaning", skipped);
    }

    let report = model_topics(&headlines, &ctx.config.topics)?;
    info!(
        "🧩 {} headlines mention an event phrase",
        report.phrase_matches.len()
    );

    let output_dir = &ctx.config.output_dir;
    ensure_output_dir(output_dir)?;
    write_json(&output_dir.join(REPORT_FILE), &report)?;

    info!("🏁 Topic modeling job completed");
    Ok(JobResult {
        items_processed: report.documents,
        items_failed: skipped,
    })
}
