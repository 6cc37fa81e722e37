//! Sentiment / Return Correlation Job
//!
//! The core pipeline of the analyzer:
//! 1. Load and clean the news file, reduce timestamps to calendar days
//! 2. Score every headline with the polarity model
//! 3. Load and stack the per-company stock files, compute daily returns
//! 4. Join headlines with price rows on date (optionally also on company)
//! 5. Average sentiment per day, align with the mean daily return
//! 6. Pearson correlation, lagged correlations and chart artifacts
//!
//! The coefficient is printed to stdout; everything else is logged or written
//! under `OUTPUT_DIR`.

use crate::errors::AppError;
use crate::models::{CorrelationReport, DailyAggregate, MergedRecord};
use crate::services::aggregation_service::aggregate_merged_sentiment;
use crate::services::analytics_service;
use crate::services::correlation_service::{
    self, calculate_correlation, classify_correlation_strength, JoinKey,
};
use crate::services::csv_import_service::{load_headlines, load_price_records};
use crate::services::job_runner_service::{JobContext, JobResult};
use crate::services::returns_service::calculate_daily_returns;
use crate::services::sentiment_service::score_headlines;
use tracing::{info, warn};

pub const REPORT_FILE: &str = "correlation_report.json";

/// Everything the pipeline produced, before anything is written.
#[derive(Debug)]
pub struct CorrelationRun {
    pub report: CorrelationReport,
    pub daily: Vec<DailyAggregate>,
    pub merged: Vec<MergedRecord>,
}

/// Runs the pipeline up to the correlation, without writing artifacts.
pub fn build_correlation(ctx: &JobContext) -> Result<CorrelationRun, AppError> {
    let config = &ctx.config;

    let mut headlines = load_headlines(&config.news_path)?;
    let headlines_scored = score_headlines(ctx.polarity_model.as_ref(), &mut headlines);

    let prices = load_price_records(&config.stock_sources)?;
    for failure in &prices.errors {
        warn!("⚠️  Skipped stock file: {}", failure);
    }
    let mut price_rows = prices.records;
    calculate_daily_returns(&mut price_rows);

    let join = if config.join_on_company {
        JoinKey::DateAndCompany
    } else {
        JoinKey::Date
    };
    let merged = correlation_service::merge_data(&headlines, &price_rows, join);

    let daily_sentiment = aggregate_merged_sentiment(&merged);
    let daily = correlation_service::merge_sentiment_with_stock(&merged, &daily_sentiment);

    let pearson = calculate_correlation(&daily)?;
    let lagged = correlation_service::lagged_correlations(&daily, config.max_correlation_lag);
    let best_lag = correlation_service::strongest_lag(&lagged);

    let report = CorrelationReport {
        pearson,
        strength: classify_correlation_strength(pearson),
        observations: daily.len(),
        start: daily.first().map(|d| d.date),
        end: daily.last().map(|d| d.date),
        lagged,
        best_lag,
        headlines_scored,
        price_rows: price_rows.len(),
        merged_rows: merged.len(),
        load_errors: prices.errors,
    };

    Ok(CorrelationRun {
        report,
        daily,
        merged,
    })
}

pub fn run_correlation_analysis(ctx: &JobContext) -> Result<JobResult, AppError> {
    info!("🔗 Starting sentiment/return correlation job...");

    let run = build_correlation(ctx)?;
    let report = &run.report;

    println!("Pearson correlation coefficient: {}", report.pearson);
    info!(
        "🔗 Correlation {:.4} ({}) over {} days",
        report.pearson, report.strength, report.observations
    );
    if let Some(best) = &report.best_lag {
        info!(
            "🔗 Strongest lag: {} observations (r = {:.4}, n = {})",
            best.lag, best.correlation, best.observations
        );
    }

    let output_dir = &ctx.config.output_dir;
    analytics_service::visualize_data(&run.daily, output_dir, ctx.config.rolling_window)?;
    analytics_service::write_json(&output_dir.join(REPORT_FILE), report)?;

    info!("🏁 Correlation job completed");
    Ok(JobResult {
        items_processed: report.observations,
        items_failed: report.load_errors.len(),
    })
}
