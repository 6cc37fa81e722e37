//! Technical Analysis Job
//!
//! SMA(20), SMA(50), RSI(14) and MACD(12, 26, 9) for every company's closing
//! prices, written as one CSV per company.

use crate::errors::AppError;
use crate::models::IndicatorPoint;
use crate::services::analytics_service::{ensure_output_dir, write_csv};
use crate::services::csv_import_service::load_price_records;
use crate::services::indicators::apply_technical_indicators;
use crate::services::job_runner_service::{JobContext, JobResult};
use tracing::{info, warn};

pub fn indicator_file_name(company: &str) -> String {
    format!("indicators_{}.csv", company.to_lowercase().replace(' ', "_"))
}

pub fn run_technical_analysis(ctx: &JobContext) -> Result<JobResult, AppError> {
    info!("📊 Starting technical analysis job...");

    let prices = load_price_records(&ctx.config.stock_sources)?;
    for failure in &prices.errors {
        warn!("⚠️  Skipped stock file: {}", failure);
    }

    let points = apply_technical_indicators(&prices.records);

    let output_dir = &ctx.config.output_dir;
    ensure_output_dir(output_dir)?;

    // Points come grouped by company
    let mut companies = 0;
    for chunk in points.chunk_by(|a, b| a.company == b.company) {
        let company = &chunk[0].company;
        write_csv(&output_dir.join(indicator_file_name(company)), chunk)?;
        log_latest(chunk);
        companies += 1;
    }

    info!("🏁 Technical analysis job completed for {} companies", companies);
    Ok(JobResult {
        items_processed: companies,
        items_failed: prices.errors.len(),
    })
}

fn log_latest(points: &[IndicatorPoint]) {
    if let Some(last) = points.last() {
        info!(
            "📊 {} {}: close {:.2}, RSI14 {}, MACD {}",
            last.company,
            last.date,
            last.close,
            last.rsi14.map_or("n/a".to_string(), |v| format!("{:.1}", v)),
            last.macd.map_or("n/a".to_string(), |v| format!("{:.3}", v)),
        );
    }
}
