use crate::errors::AppError;
use crate::models::{ChartMeta, ChartSeries, DailyAggregate, DailyChartPoint, ScatterPoint};
use crate::services::correlation_service::rolling_mean;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DAILY_CHART_FILE: &str = "sentiment_vs_returns.json";
pub const SCATTER_CHART_FILE: &str = "sentiment_return_scatter.json";
pub const AGGREGATE_CSV_FILE: &str = "daily_aggregates.csv";

fn meta(title: &str, x_label: &str, y_label: &str, dates: &[NaiveDate]) -> ChartMeta {
    ChartMeta {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        points: dates.len(),
        start: dates.iter().min().copied(),
        end: dates.iter().max().copied(),
    }
}

/// Daily return and sentiment over time, with a rolling sentiment line.
pub fn build_daily_chart(daily: &[DailyAggregate], rolling_window: usize) -> ChartSeries<DailyChartPoint> {
    let rolling = rolling_mean(daily, rolling_window);

    let series: Vec<DailyChartPoint> = daily
        .iter()
        .zip(rolling)
        .map(|(d, rolling_sentiment)| DailyChartPoint {
            date: d.date,
            daily_return: d.daily_return,
            average_sentiment: d.average_sentiment,
            rolling_sentiment,
        })
        .collect();

    let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    ChartSeries {
        meta: meta(
            "Daily Stock Returns vs. Average Sentiment",
            "Date",
            "Daily Return (%) / Average Sentiment",
            &dates,
        ),
        series,
    }
}

/// Sentiment on x, return on y.
pub fn build_scatter_chart(daily: &[DailyAggregate]) -> ChartSeries<ScatterPoint> {
    let series: Vec<ScatterPoint> = daily
        .iter()
        .map(|d| ScatterPoint {
            date: d.date,
            x: d.average_sentiment,
            y: d.daily_return,
        })
        .collect();

    let dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    ChartSeries {
        meta: meta(
            "Average Sentiment vs. Daily Return",
            "Average Sentiment",
            "Daily Return (%)",
            &dates,
        ),
        series,
    }
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::io(dir, e))
}

/// Pretty-printed JSON at `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| AppError::io(path, e))?;
    Ok(())
}

/// One CSV row per record, headers from the serde field names.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| AppError::io(path, e))?;
    Ok(())
}

/// Writes the daily chart, the scatter chart and the aggregate table.
pub fn visualize_data(
    daily: &[DailyAggregate],
    output_dir: &Path,
    rolling_window: usize,
) -> Result<Vec<PathBuf>, AppError> {
    ensure_output_dir(output_dir)?;

    let daily_path = output_dir.join(DAILY_CHART_FILE);
    write_json(&daily_path, &build_daily_chart(daily, rolling_window))?;

    let scatter_path = output_dir.join(SCATTER_CHART_FILE);
    write_json(&scatter_path, &build_scatter_chart(daily))?;

    let csv_path = output_dir.join(AGGREGATE_CSV_FILE);
    write_csv(&csv_path, daily)?;

    info!(
        "📈 Wrote {} chart points to {}",
        daily.len(),
        output_dir.display()
    );
    Ok(vec![daily_path, scatter_path, csv_path])
}
