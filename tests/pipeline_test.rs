//! End-to-end checks of the sentiment/return pipeline over small CSV fixtures.
//!
//! A keyword polarity model stands in for VADER so the expected numbers can
//! be worked out by hand.

use stock_news_analyzer::config::AnalysisConfig;
use stock_news_analyzer::errors::AppError;
use stock_news_analyzer::jobs::correlation_job::{build_correlation, run_correlation_analysis, REPORT_FILE};
use stock_news_analyzer::services::analytics_service::{AGGREGATE_CSV_FILE, DAILY_CHART_FILE};
use stock_news_analyzer::services::job_runner_service::JobContext;
use stock_news_analyzer::services::sentiment_service::PolarityModel;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct KeywordModel;

impl PolarityModel for KeywordModel {
    fn polarity(&self, text: &str) -> f64 {
        let text = text.to_lowercase();
        if text.contains("good") {
            1.0
        } else if text.contains("bad") {
            -1.0
        } else {
            0.0
        }
    }
}

const NEWS_CSV: &str = ",headline,url,publisher,date,stock
0,Good quarter for Apple,https://a,Benzinga,2020-06-02 10:00:00-04:00,AAPL
1,Bad supply news for Apple,https://b,Benzinga,2020-06-02 11:30:00-04:00,AAPL
2,Good demand outlook,https://c,Zacks,2020-06-03 09:00:00-04:00,AAPL
3,Bad guidance cut,https://d,Zacks,2020-06-04 09:00:00-04:00,AAPL
4,Good analyst upgrade,https://e,Lisa Levin,2020-06-05 08:00:00-04:00,AAPL
";

const APPLE_CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume
2020-06-01,100,100,100,100,100,1000
2020-06-02,100,100,100,100,100,1000
2020-06-03,110,110,110,110,110,1000
2020-06-04,99,99,99,99,99,1000
2020-06-05,108.9,108.9,108.9,108.9,108.9,1000
";

const TESLA_CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume
2020-06-01,50,50,50,50,50,500
2020-06-02,50,50,50,50,50,500
2020-06-03,50,50,50,50,50,500
2020-06-04,50,50,50,50,50,500
2020-06-05,50,50,50,50,50,500
";

struct Fixture {
    dir: TempDir,
    news: PathBuf,
    apple: PathBuf,
    tesla: PathBuf,
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn fixture(news_csv: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let news = write(dir.path(), "news.csv", news_csv);
    let apple = write(dir.path(), "apple.csv", APPLE_CSV);
    let tesla = write(dir.path(), "tesla.csv", TESLA_CSV);
    Fixture {
        dir,
        news,
        apple,
        tesla,
    }
}

fn context(fx: &Fixture, sources: &str, extra: &[(&str, &str)]) -> JobContext {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("NEWS_PATH".into(), fx.news.display().to_string());
    env.insert("STOCK_SOURCES".into(), sources.to_string());
    env.insert("OUTPUT_DIR".into(), fx.dir.path().join("out").display().to_string());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    let config = AnalysisConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
    JobContext::new(config, Arc::new(KeywordModel))
}

fn apple_only(fx: &Fixture) -> String {
    format!("Apple:AAPL:{}", fx.apple.display())
}

#[test]
fn test_offsetting_headlines_average_to_zero() {
    let fx = fixture(NEWS_CSV);
    let run = build_correlation(&context(&fx, &apple_only(&fx), &[])).unwrap();

    let june_2 = run
        .daily
        .iter()
        .find(|d| d.date.to_string() == "2020-06-02")
        .unwrap();
    assert_eq!(june_2.headline_count, 2);
    assert!(june_2.average_sentiment.abs() < 1e-12);
    assert!(june_2.daily_return.abs() < 1e-12);
}

#[test]
fn test_sentiment_tracks_returns_perfectly() {
    let fx = fixture(NEWS_CSV);
    let run = build_correlation(&context(&fx, &apple_only(&fx), &[])).unwrap();

    assert_eq!(run.daily.len(), 4);
    assert!((run.report.pearson - 1.0).abs() < 1e-9);
    assert_eq!(run.report.strength, "strong");
    assert_eq!(run.report.headlines_scored, 5);
    assert_eq!(run.report.price_rows, 5);
    assert_eq!(run.report.merged_rows, 5);
    assert_eq!(run.report.start.unwrap().to_string(), "2020-06-02");
    assert_eq!(run.report.end.unwrap().to_string(), "2020-06-05");
}

#[test]
fn test_date_join_is_market_wide_unless_company_join_enabled() {
    let fx = fixture(NEWS_CSV);
    let sources = format!(
        "Apple:AAPL:{},Tesla:TSLA:{}",
        fx.apple.display(),
        fx.tesla.display()
    );

    let by_date = build_correlation(&context(&fx, &sources, &[])).unwrap();
    assert_eq!(by_date.merged.len(), 10);
    let june_3 = &by_date.daily[1];
    assert!((june_3.daily_return - 5.0).abs() < 1e-9);

    let by_company = build_correlation(&context(&fx, &sources, &[("JOIN_ON_COMPANY", "true")])).unwrap();
    assert_eq!(by_company.merged.len(), 5);
    assert!(by_company.merged.iter().all(|m| m.company == "Apple"));
    assert!((by_company.daily[1].daily_return - 10.0).abs() < 1e-9);
}

#[test]
fn test_missing_stock_file_is_reported_not_fatal() {
    let fx = fixture(NEWS_CSV);
    let sources = format!("{},Ghost:GHST:{}", apple_only(&fx), fx.dir.path().join("ghost.csv").display());

    let run = build_correlation(&context(&fx, &sources, &[])).unwrap();
    assert_eq!(run.report.load_errors.len(), 1);
    assert!(run.report.load_errors[0].starts_with("Ghost"));
    assert!((run.report.pearson - 1.0).abs() < 1e-9);
}

#[test]
fn test_missing_news_column_fails() {
    let fx = fixture(",headline,url,date,stock\n0,Good,https://a,2020-06-02 10:00:00,AAPL\n");
    let err = build_correlation(&context(&fx, &apple_only(&fx), &[])).unwrap_err();
    match err {
        AppError::MissingColumn { column, .. } => assert_eq!(column, "publisher"),
        other => panic!("expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_single_day_cannot_be_correlated() {
    let fx = fixture(",headline,publisher,date,stock\n0,Good,Zacks,2020-06-03 10:00:00,AAPL\n");
    let err = build_correlation(&context(&fx, &apple_only(&fx), &[])).unwrap_err();
    assert!(matches!(err, AppError::EmptyResult(_)));
}

#[test]
fn test_correlation_job_writes_artifacts() {
    let fx = fixture(NEWS_CSV);
    let ctx = context(&fx, &apple_only(&fx), &[]);

    let result = run_correlation_analysis(&ctx).unwrap();
    assert_eq!(result.items_processed, 4);
    assert_eq!(result.items_failed, 0);

    let out = fx.dir.path().join("out");
    assert!(out.join(DAILY_CHART_FILE).exists());
    assert!(out.join(AGGREGATE_CSV_FILE).exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(REPORT_FILE)).unwrap()).unwrap();
    assert!((report["pearson"].as_f64().unwrap() - 1.0).abs() < 1e-9);
}
