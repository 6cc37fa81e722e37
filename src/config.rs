use crate::errors::AppError;
use crate::jobs::JobKind;
use crate::models::StockSource;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Companies analysed when `STOCK_SOURCES` is not set, as (label, ticker).
/// Each one is read from `<STOCK_DATA_DIR>/<lowercase label>.csv`.
pub const DEFAULT_COMPANIES: [(&str, &str); 7] = [
    ("Apple", "AAPL"),
    ("Amazon", "AMZN"),
    ("Google", "GOOG"),
    ("Meta", "META"),
    ("Microsoft", "MSFT"),
    ("Nvidia", "NVDA"),
    ("Tesla", "TSLA"),
];

#[derive(Debug, Clone)]
pub struct TopicSettings {
    pub n_topics: usize,
    pub iterations: usize,
    pub seed: u64,
    pub words_per_topic: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub news_path: PathBuf,
    pub stock_sources: Vec<StockSource>,
    pub output_dir: PathBuf,
    pub jobs: Vec<JobKind>,
    /// Opt-in: match headline ticker against the price row's company.
    pub join_on_company: bool,
    pub max_correlation_lag: usize,
    pub rolling_window: usize,
    pub spike_factor: f64,
    pub top_publishers: usize,
    pub topics: TopicSettings,
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup("STOCK_DATA_DIR").unwrap_or_else(|| "data".to_string()),
        );

        let stock_sources = match lookup("STOCK_SOURCES") {
            Some(raw) => parse_stock_sources(&raw, &data_dir)?,
            None => DEFAULT_COMPANIES
                .iter()
                .map(|(label, ticker)| StockSource {
                    company: label.to_string(),
                    ticker: Some(ticker.to_string()),
                    path: data_dir.join(format!("{}.csv", label.to_lowercase())),
                })
                .collect(),
        };

        let jobs = match lookup("ANALYSIS_JOBS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(JobKind::from_str)
                .collect::<Result<Vec<_>, _>>()?,
            None => JobKind::ALL.to_vec(),
        };

        let config = Self {
            news_path: PathBuf::from(
                lookup("NEWS_PATH").unwrap_or_else(|| "data/news.csv".to_string()),
            ),
            stock_sources,
            output_dir: PathBuf::from(
                lookup("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()),
            ),
            jobs,
            join_on_company: parse_var(&lookup, "JOIN_ON_COMPANY", false)?,
            max_correlation_lag: parse_var(&lookup, "MAX_CORRELATION_LAG", 7)?,
            rolling_window: parse_var(&lookup, "ROLLING_WINDOW", 7)?,
            spike_factor: parse_var(&lookup, "SPIKE_FACTOR", 1.5)?,
            top_publishers: parse_var(&lookup, "TOP_PUBLISHERS", 10)?,
            topics: TopicSettings {
                n_topics: parse_var(&lookup, "LDA_TOPICS", 5)?,
                iterations: parse_var(&lookup, "LDA_ITERATIONS", 200)?,
                seed: parse_var(&lookup, "LDA_SEED", 42)?,
                words_per_topic: parse_var(&lookup, "TOPIC_WORDS", 5)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.jobs.is_empty() {
            return Err(AppError::Config("ANALYSIS_JOBS selects no jobs".to_string()));
        }
        if self.stock_sources.is_empty() {
            return Err(AppError::Config("STOCK_SOURCES is empty".to_string()));
        }
        if self.rolling_window == 0 {
            return Err(AppError::Config("ROLLING_WINDOW must be at least 1".to_string()));
        }
        if !self.spike_factor.is_finite() || self.spike_factor <= 0.0 {
            return Err(AppError::Config(format!(
                "SPIKE_FACTOR must be positive, got {}",
                self.spike_factor
            )));
        }
        if self.topics.n_topics == 0 {
            return Err(AppError::Config("LDA_TOPICS must be at least 1".to_string()));
        }
        if self.topics.iterations == 0 {
            return Err(AppError::Config("LDA_ITERATIONS must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

/// Parses `Label:TICKER[:path]` entries separated by commas.
fn parse_stock_sources(raw: &str, data_dir: &Path) -> Result<Vec<StockSource>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.splitn(3, ':').map(str::trim).collect();
            let company = parts[0];
            if company.is_empty() {
                return Err(AppError::Config(format!(
                    "Invalid STOCK_SOURCES entry '{}'",
                    entry
                )));
            }
            let ticker = parts
                .get(1)
                .filter(|t| !t.is_empty())
                .map(|t| t.to_uppercase());
            let path = match parts.get(2) {
                Some(p) if !p.is_empty() => PathBuf::from(p),
                _ => data_dir.join(format!("{}.csv", company.to_lowercase())),
            };
            Ok(StockSource {
                company: company.to_string(),
                ticker,
                path,
            })
        })
        .collect()
}
