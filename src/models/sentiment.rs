use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A headline joined to one price row of the same date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub headline: String,
    pub publisher: String,
    pub headline_ticker: Option<String>,
    pub sentiment: Option<f64>,
    pub company: String,
    pub close: f64,
    pub daily_return: Option<f64>,
}

/// Mean headline polarity for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySentiment {
    pub date: NaiveDate,
    pub average_sentiment: f64,
    pub headline_count: usize,
}

/// One row of the series that gets correlated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    #[serde(rename = "Average Sentiment")]
    pub average_sentiment: f64,
    #[serde(rename = "Daily Return")]
    pub daily_return: f64,
    pub headline_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    /// Offset in observations (rows of the daily series), not calendar days.
    pub lag: usize,
    pub correlation: f64,
    pub observations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub pearson: f64,
    pub strength: String, // "strong", "moderate", "weak"
    pub observations: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub lagged: Vec<LagCorrelation>,
    pub best_lag: Option<LagCorrelation>,

    // Pipeline counters
    pub headlines_scored: usize,
    pub price_rows: usize,
    pub merged_rows: usize,
    pub load_errors: Vec<String>,
}
