use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A headline reduced to its calendar day, ready for scoring and joining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineRecord {
    pub date: NaiveDate,
    pub headline: String,
    pub publisher: String,
    #[serde(default, rename = "stock", alias = "ticker")]
    pub ticker: Option<String>,
    /// Polarity in [-1, 1]; filled in by the sentiment scorer.
    #[serde(default, skip_deserializing)]
    pub sentiment: Option<f64>,
}

/// A headline with its full publication timestamp (used by the news EDA).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(rename = "date")]
    pub published_at: NaiveDateTime,
    pub headline: String,
    pub publisher: String,
    #[serde(default, rename = "stock", alias = "ticker")]
    pub ticker: Option<String>,
}

/// Sentiment classification for a polarity score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
        }
    }
}
