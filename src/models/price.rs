use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// One stock CSV to load, tagged with the company it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSource {
    pub company: String,
    pub ticker: Option<String>,
    pub path: PathBuf,
}

// One trading day for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume", deserialize_with = "deserialize_volume")]
    pub volume: u64,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Ticker", default)]
    pub ticker: Option<String>,
    /// Percent change of close versus the previous day of the same company.
    #[serde(rename = "Daily Return", default, skip_deserializing)]
    pub daily_return: Option<f64>,
}

// Some exports write volume as a float ("1.2E7", "350000.0").
fn deserialize_volume<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| serde::de::Error::custom(format!("invalid volume '{}': {}", raw, e)))?;
    if !value.is_finite() || value < 0.0 {
        return Err(serde::de::Error::custom(format!("invalid volume '{}'", raw)));
    }
    Ok(value.round() as u64)
}
