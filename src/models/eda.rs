use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Same fields as a pandas `describe()` on a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherCount {
    pub name: String,
    pub articles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub articles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationSpike {
    pub date: NaiveDate,
    pub articles: usize,
    pub rolling_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: u32,
    pub articles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsEdaReport {
    pub total_articles: usize,
    pub headline_length: Option<DescriptiveStats>,
    pub top_publishers: Vec<PublisherCount>,
    pub publisher_domains: Vec<PublisherCount>,
    pub daily_frequency: Vec<DailyCount>,
    pub frequency_summary: Option<DescriptiveStats>,
    pub spikes: Vec<PublicationSpike>,
    pub hourly: Vec<HourlyCount>,
    pub peak_hours: Vec<u32>,
}
