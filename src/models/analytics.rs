use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChartPoint {
    pub date: NaiveDate,
    pub daily_return: f64,
    pub average_sentiment: f64,
    pub rolling_sentiment: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartMeta {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// A chart ready to hand to a renderer: labels plus the plotted points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries<P> {
    pub meta: ChartMeta,
    pub series: Vec<P>,
}
