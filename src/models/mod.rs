mod analytics;
mod eda;
mod indicator;
mod news;
mod price;
mod sentiment;
mod table;
mod topic;

pub use analytics::{ChartMeta, ChartSeries, DailyChartPoint, ScatterPoint};
pub use eda::{
    DailyCount, DescriptiveStats, HourlyCount, NewsEdaReport, PublicationSpike, PublisherCount,
};
pub use indicator::IndicatorPoint;
pub use news::{HeadlineRecord, NewsArticle, Sentiment};
pub use price::{PriceRecord, StockSource};
pub use sentiment::{CorrelationReport, DailyAggregate, DailySentiment, LagCorrelation, MergedRecord};
pub use table::Table;
pub use topic::{PhraseMatch, Topic, TopicReport};
