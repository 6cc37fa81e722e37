use crate::models::{DailySentiment, MergedRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Mean sentiment per date, ascending by date.
pub fn aggregate_sentiments_by_date<I>(scores: I) -> Vec<DailySentiment>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, score) in scores {
        let entry = by_date.entry(date).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    by_date
        .into_iter()
        .map(|(date, (sum, count))| DailySentiment {
            date,
            average_sentiment: sum / count as f64,
            headline_count: count,
        })
        .collect()
}

/// Aggregate the scored rows of a merge. Rows without a score are skipped.
pub fn aggregate_merged_sentiment(merged: &[MergedRecord]) -> Vec<DailySentiment> {
    aggregate_sentiments_by_date(
        merged
            .iter()
            .filter_map(|row| row.sentiment.map(|s| (row.date, s))),
    )
}
