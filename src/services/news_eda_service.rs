use crate::config::AnalysisConfig;
use crate::models::{
    DailyCount, DescriptiveStats, HourlyCount, NewsArticle, NewsEdaReport, PublicationSpike,
    PublisherCount,
};
use crate::services::indicators::sma;
use chrono::{Duration, NaiveDate, Timelike};
use regex::Regex;
use statrs::statistics::{Data, Distribution, Max, Min};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::info;

pub const DEFAULT_SPIKE_WINDOW: usize = 7;
pub const DEFAULT_SPIKE_FACTOR: f64 = 1.5;

fn domain_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(.+?)(?:\.|$)").expect("valid regex"))
}

fn non_letter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z\s]").expect("valid regex"))
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// count / mean / sample std / min / quartiles / max. `None` for no values.
pub fn describe(values: &[f64]) -> Option<DescriptiveStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let data = Data::new(sorted.clone());

    Some(DescriptiveStats {
        count: values.len(),
        mean: data.mean().unwrap_or(f64::NAN),
        std: data.std_dev().unwrap_or(f64::NAN),
        min: data.min(),
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: data.max(),
    })
}

/// Character counts of the headlines.
pub fn headline_length_stats(articles: &[NewsArticle]) -> Option<DescriptiveStats> {
    let lengths: Vec<f64> = articles
        .iter()
        .map(|a| a.headline.chars().count() as f64)
        .collect();
    describe(&lengths)
}

fn ranked_counts<'a>(names: impl Iterator<Item = &'a str>) -> Vec<PublisherCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut ranked: Vec<PublisherCount> = counts
        .into_iter()
        .map(|(name, articles)| PublisherCount {
            name: name.to_string(),
            articles,
        })
        .collect();
    ranked.sort_by(|a, b| b.articles.cmp(&a.articles).then_with(|| a.name.cmp(&b.name)));
    ranked
}

/// Articles per publisher, most active first.
pub fn publisher_counts(articles: &[NewsArticle]) -> Vec<PublisherCount> {
    ranked_counts(articles.iter().map(|a| a.publisher.as_str()))
}

/// Domain label of an email-style publisher (`jane@benzinga.com` → `benzinga`).
pub fn publisher_domain(publisher: &str) -> Option<&str> {
    domain_regex()
        .captures(publisher)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|d| !d.is_empty())
}

/// Counts of email-publisher domains; other publishers are ignored.
pub fn publisher_domains(articles: &[NewsArticle]) -> Vec<PublisherCount> {
    ranked_counts(articles.iter().filter_map(|a| publisher_domain(&a.publisher)))
}

/// Articles per calendar day, including zero days between the first and last.
pub fn publication_frequency(articles: &[NewsArticle]) -> Vec<DailyCount> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for article in articles {
        *by_day.entry(article.published_at.date()).or_insert(0) += 1;
    }

    let (Some(&first), Some(&last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return Vec::new();
    };

    let days = (last - first).num_days();
    (0..=days)
        .map(|offset| {
            let date = first + Duration::days(offset);
            DailyCount {
                date,
                articles: by_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// Days whose count is above `factor` × the `window`-day rolling mean
/// (the window includes the day itself).
pub fn publication_spikes(
    frequency: &[DailyCount],
    window: usize,
    factor: f64,
) -> Vec<PublicationSpike> {
    let counts: Vec<f64> = frequency.iter().map(|d| d.articles as f64).collect();
    let rolling = sma(&counts, window);

    frequency
        .iter()
        .zip(rolling)
        .filter_map(|(day, mean)| {
            let mean = mean?;
            (day.articles as f64 > factor * mean).then(|| PublicationSpike {
                date: day.date,
                articles: day.articles,
                rolling_mean: mean,
            })
        })
        .collect()
}

/// 24 buckets, hour 0 first.
pub fn publication_hours(articles: &[NewsArticle]) -> Vec<HourlyCount> {
    let mut buckets = [0usize; 24];
    for article in articles {
        buckets[article.published_at.hour() as usize] += 1;
    }
    buckets
        .iter()
        .enumerate()
        .map(|(hour, &articles)| HourlyCount {
            hour: hour as u32,
            articles,
        })
        .collect()
}

/// Every hour sharing the maximum count. Empty when nothing was published.
pub fn peak_hours(hourly: &[HourlyCount]) -> Vec<u32> {
    let max = hourly.iter().map(|h| h.articles).max().unwrap_or(0);
    if max == 0 {
        return Vec::new();
    }
    hourly
        .iter()
        .filter(|h| h.articles == max)
        .map(|h| h.hour)
        .collect()
}

/// Strips digits and punctuation, collapsing whitespace.
pub fn clean_headline_text(text: &str) -> String {
    let letters = non_letter_regex().replace_all(text, " ");
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned headline texts; headlines that end up blank are dropped.
pub fn clean_headlines(articles: &[NewsArticle]) -> Vec<String> {
    articles
        .iter()
        .map(|a| clean_headline_text(&a.headline))
        .filter(|h| !h.is_empty())
        .collect()
}

pub fn analyze_news(articles: &[NewsArticle], config: &AnalysisConfig) -> NewsEdaReport {
    info!("📰 Running news EDA over {} articles", articles.len());

    let mut top_publishers = publisher_counts(articles);
    top_publishers.truncate(config.top_publishers);

    let daily_frequency = publication_frequency(articles);
    let per_day: Vec<f64> = daily_frequency.iter().map(|d| d.articles as f64).collect();
    let spikes = publication_spikes(&daily_frequency, config.rolling_window, config.spike_factor);
    let hourly = publication_hours(articles);
    let peak = peak_hours(&hourly);

    info!(
        "📰 {} publishing days, {} spikes, peak hours {:?}",
        daily_frequency.len(),
        spikes.len(),
        peak
    );

    NewsEdaReport {
        total_articles: articles.len(),
        headline_length: headline_length_stats(articles),
        top_publishers,
        publisher_domains: publisher_domains(articles),
        frequency_summary: describe(&per_day),
        daily_frequency,
        spikes,
        hourly,
        peak_hours: peak,
    }
}
