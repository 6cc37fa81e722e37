use crate::errors::AppError;
use crate::models::{DailyAggregate, DailySentiment, HeadlineRecord, LagCorrelation, MergedRecord, PriceRecord};
use crate::services::indicators;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// How headlines are matched to price rows.
///
/// `Date` joins every headline with every company's row for that day, which
/// treats news as market-wide sentiment. `DateAndCompany` additionally
/// requires the headline's ticker to match the row's ticker or company label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKey {
    #[default]
    Date,
    DateAndCompany,
}

/// Inner join of headlines with price rows. Headline order is preserved and
/// each headline's matches follow price order.
pub fn merge_data(news: &[HeadlineRecord], prices: &[PriceRecord], join: JoinKey) -> Vec<MergedRecord> {
    let mut prices_by_date: HashMap<NaiveDate, Vec<&PriceRecord>> = HashMap::new();
    for price in prices {
        prices_by_date.entry(price.date).or_default().push(price);
    }

    let merged: Vec<MergedRecord> = news
        .iter()
        .flat_map(|headline| {
            prices_by_date
                .get(&headline.date)
                .map(|rows| rows.as_slice())
                .unwrap_or(&[])
                .iter()
                .filter(move |price| match join {
                    JoinKey::Date => true,
                    JoinKey::DateAndCompany => matches_company(headline, price),
                })
                .map(move |price| MergedRecord {
                    date: headline.date,
                    headline: headline.headline.clone(),
                    publisher: headline.publisher.clone(),
                    headline_ticker: headline.ticker.clone(),
                    sentiment: headline.sentiment,
                    company: price.company.clone(),
                    close: price.close,
                    daily_return: price.daily_return,
                })
        })
        .collect();

    info!(
        "🔗 Merged {} headlines with {} price rows into {} rows ({:?} join)",
        news.len(),
        prices.len(),
        merged.len(),
        join
    );
    merged
}

fn matches_company(headline: &HeadlineRecord, price: &PriceRecord) -> bool {
    let Some(ticker) = headline.ticker.as_deref() else {
        return false;
    };
    price
        .ticker
        .as_deref()
        .map(|t| t.eq_ignore_ascii_case(ticker))
        .unwrap_or(false)
        || price.company.eq_ignore_ascii_case(ticker)
}

/// One return per date: the mean over the distinct company rows present in
/// the merge for that date. Rows without a return are ignored.
pub fn daily_returns_by_date(merged: &[MergedRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut per_company: BTreeMap<NaiveDate, BTreeMap<&str, f64>> = BTreeMap::new();
    for row in merged {
        if let Some(ret) = row.daily_return {
            per_company
                .entry(row.date)
                .or_default()
                .insert(row.company.as_str(), ret);
        }
    }

    per_company
        .into_iter()
        .map(|(date, companies)| {
            let mean = companies.values().sum::<f64>() / companies.len() as f64;
            (date, mean)
        })
        .collect()
}

/// Join daily sentiment with the per-date return. Days without a defined
/// return are dropped, so every output row is complete.
pub fn merge_sentiment_with_stock(
    merged: &[MergedRecord],
    daily_sentiment: &[DailySentiment],
) -> Vec<DailyAggregate> {
    let returns = daily_returns_by_date(merged);

    let daily: Vec<DailyAggregate> = daily_sentiment
        .iter()
        .filter_map(|day| {
            returns.get(&day.date).map(|&daily_return| DailyAggregate {
                date: day.date,
                average_sentiment: day.average_sentiment,
                daily_return,
                headline_count: day.headline_count,
            })
        })
        .collect();

    debug!(
        "{} of {} sentiment days have a matching return",
        daily.len(),
        daily_sentiment.len()
    );
    daily
}

/// Pearson correlation coefficient.
///
/// `None` when the lengths differ, there are fewer than two points, or
/// either series has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    // The float mean of a constant series is not always exact, so the
    // deviations below would not sum to zero.
    if is_constant(x) || is_constant(y) {
        return None;
    }

    let n = x.len() as f64;
    let mean_x: f64 = x.iter().sum::<f64>() / n;
    let mean_y: f64 = y.iter().sum::<f64>() / n;

    let (numerator, sum_sq_x, sum_sq_y) = x.iter().zip(y).fold(
        (0.0, 0.0, 0.0),
        |(num, sx, sy), (&xi, &yi)| {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            (num + dx * dy, sx + dx * dx, sy + dy * dy)
        },
    );

    if sum_sq_x == 0.0 || sum_sq_y == 0.0 {
        return None;
    }

    let r = numerator / (sum_sq_x.sqrt() * sum_sq_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Correlation between average daily sentiment and daily return.
pub fn calculate_correlation(daily: &[DailyAggregate]) -> Result<f64, AppError> {
    if daily.len() < 2 {
        return Err(AppError::EmptyResult(format!(
            "correlation needs at least 2 aligned days, got {}",
            daily.len()
        )));
    }

    let sentiment: Vec<f64> = daily.iter().map(|d| d.average_sentiment).collect();
    let returns: Vec<f64> = daily.iter().map(|d| d.daily_return).collect();

    pearson_correlation(&sentiment, &returns).ok_or_else(|| {
        AppError::UndefinedCorrelation(
            "sentiment or return series has zero variance".to_string(),
        )
    })
}

/// Correlation of sentiment on row t with the return `lag` rows later, for
/// every lag in `0..=max_lag` where it is defined. The series only holds days
/// with both news and a return, so a lag counts observations, not calendar
/// days.
pub fn lagged_correlations(daily: &[DailyAggregate], max_lag: usize) -> Vec<LagCorrelation> {
    (0..=max_lag)
        .filter(|&lag| lag < daily.len())
        .filter_map(|lag| {
            let n = daily.len() - lag;
            let sentiment: Vec<f64> = daily[..n].iter().map(|d| d.average_sentiment).collect();
            let returns: Vec<f64> = daily[lag..].iter().map(|d| d.daily_return).collect();
            pearson_correlation(&sentiment, &returns).map(|correlation| LagCorrelation {
                lag,
                correlation,
                observations: n,
            })
        })
        .collect()
}

pub fn strongest_lag(lagged: &[LagCorrelation]) -> Option<LagCorrelation> {
    lagged
        .iter()
        .max_by(|a, b| a.correlation.abs().total_cmp(&b.correlation.abs()))
        .cloned()
}

/// Trailing mean of the sentiment column, aligned with `daily`.
pub fn rolling_mean(daily: &[DailyAggregate], window: usize) -> Vec<Option<f64>> {
    let sentiment: Vec<f64> = daily.iter().map(|d| d.average_sentiment).collect();
    indicators::sma(&sentiment, window)
}

/// Classify correlation strength
pub fn classify_correlation_strength(correlation: f64) -> String {
    let abs_corr = correlation.abs();
    if abs_corr >= 0.7 {
        "strong".to_string()
    } else if abs_corr >= 0.4 {
        "moderate".to_string()
    } else {
        "weak".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, d).unwrap()
    }

    fn headline(d: u32, text: &str, ticker: Option<&str>, sentiment: f64) -> HeadlineRecord {
        HeadlineRecord {
            date: day(d),
            headline: text.to_string(),
            publisher: "Benzinga".to_string(),
            ticker: ticker.map(str::to_string),
            sentiment: Some(sentiment),
        }
    }

    fn price(d: u32, company: &str, ticker: &str, daily_return: Option<f64>) -> PriceRecord {
        PriceRecord {
            date: day(d),
            open: 10.0,
            high: 10.0,
            low: 10.0,
            close: 10.0,
            volume: 100,
            company: company.to_string(),
            ticker: Some(ticker.to_string()),
            daily_return,
        }
    }

    fn aggregate(d: u32, sentiment: f64, ret: f64) -> DailyAggregate {
        DailyAggregate {
            date: day(d),
            average_sentiment: sentiment,
            daily_return: ret,
            headline_count: 1,
        }
    }

    #[test]
    fn test_merge_on_date_is_inner_join() {
        let news = vec![headline(1, "a", Some("AAPL"), 0.5), headline(3, "b", None, 0.1)];
        let prices = vec![
            price(1, "Apple", "AAPL", Some(1.0)),
            price(1, "Tesla", "TSLA", Some(2.0)),
            price(2, "Apple", "AAPL", Some(3.0)),
        ];

        let merged = merge_data(&news, &prices, JoinKey::Date);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|m| m.date == day(1)));
        assert_eq!(merged[0].company, "Apple");
        assert_eq!(merged[1].company, "Tesla");
    }

    #[test]
    fn test_merge_on_company_matches_ticker_or_label() {
        let news = vec![
            headline(1, "a", Some("aapl"), 0.5),
            headline(1, "b", Some("Tesla"), 0.1),
            headline(1, "c", None, 0.1),
        ];
        let prices = vec![price(1, "Apple", "AAPL", None), price(1, "Tesla", "TSLA", None)];

        let merged = merge_data(&news, &prices, JoinKey::DateAndCompany);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].company, "Apple");
        assert_eq!(merged[1].company, "Tesla");
    }

    #[test]
    fn test_daily_returns_by_date_averages_distinct_companies() {
        let news = vec![headline(1, "a", None, 0.5), headline(1, "b", None, -0.5)];
        let prices = vec![
            price(1, "Apple", "AAPL", Some(2.0)),
            price(1, "Tesla", "TSLA", Some(-1.0)),
        ];
        let merged = merge_data(&news, &prices, JoinKey::Date);
        assert_eq!(merged.len(), 4);

        let returns = daily_returns_by_date(&merged);
        assert!((returns[&day(1)] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_merge_sentiment_drops_days_without_return() {
        let merged = merge_data(
            &[headline(1, "a", None, 0.5), headline(2, "b", None, 0.3)],
            &[price(1, "Apple", "AAPL", None), price(2, "Apple", "AAPL", Some(1.5))],
            JoinKey::Date,
        );
        let daily_sentiment = vec![
            DailySentiment { date: day(1), average_sentiment: 0.5, headline_count: 1 },
            DailySentiment { date: day(2), average_sentiment: 0.3, headline_count: 1 },
        ];

        let daily = merge_sentiment_with_stock(&merged, &daily_sentiment);
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].date, day(2));
        assert!((daily[0].daily_return - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let corr = pearson_correlation(&x, &y).unwrap();
        assert!((corr - 1.0).abs() < 1e-9);

        let inverse: Vec<f64> = y.iter().map(|v| -v).collect();
        assert!((pearson_correlation(&x, &inverse).unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_undefined_cases() {
        assert!(pearson_correlation(&[1.0], &[2.0]).is_none());
        assert!(pearson_correlation(&[1.0, 2.0], &[1.0]).is_none());
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_calculate_correlation_perfect() {
        let daily: Vec<_> = (1..=5)
            .map(|d| aggregate(d, d as f64 * 0.1, d as f64 * 0.1))
            .collect();
        let corr = calculate_correlation(&daily).unwrap();
        assert!((corr - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_correlation_constant_series_reported() {
        let daily: Vec<_> = (1..=5).map(|d| aggregate(d, 0.3, d as f64)).collect();
        assert!(matches!(
            calculate_correlation(&daily),
            Err(AppError::UndefinedCorrelation(_))
        ));
    }

    #[test]
    fn test_calculate_correlation_inexact_constant_mean() {
        for (value, days) in [(0.1, 3), (0.7, 6), (0.2, 7)] {
            let daily: Vec<_> = (1..=days)
                .map(|d| aggregate(d, value, d as f64 * 1.7))
                .collect();
            assert!(
                matches!(calculate_correlation(&daily), Err(AppError::UndefinedCorrelation(_))),
                "sentiment fixed at {} over {} days",
                value,
                days
            );
        }

        let flat_returns: Vec<_> = (1..=6).map(|d| aggregate(d, d as f64 * 0.1, 0.7)).collect();
        assert!(matches!(
            calculate_correlation(&flat_returns),
            Err(AppError::UndefinedCorrelation(_))
        ));
    }

    #[test]
    fn test_lag_counts_rows_not_calendar_days() {
        // Days 1, 2, 8 and 9: the gap is one row apart
        let daily = vec![
            aggregate(1, 0.5, 0.0),
            aggregate(2, -0.5, 1.0),
            aggregate(8, 0.9, -1.0),
            aggregate(9, -0.2, 1.8),
        ];
        let lagged = lagged_correlations(&daily, 5);
        assert!(lagged.iter().all(|l| l.lag < daily.len()));
        let one = lagged.iter().find(|l| l.lag == 1).unwrap();
        assert_eq!(one.observations, 3);
        assert!((one.correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_correlation_too_few_points() {
        assert!(matches!(
            calculate_correlation(&[aggregate(1, 0.1, 0.2)]),
            Err(AppError::EmptyResult(_))
        ));
        assert!(matches!(calculate_correlation(&[]), Err(AppError::EmptyResult(_))));
    }

    #[test]
    fn test_lagged_correlation_finds_shift() {
        // Return follows sentiment by one row
        let sentiment = [0.1, -0.4, 0.3, 0.9, -0.2, 0.5, -0.7, 0.0];
        let daily: Vec<_> = sentiment
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let ret = if i == 0 { 0.0 } else { sentiment[i - 1] * 2.0 };
                aggregate(i as u32 + 1, s, ret)
            })
            .collect();

        let lagged = lagged_correlations(&daily, 3);
        assert_eq!(lagged[0].lag, 0);
        let best = strongest_lag(&lagged).unwrap();
        assert_eq!(best.lag, 1);
        assert!((best.correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_correlation_strength() {
        assert_eq!(classify_correlation_strength(0.8), "strong");
        assert_eq!(classify_correlation_strength(0.5), "moderate");
        assert_eq!(classify_correlation_strength(0.2), "weak");
        assert_eq!(classify_correlation_strength(-0.75), "strong");
    }

    #[test]
    fn test_rolling_mean_of_sentiment() {
        let daily = vec![aggregate(1, 0.3, 0.0), aggregate(2, 0.1, 0.0), aggregate(3, -0.1, 0.0)];
        let rolling = rolling_mean(&daily, 2);
        assert_eq!(rolling[0], None);
        assert!((rolling[1].unwrap() - 0.2).abs() < 1e-12);
        assert!((rolling[2].unwrap() - 0.0).abs() < 1e-12);
    }
}
