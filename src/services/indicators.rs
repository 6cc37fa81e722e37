use crate::models::{IndicatorPoint, PriceRecord};
use std::collections::BTreeMap;

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Running sum; subtract the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

/// Exponential Moving Average (EMA)
///
/// Seeded with the SMA of the first `window` values, then smoothed with
/// `alpha = 2 / (window + 1)`. `None` before the seed.
pub fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut prev = values[..window].iter().sum::<f64>() / window as f64;
    out[window - 1] = Some(prev);

    for (i, &v) in values.iter().enumerate().skip(window) {
        prev = alpha * v + (1.0 - alpha) * prev;
        out[i] = Some(prev);
    }
    out
}

/// Relative Strength Index (RSI)
///
/// Measures momentum by comparing recent gains to recent losses.
/// RSI values range from 0 to 100:
/// - Below 30: Oversold condition
/// - Above 70: Overbought condition
///
/// Average gain/loss start as the plain mean of the first `period` changes
/// and are then Wilder-smoothed (`alpha = 1 / period`).
///
/// Returns `None` for the first `period` values.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return result;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = changes.iter().map(|&c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| (-c).max(0.0)).collect();

    let to_rsi = |avg_gain: f64, avg_loss: f64| {
        if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    };

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    result[period] = Some(to_rsi(avg_gain, avg_loss));

    let alpha = 1.0 / period as f64;
    for i in period..changes.len() {
        avg_gain = alpha * gains[i] + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * losses[i] + (1.0 - alpha) * avg_loss;
        result[i + 1] = Some(to_rsi(avg_gain, avg_loss));
    }

    result
}

/// Moving Average Convergence Divergence (MACD)
///
/// - MACD Line: fast EMA - slow EMA
/// - Signal Line: EMA of the MACD line
/// - Histogram: MACD Line - Signal Line
///
/// Returns: (macd_line, signal_line, histogram), each aligned with `prices`.
pub fn macd(
    prices: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let len = prices.len();
    let fast_ema = ema(prices, fast_period);
    let slow_ema = ema(prices, slow_period);

    let macd_line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(fast, slow)| match (fast, slow) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // Signal is computed over the defined part of the MACD line only
    let first_defined = macd_line.iter().position(Option::is_some).unwrap_or(len);
    let macd_values: Vec<f64> = macd_line[first_defined..].iter().flatten().copied().collect();
    let mut signal_line = vec![None; first_defined];
    signal_line.extend(ema(&macd_values, signal_period));
    signal_line.resize(len, None);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    (macd_line, signal_line, histogram)
}

/// SMA(20), SMA(50), RSI(14) and MACD(12, 26, 9) for each company.
///
/// Every company's rows are ordered by date before the indicators are
/// computed; the output is grouped by company, then ascending by date.
pub fn apply_technical_indicators(prices: &[PriceRecord]) -> Vec<IndicatorPoint> {
    let mut by_company: BTreeMap<&str, Vec<&PriceRecord>> = BTreeMap::new();
    for price in prices {
        by_company.entry(price.company.as_str()).or_default().push(price);
    }

    by_company
        .into_values()
        .flat_map(|mut rows| {
            rows.sort_by_key(|p| p.date);
            let closes: Vec<f64> = rows.iter().map(|p| p.close).collect();

            let ma20 = sma(&closes, 20);
            let ma50 = sma(&closes, 50);
            let rsi14 = rsi(&closes, 14);
            let (macd_line, signal, histogram) = macd(&closes, 12, 26, 9);

            rows.into_iter()
                .enumerate()
                .map(|(i, p)| IndicatorPoint {
                    date: p.date,
                    company: p.company.clone(),
                    close: p.close,
                    ma20: ma20[i],
                    ma50: ma50[i],
                    rsi14: rsi14[i],
                    macd: macd_line[i],
                    macd_signal: signal[i],
                    macd_histogram: histogram[i],
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
