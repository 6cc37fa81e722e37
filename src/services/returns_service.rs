use crate::models::PriceRecord;
use tracing::info;

/// Percent change versus the previous element:
/// `(close[t] - close[t-1]) / close[t-1] * 100`.
///
/// The first element is `None`, as is any element whose previous close is
/// zero or not finite.
pub fn pct_change(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(closes.windows(2).map(|w| {
        let (prev, current) = (w[0], w[1]);
        if prev == 0.0 || !prev.is_finite() || !current.is_finite() {
            None
        } else {
            Some((current - prev) / prev * 100.0)
        }
    }));
    out
}

/// Fill `daily_return` on every row.
///
/// Rows are first sorted by (company, date) so each return is measured against
/// the same company's previous trading day; the first day of each company has
/// no return.
pub fn calculate_daily_returns(prices: &mut [PriceRecord]) {
    prices.sort_by(|a, b| a.company.cmp(&b.company).then(a.date.cmp(&b.date)));

    let mut start = 0;
    while start < prices.len() {
        let company = prices[start].company.clone();
        let end = prices[start..]
            .iter()
            .position(|p| p.company != company)
            .map(|offset| start + offset)
            .unwrap_or(prices.len());

        let closes: Vec<f64> = prices[start..end].iter().map(|p| p.close).collect();
        for (record, ret) in prices[start..end].iter_mut().zip(pct_change(&closes)) {
            record.daily_return = ret;
        }
        start = end;
    }

    info!("💹 Computed daily returns for {} price rows", prices.len());
}
