use crate::errors::AppError;
use crate::models::Table;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

pub const DATE_COLUMN: &str = "date";

/// Canonical timestamp written by `clean_data`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Canonical calendar date written by `format_date_column`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_ONLY_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a date or timestamp into a timezone-naive timestamp.
///
/// Values carrying a UTC offset keep their local wall-clock time and lose the
/// offset. Returns `None` when no known format matches.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.naive_local());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_ONLY_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    parse_timestamp(value)
        .map(|ts| ts.date())
        .ok_or_else(|| AppError::DateParse(value.to_string()))
}

/// Rename `date_column` to `date`, normalise every date to the canonical
/// naive timestamp and drop all rows holding a null in any column.
///
/// Unparseable dates become null and their rows are dropped. Running this on
/// its own output changes nothing.
pub fn clean_data(mut table: Table, date_column: &str) -> Result<Table, AppError> {
    if date_column != DATE_COLUMN {
        table.rename_column(date_column, DATE_COLUMN);
    }
    let idx = table
        .column_index(DATE_COLUMN)
        .ok_or_else(|| AppError::missing_column(DATE_COLUMN, "table passed to clean_data"))?;

    let unparseable = table.map_column(idx, |cell| {
        parse_timestamp(cell).map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
    });
    if unparseable > 0 {
        warn!("{} date values could not be parsed and were nulled", unparseable);
    }

    let dropped = table.drop_nulls();
    debug!("clean_data dropped {} rows with missing values", dropped);

    Ok(table)
}

/// Reduce a date column to calendar dates (`YYYY-MM-DD`). Rows whose value
/// cannot be parsed are dropped.
pub fn format_date_column(mut table: Table, column: &str) -> Result<Table, AppError> {
    let idx = table
        .column_index(column)
        .ok_or_else(|| AppError::missing_column(column, "table passed to format_date_column"))?;

    let unparseable = table.map_column(idx, |cell| {
        parse_timestamp(cell).map(|ts| ts.date().format(DATE_FORMAT).to_string())
    });
    if unparseable > 0 {
        warn!("{} values in '{}' are not dates; rows dropped", unparseable, column);
        table.drop_nulls();
    }

    Ok(table)
}

/// Drop a leading pandas index column (blank or `Unnamed: N` header).
pub fn drop_index_column(mut table: Table) -> Table {
    let is_index = table
        .columns()
        .first()
        .map(|name| name.is_empty() || name.starts_with("Unnamed"))
        .unwrap_or(false);
    if is_index {
        table.drop_column(0);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn news_table() -> Table {
        Table::from_rows(
            strings(&["", "headline", "publisher", "date"]),
            vec![
                strings(&["0", "Stocks rally", "Benzinga", "2020-06-05 10:30:54-04:00"]),
                strings(&["1", "Shares slip", "Reuters", "not a date"]),
                strings(&["2", "", "Reuters", "2020-06-04"]),
                strings(&["3", "Apple beats", "CNBC", "6/3/2020 14:05"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_timestamp_keeps_wall_clock_time() {
        let ts = parse_timestamp("2020-06-05 10:30:54-04:00").unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2020, 6, 5).unwrap());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2020-06-05T10:30:54Z").is_some());
        assert!(parse_timestamp("2020-06-05").is_some());
        assert!(parse_timestamp("06/05/2020 10:30").is_some());
        assert!(parse_timestamp("2020-06-05 10:30:54.123").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_parse_date_error() {
        assert!(matches!(parse_date("31/31/2020"), Err(AppError::DateParse(_))));
    }

    #[test]
    fn test_clean_data_drops_bad_dates_and_nulls() {
        let table = drop_index_column(news_table());
        let cleaned = clean_data(table, "date").unwrap();

        assert_eq!(cleaned.len(), 2);
        assert_eq!(
            cleaned.column_values("date").unwrap(),
            vec!["2020-06-05T10:30:54", "2020-06-03T14:05:00"]
        );
    }

    #[test]
    fn test_clean_data_renames_date_column() {
        let table = Table::from_rows(
            strings(&["Date", "Close"]),
            vec![strings(&["2020-01-02", "75.09"])],
        )
        .unwrap();
        let cleaned = clean_data(table, "Date").unwrap();
        assert!(cleaned.has_column("date"));
        assert!(!cleaned.has_column("Date"));
    }

    #[test]
    fn test_clean_data_missing_date_column() {
        let table = Table::from_rows(strings(&["Close"]), vec![strings(&["1.0"])]).unwrap();
        assert!(matches!(
            clean_data(table, "Date"),
            Err(AppError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_clean_data_is_idempotent() {
        let once = clean_data(drop_index_column(news_table()), "date").unwrap();
        let twice = clean_data(drop_index_column(once.clone()), "date").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_format_date_column_truncates_to_day() {
        let cleaned = clean_data(drop_index_column(news_table()), "date").unwrap();
        let formatted = format_date_column(cleaned, "date").unwrap();
        assert_eq!(
            formatted.column_values("date").unwrap(),
            vec!["2020-06-05", "2020-06-03"]
        );
        let again = format_date_column(formatted.clone(), "date").unwrap();
        assert_eq!(formatted, again);
    }

    #[test]
    fn test_drop_index_column_only_drops_index() {
        let table = drop_index_column(news_table());
        assert_eq!(table.columns()[0], "headline");
        let unchanged = drop_index_column(table.clone());
        assert_eq!(unchanged, table);
    }
}
