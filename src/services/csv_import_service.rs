use crate::errors::AppError;
use crate::models::{HeadlineRecord, NewsArticle, PriceRecord, StockSource, Table};
use crate::services::cleaning_service::{clean_data, drop_index_column, format_date_column, DATE_COLUMN};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;
use tracing::{error, info, warn};

pub const NEWS_REQUIRED_COLUMNS: [&str; 3] = ["headline", "publisher", "date"];
pub const STOCK_REQUIRED_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

pub const COMPANY_COLUMN: &str = "Company";
pub const TICKER_COLUMN: &str = "Ticker";

#[derive(Debug)]
pub struct StockLoadResult {
    pub table: Table,
    pub loaded: Vec<String>,
    pub errors: Vec<String>,
}

/// Typed price rows plus the per-file load report.
#[derive(Debug)]
pub struct PriceData {
    pub records: Vec<PriceRecord>,
    pub loaded: Vec<String>,
    pub errors: Vec<String>,
}

/// Read a CSV file fully into memory. The first line is the header.
pub fn load_data(path: &Path) -> Result<Table, AppError> {
    let file = File::open(path).map_err(|e| AppError::io(path, e))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(file);

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let width = columns.len();
    let mut table = Table::new(columns);

    for (line_num, result) in reader.records().enumerate() {
        let record = result?;
        // Ragged rows are padded with nulls or cut, like pandas does
        let mut row: Vec<String> = record.iter().take(width).map(|c| c.to_string()).collect();
        if row.len() < width {
            warn!(
                "{}: line {} has {} fields, expected {}",
                path.display(),
                line_num + 2,
                row.len(),
                width
            );
            row.resize(width, String::new());
        }
        table.push_row(row)?;
    }

    info!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

pub fn verify_required_columns(
    table: &Table,
    required: &[&str],
    source_name: &str,
) -> Result<(), AppError> {
    match required.iter().find(|column| !table.has_column(column)) {
        Some(column) => Err(AppError::missing_column(*column, source_name)),
        None => Ok(()),
    }
}

pub fn load_news(path: &Path) -> Result<Table, AppError> {
    let table = load_data(path)?;
    verify_required_columns(&table, &NEWS_REQUIRED_COLUMNS, &path.display().to_string())?;
    Ok(table)
}

/// Load one company's price file and tag every row with its company label.
pub fn load_stock_file(source: &StockSource) -> Result<Table, AppError> {
    let table = load_data(&source.path)?;
    verify_required_columns(
        &table,
        &STOCK_REQUIRED_COLUMNS,
        &source.path.display().to_string(),
    )?;

    // Every file carries a ticker so stacked tables hold no empty cells
    let ticker = source.ticker.as_deref().unwrap_or(&source.company);
    Ok(table
        .with_constant_column(COMPANY_COLUMN, &source.company)
        .with_constant_column(TICKER_COLUMN, ticker))
}

/// Load every stock file and stack them in source order. A file that fails
/// to load is reported and skipped; it is an error only if none load.
pub fn load_and_concatenate_stock_data(
    sources: &[StockSource],
) -> Result<StockLoadResult, AppError> {
    let mut tables = Vec::with_capacity(sources.len());
    let mut loaded = Vec::new();
    let mut errors = Vec::new();

    for source in sources {
        match load_stock_file(source) {
            Ok(table) => {
                loaded.push(source.company.clone());
                tables.push(table);
            }
            Err(e) => {
                error!("Failed to load stock data for {}: {}", source.company, e);
                errors.push(format!("{}: {}", source.company, e));
            }
        }
    }

    if tables.is_empty() {
        return Err(AppError::EmptyResult(format!(
            "none of the {} stock files could be loaded",
            sources.len()
        )));
    }

    let table = Table::concat(tables);
    info!(
        "📈 Combined stock data: {} rows from {} companies",
        table.len(),
        loaded.len()
    );

    Ok(StockLoadResult {
        table,
        loaded,
        errors,
    })
}

fn cleaned_news_table(path: &Path) -> Result<Table, AppError> {
    let table = drop_index_column(load_news(path)?);
    clean_data(table, DATE_COLUMN)
}

/// News rows with their full publication timestamp.
pub fn load_news_articles(path: &Path) -> Result<Vec<NewsArticle>, AppError> {
    cleaned_news_table(path)?.deserialize_rows()
}

/// News rows reduced to calendar days.
pub fn load_headlines(path: &Path) -> Result<Vec<HeadlineRecord>, AppError> {
    let table = format_date_column(cleaned_news_table(path)?, DATE_COLUMN)?;
    let headlines: Vec<HeadlineRecord> = table.deserialize_rows()?;
    info!("📰 Prepared {} headlines from {}", headlines.len(), path.display());
    Ok(headlines)
}

/// Load, stack and clean every stock file into typed rows.
pub fn load_price_records(sources: &[StockSource]) -> Result<PriceData, AppError> {
    let StockLoadResult {
        table,
        loaded,
        errors,
    } = load_and_concatenate_stock_data(sources)?;

    let table = format_date_column(clean_data(table, "Date")?, DATE_COLUMN)?;
    let records: Vec<PriceRecord> = table.deserialize_rows()?;

    Ok(PriceData {
        records,
        loaded,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const APPLE_CSV: &str = "Date,Open,High,Low,Close,Adj Close,Volume\n\
        2020-01-02,74.06,75.15,73.80,75.09,73.06,135480400\n\
        2020-01-03,74.29,75.14,74.13,74.36,72.35,146322800\n";

    #[test]
    fn test_load_data_reads_headers_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "apple.csv", APPLE_CSV);
        let table = load_data(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns()[0], "Date");
        assert_eq!(table.rows()[1][4], "74.36");
    }

    #[test]
    fn test_load_data_missing_file_is_io_error() {
        let err = load_data(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[test]
    fn test_stock_file_tagged_with_company() {
        let dir = TempDir::new().unwrap();
        let source = StockSource {
            company: "Apple".to_string(),
            ticker: Some("AAPL".to_string()),
            path: write_file(&dir, "apple.csv", APPLE_CSV),
        };
        let table = load_stock_file(&source).unwrap();
        assert_eq!(table.column_values(COMPANY_COLUMN).unwrap(), vec!["Apple", "Apple"]);
        assert_eq!(table.column_values(TICKER_COLUMN).unwrap(), vec!["AAPL", "AAPL"]);
    }

    #[test]
    fn test_ticker_defaults_to_company_label() {
        let dir = TempDir::new().unwrap();
        let source = StockSource {
            company: "Tesla".to_string(),
            ticker: None,
            path: write_file(&dir, "tesla.csv", APPLE_CSV),
        };
        let table = load_stock_file(&source).unwrap();
        assert_eq!(table.column_values(TICKER_COLUMN).unwrap(), vec!["Tesla", "Tesla"]);
    }

    #[test]
    fn test_missing_required_column_fails() {
        let dir = TempDir::new().unwrap();
        let source = StockSource {
            company: "Broken".to_string(),
            ticker: None,
            path: write_file(&dir, "broken.csv", "Date,Open,High,Low,Close\n2020-01-02,1,2,0.5,1.5\n"),
        };
        match load_stock_file(&source) {
            Err(AppError::MissingColumn { column, .. }) => assert_eq!(column, "Volume"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_news_requires_headline() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "news.csv", ",title,publisher,date\n0,Hello,Bob,2020-01-02\n");
        assert!(matches!(
            load_news(&path),
            Err(AppError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_concatenate_skips_failed_files() {
        let dir = TempDir::new().unwrap();
        let sources = vec![
            StockSource {
                company: "Apple".to_string(),
                ticker: Some("AAPL".to_string()),
                path: write_file(&dir, "apple.csv", APPLE_CSV),
            },
            StockSource {
                company: "Ghost".to_string(),
                ticker: None,
                path: dir.path().join("ghost.csv"),
            },
        ];

        let result = load_and_concatenate_stock_data(&sources).unwrap();
        assert_eq!(result.table.len(), 2);
        assert_eq!(result.loaded, vec!["Apple".to_string()]);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Ghost"));
    }

    #[test]
    fn test_concatenate_fails_when_nothing_loads() {
        let sources = vec![StockSource {
            company: "Ghost".to_string(),
            ticker: None,
            path: PathBuf::from("/nope/ghost.csv"),
        }];
        assert!(matches!(
            load_and_concatenate_stock_data(&sources),
            Err(AppError::EmptyResult(_))
        ));
    }

    const NEWS_CSV: &str = ",headline,url,publisher,date,stock\n\
        0,Stocks That Hit 52-Week Highs,https://x,Benzinga Insights,2020-06-05 10:30:54-04:00,A\n\
        1,Shares rally,https://y,Lisa Levin,2020-06-04 09:00:00-04:00,AAPL\n\
        2,Broken row,https://z,Lisa Levin,not a date,AAPL\n";

    #[test]
    fn test_load_headlines_cleans_dates() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "news.csv", NEWS_CSV);

        let headlines = load_headlines(&path).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].date.to_string(), "2020-06-05");
        assert_eq!(headlines[0].ticker.as_deref(), Some("A"));
        assert!(headlines[0].sentiment.is_none());

        let articles = load_news_articles(&path).unwrap();
        assert_eq!(articles[0].published_at.to_string(), "2020-06-05 10:30:54");
    }

    #[test]
    fn test_load_price_records() {
        let dir = TempDir::new().unwrap();
        let sources = vec![StockSource {
            company: "Apple".to_string(),
            ticker: Some("AAPL".to_string()),
            path: write_file(&dir, "apple.csv", APPLE_CSV),
        }];

        let data = load_price_records(&sources).unwrap();
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.records[0].company, "Apple");
        assert_eq!(data.records[0].ticker.as_deref(), Some("AAPL"));
        assert_eq!(data.records[1].volume, 146_322_800);
        assert!((data.records[1].close - 74.36).abs() < 1e-9);
        assert!(data.errors.is_empty());
    }
}
