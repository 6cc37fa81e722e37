use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },
    #[error("Could not parse date value '{0}'")]
    DateParse(String),
    #[error("Insufficient data: {0}")]
    EmptyResult(String),
    #[error("Correlation undefined: {0}")]
    UndefinedCorrelation(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn missing_column(column: impl Into<String>, source_name: impl Into<String>) -> Self {
        AppError::MissingColumn {
            column: column.into(),
            source_name: source_name.into(),
        }
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
