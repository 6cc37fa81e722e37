use crate::errors::AppError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    pub ansi: bool,
    pub show_target: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            ansi: lookup("LOG_ANSI")
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            show_target: lookup("LOG_TARGET")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.log_level.trim().is_empty() {
            return Err(AppError::Config("RUST_LOG is set but empty".to_string()));
        }
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| AppError::Config(format!("Invalid RUST_LOG '{}': {}", self.log_level, e)))?;
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ansi: true,
            show_target: false,
        }
    }
}

/// Installs the global subscriber. Logs go to stderr so the printed report on
/// stdout stays machine-readable.
pub fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| AppError::Config(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(config.show_target),
        )
        .try_init()
        .map_err(|e| AppError::Config(format!("Logging already initialised: {}", e)))?;

    tracing::debug!("📊 Console logging initialised at level {}", config.log_level);
    Ok(())
}
