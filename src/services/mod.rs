pub mod aggregation_service;
pub mod analytics_service;
pub mod cleaning_service;
pub mod correlation_service;
pub mod csv_import_service;
pub mod indicators;
pub mod job_runner_service;
pub mod news_eda_service;
pub mod returns_service;
pub mod sentiment_service;
pub mod topic_service;
