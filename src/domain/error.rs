use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize)]
pub enum AppError {
    #[error("Ingestion failed: {0}")]
    IngestionFailure(String),
    #[error("Query failed: {0}")]
    QueryFailure(String),
    #[error("No data available: {0}")]
    EmptyResult(String),
    #[error("Classifier failed: {0}")]
    ClassifierFailure(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Kinds the reporting screens show as "no data yet" instead of an error.
    pub fn is_no_data(&self) -> bool {
        matches!(self, AppError::EmptyResult(_) | AppError::QueryFailure(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_kind() {
        let err = AppError::IngestionFailure("bad workbook".to_string());
        assert_eq!(err.to_string(), "Ingestion failed: bad workbook");

        let err = AppError::EmptyResult("table missing".to_string());
        assert_eq!(err.to_string(), "No data available: table missing");
    }

    #[test]
    fn test_no_data_kinds() {
        assert!(AppError::EmptyResult(String::new()).is_no_data());
        assert!(AppError::QueryFailure(String::new()).is_no_data());
        assert!(!AppError::ClassifierFailure(String::new()).is_no_data());
        assert!(!AppError::IngestionFailure(String::new()).is_no_data());
    }
}
