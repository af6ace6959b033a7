use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Analytics query failed: {0}")]
    QueryFailed(String),
    #[error("Linkage failed: {details}")]
    Linkage { details: String, query: String },
    #[error("Knowledge base query failed: {0}")]
    Query(String),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
