// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tenant not found: {0}")]
    TenantNotFound(i64),

    #[error("Tenant context error: {0}")]
    Context(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// sqlx::Error conversion lives in infra-sqlite as AppError::Database(String)
