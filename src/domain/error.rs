use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
