use thiserror::Error;

/// Errors the store surfaces to its callers. Storage failures are
/// deliberately absent: persistence is best-effort and write problems
/// are logged, never raised.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unrecognized task data: {0}")]
    DataFormat(String),
}

pub type AppResult<T> = Result<T, AppError>;
