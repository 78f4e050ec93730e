// Request-path and worker-path error types, split the same way the
// handlers and the queue workers are.
use thiserror::Error;

pub mod response;
pub mod worker;

pub use worker::{ExecError, ExecResult};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Custom result type for the request path
pub type AppResult<T> = Result<T, AppError>;
