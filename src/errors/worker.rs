use std::io;
use thiserror::Error;

// Errors raised while a queue worker executes a job. These occur after
// the HTTP response has been sent and never reach the original caller.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Append log write failed: {0}")]
    Sink(#[from] io::Error),
}

pub type ExecResult<T> = Result<T, ExecError>;
