use thiserror::Error;
use tokio::task::JoinError;

use crate::io::IoError;
use crate::sink::SinkError;

/// Errors that decide the outcome of one ingestion run
///
/// A run returns exactly one of these. Parse and sink errors are specific
/// and win over `Cancelled`, which is reported only when nothing more
/// precise was captured before the cancellation signal fired.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("read error: {0}")]
    Read(#[from] IoError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("ingestion cancelled")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Join(#[from] JoinError),
}

impl PipelineError {
    /// Whether this error carries run-specific detail beyond cancellation
    pub fn is_specific(&self) -> bool {
        !matches!(self, PipelineError::Cancelled)
    }
}
