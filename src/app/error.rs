use std::io;
use thiserror::Error;

use crate::io::IoError;
use crate::pipeline::{ConfigError, PipelineError};
use crate::sink::SinkError;

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV IO error: {0}")]
    CsvIo(#[from] IoError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}
