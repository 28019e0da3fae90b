use std::io;
use thiserror::Error;

/// A single malformed field in one input row
///
/// Parse failures are fatal to the run; the offending value is carried so
/// the caller can identify the bad field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid trade price: {0}")]
    InvalidPrice(String),

    #[error("invalid trade quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid trade date: {0}")]
    InvalidDate(String),

    #[error("missing field at column {0}")]
    MissingField(usize),
}

/// IO-level errors for CSV reading and record parsing
#[derive(Error, Debug)]
pub enum IoError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}
