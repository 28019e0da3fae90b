use std::io;
use thiserror::Error;

/// Errors surfaced by the persistence sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("no metrics found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(SinkError::NotFound.to_string(), "no metrics found");
        assert_eq!(
            SinkError::Backend("connection reset".to_string()).to_string(),
            "backend error: connection reset"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let sink_err = SinkError::from(io_err);
        assert!(matches!(sink_err, SinkError::Io(_)));
    }
}
