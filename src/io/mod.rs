pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod parse;

// Re-export commonly used types
pub use csv_reader::CsvTradeStream;
pub use csv_writer::write_metrics_snapshot;
pub use error::{IoError, ParseError};
pub use parse::parse_record;
