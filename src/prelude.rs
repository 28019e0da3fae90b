//! Prelude module for convenient imports
//!
//! Import everything you need with: `use quotemetrics::prelude::*;`

// Domain types
pub use crate::domain::{Batch, InstrumentMetrics, MetricsBook, TradeRecord};

// IO types
pub use crate::io::{CsvTradeStream, IoError, ParseError, write_metrics_snapshot};

// Sink types
pub use crate::sink::{MemorySink, QuotationSink, SinkError};

// Pipeline types
pub use crate::pipeline::{
    ConfigError, IngestConfig, IngestPipeline, IngestSummary, PipelineError,
};

// App types
pub use crate::app::{AppError, run_until_shutdown};
