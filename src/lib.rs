//! Trade-record ingestion pipeline with per-instrument metrics
//!
//! One producer parses a delimited trade file, folds each record into a
//! run-local metrics book, and dispatches fixed-size batches to a pool of
//! writer workers over a bounded channel. First failure cancels the run;
//! the metrics book is flushed to the sink only after every batch has been
//! acknowledged.

pub mod app;
pub mod domain;
pub mod io;
pub mod pipeline;
pub mod prelude;
pub mod sink;
