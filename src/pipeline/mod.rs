pub mod config;
pub mod coordinator;
pub mod error;
pub mod worker;

// Re-export commonly used types
pub use config::{ConfigError, IngestConfig};
pub use coordinator::{IngestPipeline, IngestSummary};
pub use error::PipelineError;
