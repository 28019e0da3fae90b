pub mod metrics;
pub mod trade;

// Re-export commonly used types
pub use metrics::{InstrumentMetrics, MetricsBook};
pub use trade::{Batch, TradeRecord};
