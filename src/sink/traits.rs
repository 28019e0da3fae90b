use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::SinkError;
use crate::domain::{InstrumentMetrics, TradeRecord};

/// Persistence seam consumed by the ingestion pipeline
///
/// `insert_trades` must be safe to call concurrently from multiple workers
/// and is expected to be atomic per batch. `insert_metrics` is called at
/// most once per run, only after every trade batch has been acknowledged.
#[async_trait]
pub trait QuotationSink: Send + Sync {
    /// Persist one batch of trades (all-or-nothing)
    async fn insert_trades(&self, trades: &[TradeRecord]) -> Result<(), SinkError>;

    /// Persist the complete aggregate map for a run
    async fn insert_metrics(
        &self,
        metrics: &HashMap<String, InstrumentMetrics>,
    ) -> Result<(), SinkError>;

    /// Read path: collapse stored metric rows for a ticker
    ///
    /// Rows older than `since` (by trade date) are excluded when a date is
    /// given. The result takes the maximum of `max_range_value` and the
    /// maximum of `max_daily_volume` across matching rows.
    async fn query_metrics(
        &self,
        ticker: &str,
        since: Option<NaiveDate>,
    ) -> Result<InstrumentMetrics, SinkError>;
}
