use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;

use super::error::SinkError;
use super::traits::QuotationSink;
use crate::domain::{InstrumentMetrics, TradeRecord};

/// DashMap-backed in-memory sink
///
/// Batches are logged under an arrival sequence number; metric flushes are
/// appended per ticker so the read path can collapse rows across runs the
/// same way the reporting query does.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: DashMap<u64, Vec<TradeRecord>>,
    metric_rows: DashMap<String, Vec<InstrumentMetrics>>,
    batch_seq: AtomicU64,
    metric_flushes: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trade batches accepted so far
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total trades across all accepted batches
    pub fn trade_count(&self) -> usize {
        self.batches.iter().map(|b| b.value().len()).sum()
    }

    /// Accepted batches in arrival order
    pub fn batches(&self) -> Vec<Vec<TradeRecord>> {
        let mut entries: Vec<(u64, Vec<TradeRecord>)> = self
            .batches
            .iter()
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, batch)| batch).collect()
    }

    /// How many times `insert_metrics` has been called
    pub fn metric_flush_count(&self) -> usize {
        self.metric_flushes.load(Ordering::SeqCst)
    }

    /// One collapsed metrics row per ticker, for snapshot output
    pub fn snapshot_rows(&self) -> Vec<InstrumentMetrics> {
        self.metric_rows
            .iter()
            .filter_map(|entry| collapse(entry.value().iter(), None))
            .collect()
    }

    /// Tickers with at least one stored metric row
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.metric_rows.iter().map(|e| e.key().clone()).collect();
        tickers.sort();
        tickers
    }
}

#[async_trait]
impl QuotationSink for MemorySink {
    async fn insert_trades(&self, trades: &[TradeRecord]) -> Result<(), SinkError> {
        let seq = self.batch_seq.fetch_add(1, Ordering::SeqCst);
        self.batches.insert(seq, trades.to_vec());
        Ok(())
    }

    async fn insert_metrics(
        &self,
        metrics: &HashMap<String, InstrumentMetrics>,
    ) -> Result<(), SinkError> {
        self.metric_flushes.fetch_add(1, Ordering::SeqCst);
        for (ticker, row) in metrics {
            self.metric_rows
                .entry(ticker.clone())
                .or_default()
                .push(row.clone());
        }
        Ok(())
    }

    async fn query_metrics(
        &self,
        ticker: &str,
        since: Option<NaiveDate>,
    ) -> Result<InstrumentMetrics, SinkError> {
        let rows = self.metric_rows.get(ticker).ok_or(SinkError::NotFound)?;
        collapse(rows.iter(), since).ok_or(SinkError::NotFound)
    }
}

/// Fold metric rows into one result, mirroring the reporting query:
/// MAX of range value and MAX of volume across matching rows
fn collapse<'a>(
    rows: impl Iterator<Item = &'a InstrumentMetrics>,
    since: Option<NaiveDate>,
) -> Option<InstrumentMetrics> {
    let mut result: Option<InstrumentMetrics> = None;
    for row in rows {
        if let Some(cutoff) = since
            && row.trade_date < cutoff
        {
            continue;
        }
        match &mut result {
            Some(acc) => {
                acc.max_range_value = acc.max_range_value.max(row.max_range_value);
                acc.max_daily_volume = acc.max_daily_volume.max(row.max_daily_volume);
                acc.trade_date = acc.trade_date.max(row.trade_date);
            }
            None => result = Some(row.clone()),
        }
    }
    result
}
