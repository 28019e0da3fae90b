use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::trade::TradeRecord;

/// Per-instrument running aggregate for one ingestion run
///
/// Serializes in snapshot column order, ticker first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentMetrics {
    pub ticker: String,
    pub max_range_value: Decimal,
    pub max_daily_volume: u64,
    pub trade_date: NaiveDate,
}

impl InstrumentMetrics {
    /// Seed a fresh aggregate from the first trade seen for a ticker
    pub fn from_trade(trade: &TradeRecord) -> Self {
        Self {
            ticker: trade.instrument_code.clone(),
            max_range_value: trade.trade_price,
            max_daily_volume: trade.trade_quantity,
            trade_date: trade.trade_date,
        }
    }
}

/// Run-local ticker -> metrics map, owned exclusively by the producer
///
/// Workers never see this structure, so no locking is needed. The book
/// lives for exactly one run and is handed to the sink on flush.
#[derive(Debug, Default)]
pub struct MetricsBook {
    metrics: HashMap<String, InstrumentMetrics>,
}

impl MetricsBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed trade into the book
    ///
    /// Unseen tickers get a fresh aggregate. Seen tickers keep the max
    /// price (strictly-greater replacement), accumulate the quantity
    /// (saturating at `u64::MAX`), and take the folded record's date. The
    /// date is last-write-wins rather than max-by-value; the reporting
    /// query collapses rows by MAX so the stored date is informational
    /// only.
    pub fn fold(&mut self, trade: &TradeRecord) {
        match self.metrics.get_mut(&trade.instrument_code) {
            Some(entry) => {
                if trade.trade_price > entry.max_range_value {
                    entry.max_range_value = trade.trade_price;
                }
                entry.max_daily_volume = entry.max_daily_volume.saturating_add(trade.trade_quantity);
                entry.trade_date = trade.trade_date;
            }
            None => {
                self.metrics.insert(
                    trade.instrument_code.clone(),
                    InstrumentMetrics::from_trade(trade),
                );
            }
        }
    }

    pub fn get(&self, ticker: &str) -> Option<&InstrumentMetrics> {
        self.metrics.get(ticker)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentMetrics> {
        self.metrics.values()
    }

    /// Consume the book and hand back the underlying map for flushing
    pub fn into_inner(self) -> HashMap<String, InstrumentMetrics> {
        self.metrics
    }
}
