use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A single executed trade, parsed from one input row
///
/// Records are immutable once constructed; the pipeline only ever moves
/// them into batches and folds them into the metrics book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub instrument_code: String,
    pub trade_price: Decimal,
    pub trade_quantity: u64,
    /// Opaque time-of-close label from the source file; never parsed
    pub close_time: String,
    pub trade_date: NaiveDate,
}

impl TradeRecord {
    pub fn new(
        instrument_code: impl Into<String>,
        trade_price: Decimal,
        trade_quantity: u64,
        close_time: impl Into<String>,
        trade_date: NaiveDate,
    ) -> Self {
        Self {
            instrument_code: instrument_code.into(),
            trade_price,
            trade_quantity,
            close_time: close_time.into(),
            trade_date,
        }
    }
}

/// Bounded-size ordered group of trades dispatched to a worker as one unit
pub type Batch = Vec<TradeRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn trade_record_creation() {
        let trade = TradeRecord::new(
            "GOOG",
            Decimal::new(2950, 2),
            11,
            "100000",
            date("2024-06-20"),
        );

        assert_eq!(trade.instrument_code, "GOOG");
        assert_eq!(trade.trade_price, Decimal::new(2950, 2));
        assert_eq!(trade.trade_quantity, 11);
        assert_eq!(trade.close_time, "100000");
        assert_eq!(trade.trade_date, date("2024-06-20"));
    }

    #[test]
    fn trade_record_is_clonable() {
        let trade = TradeRecord::new("PETR4", Decimal::ONE, 1, "093000", date("2024-01-02"));
        let cloned = trade.clone();
        assert_eq!(trade, cloned);
    }
}
