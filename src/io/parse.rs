use std::str::FromStr;

use chrono::NaiveDate;
use csv_async::StringRecord;
use rust_decimal::Decimal;

use super::error::ParseError;
use crate::domain::TradeRecord;

// Column layout of the source file (0-based). The file carries more
// columns than the pipeline consumes; only these five matter.
const COL_INSTRUMENT: usize = 1;
const COL_PRICE: usize = 3;
const COL_QUANTITY: usize = 4;
const COL_CLOSE_TIME: usize = 5;
const COL_TRADE_DATE: usize = 8;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse one raw CSV row into a `TradeRecord`
///
/// The price field uses a comma decimal separator; only the first comma is
/// normalized to a period, so a second comma still fails numeric parsing.
/// The date must match `%Y-%m-%d` exactly. No field gets a default.
pub fn parse_record(record: &StringRecord) -> Result<TradeRecord, ParseError> {
    let instrument_code = field(record, COL_INSTRUMENT)?;
    let raw_price = field(record, COL_PRICE)?;
    let raw_quantity = field(record, COL_QUANTITY)?;
    let close_time = field(record, COL_CLOSE_TIME)?;
    let raw_date = field(record, COL_TRADE_DATE)?;

    let normalized = raw_price.replacen(',', ".", 1);
    let trade_price = Decimal::from_str(&normalized)
        .map_err(|_| ParseError::InvalidPrice(raw_price.to_string()))?;

    let trade_quantity = raw_quantity
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidQuantity(raw_quantity.to_string()))?;

    let trade_date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(raw_date.to_string()))?;

    Ok(TradeRecord::new(
        instrument_code,
        trade_price,
        trade_quantity,
        close_time,
        trade_date,
    ))
}

fn field(record: &StringRecord, index: usize) -> Result<&str, ParseError> {
    record.get(index).ok_or(ParseError::MissingField(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn valid_row() -> StringRecord {
        row(&[
            "2024-06-20",
            "GOOG",
            "0",
            "29,50",
            "11",
            "100000",
            "42",
            "1",
            "2024-06-20",
        ])
    }

    #[test]
    fn parses_valid_row() {
        let trade = parse_record(&valid_row()).unwrap();

        assert_eq!(trade.instrument_code, "GOOG");
        assert_eq!(trade.trade_price, Decimal::new(2950, 2));
        assert_eq!(trade.trade_quantity, 11);
        assert_eq!(trade.close_time, "100000");
        assert_eq!(
            trade.trade_date,
            NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()
        );
    }

    #[test]
    fn normalizes_only_first_comma() {
        // "1,000,5" -> "1.000,5", which is not a valid decimal
        let record = row(&["x", "GOOG", "0", "1,000,5", "11", "100000", "42", "1", "2024-06-20"]);
        let result = parse_record(&record);
        assert!(matches!(result, Err(ParseError::InvalidPrice(_))));
    }

    #[test]
    fn accepts_period_decimal_price() {
        let record = row(&["x", "GOOG", "0", "29.50", "11", "100000", "42", "1", "2024-06-20"]);
        let trade = parse_record(&record).unwrap();
        assert_eq!(trade.trade_price, Decimal::new(2950, 2));
    }

    #[test]
    fn rejects_garbage_price() {
        let record = row(&["x", "GOOG", "0", "1j,000", "11", "100000", "42", "1", "2024-06-20"]);
        let result = parse_record(&record);
        assert_eq!(result, Err(ParseError::InvalidPrice("1j,000".to_string())));
    }

    #[test]
    fn rejects_negative_quantity() {
        let record = row(&["x", "GOOG", "0", "29,50", "-3", "100000", "42", "1", "2024-06-20"]);
        let result = parse_record(&record);
        assert_eq!(result, Err(ParseError::InvalidQuantity("-3".to_string())));
    }

    #[test]
    fn rejects_non_numeric_quantity() {
        let record = row(&["x", "GOOG", "0", "29,50", "many", "100000", "42", "1", "2024-06-20"]);
        assert!(matches!(
            parse_record(&record),
            Err(ParseError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn rejects_malformed_date() {
        let record = row(&["x", "GOOG", "0", "29,50", "11", "100000", "42", "1", "20/06/2024"]);
        let result = parse_record(&record);
        assert_eq!(
            result,
            Err(ParseError::InvalidDate("20/06/2024".to_string()))
        );
    }

    #[test]
    fn rejects_date_with_wrong_calendar_values() {
        let record = row(&["x", "GOOG", "0", "29,50", "11", "100000", "42", "1", "2024-02-30"]);
        assert!(matches!(
            parse_record(&record),
            Err(ParseError::InvalidDate(_))
        ));
    }

    #[test]
    fn rejects_row_missing_trailing_columns() {
        let record = row(&["x", "GOOG", "0", "29,50", "11", "100000", "42", "1"]);
        let result = parse_record(&record);
        assert_eq!(result, Err(ParseError::MissingField(COL_TRADE_DATE)));
    }

    #[test]
    fn rejects_short_row() {
        let record = row(&["2024-06-20", "GOOG", "0", "29,50", "11"]);
        let result = parse_record(&record);
        assert_eq!(result, Err(ParseError::MissingField(COL_CLOSE_TIME)));
    }

    #[test]
    fn zero_quantity_is_valid() {
        let record = row(&["x", "GOOG", "0", "29,50", "0", "100000", "42", "1", "2024-06-20"]);
        let trade = parse_record(&record).unwrap();
        assert_eq!(trade.trade_quantity, 0);
    }
}
