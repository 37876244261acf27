//! Reshape historical payloads into tables

use serde_json::{Map, Value};

use super::types::QuoteData;
use crate::error::{ClientError, ClientResult};
use crate::table::Table;
use crate::timeutil::{convert_datetime_precision, Precision};

/// Parse a `/cryptocurrency/quotes/historical` payload.
///
/// Each row holds the entry's `timestamp` (cut to `YYYY-MM-DD HH`) followed by
/// every metric under `quote.<currency>`.
pub fn parse_quote_data(data: &Value, currency: &str) -> ClientResult<QuoteData> {
    let symbol = data
        .get("symbol")
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::missing("symbol"))?
        .to_string();

    let mut result = flatten_quotes(data, "timestamp", currency)?;
    result.map_column("timestamp", |v| {
        let raw = v
            .as_str()
            .ok_or_else(|| ClientError::InvalidTimestamp(v.to_string()))?;
        convert_datetime_precision(raw, Precision::Hour.code()).map(Value::String)
    })?;

    Ok(QuoteData { symbol, result })
}

/// Parse a `/cryptocurrency/ohlcv/historical` payload.
///
/// `time_close` is copied through untouched.
pub fn parse_ohlcv_data(data: &Value, currency: &str) -> ClientResult<Table> {
    flatten_quotes(data, "time_close", currency)
}

fn flatten_quotes(data: &Value, time_field: &str, currency: &str) -> ClientResult<Table> {
    let quotes = data
        .get("quotes")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::missing("quotes"))?;

    let mut records = Vec::with_capacity(quotes.len());
    for (i, entry) in quotes.iter().enumerate() {
        let time = entry
            .get(time_field)
            .ok_or_else(|| ClientError::missing(format!("quotes[{}].{}", i, time_field)))?;

        let metrics = entry
            .get("quote")
            .and_then(|q| q.get(currency))
            .and_then(Value::as_object)
            .ok_or_else(|| ClientError::missing(format!("quotes[{}].quote.{}", i, currency)))?;

        let mut record = Map::with_capacity(metrics.len() + 1);
        record.insert(time_field.to_string(), time.clone());
        for (key, value) in metrics {
            // The entry-level time is the bucket time. The per-currency
            // `timestamp` is the last update inside that bucket, so it must
            // not replace the row's time.
            if key != time_field {
                record.insert(key.clone(), value.clone());
            }
        }
        records.push(record);
    }

    Ok(Table::from_records(records))
}
