//! Quotes and OHLCV commands - historical tables as CSV

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::info;

use coinmarket_data::{convert_to_day_begin, Table};

use crate::ClientArgs;

pub fn run_quotes(
    args: &ClientArgs,
    id: u64,
    start: Option<String>,
    end: Option<String>,
    convert: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let start = start.as_deref().map(parse_time_arg).transpose()?;
    let end = end.as_deref().map(parse_time_arg).transpose()?;

    let client = super::build_client(args)?;
    let rt = tokio::runtime::Runtime::new()?;

    let quotes = rt.block_on(client.get_market_quotes_from_id(
        id,
        start,
        end,
        Some(convert.as_str()),
    ))?;
    info!("{}: {} quote rows", quotes.symbol, quotes.result.len());

    emit(&quotes.result, output)
}

pub fn run_ohlcv(
    args: &ClientArgs,
    id: u64,
    convert: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = super::build_client(args)?;
    let rt = tokio::runtime::Runtime::new()?;

    let candles = rt.block_on(client.get_ohlcv_from_id(id, Some(convert.as_str())))?;
    info!("Coin {}: {} daily candles", id, candles.len());

    emit(&candles, output)
}

fn emit(table: &Table, output: Option<PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            table
                .save_to_csv(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => table.write_csv(std::io::stdout().lock())?,
    }
    Ok(())
}

/// Unix seconds, or a YYYY-MM-DD date taken at local midnight
fn parse_time_arg(s: &str) -> Result<i64> {
    let s = s.trim();
    if let Ok(ts) = s.parse::<i64>() {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid time '{}': use unix seconds or YYYY-MM-DD", s))?;
    Ok(convert_to_day_begin(date)?)
}
