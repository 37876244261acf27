//! CoinMarketCap Pro API client
//!
//! Authenticated with the `X-CMC_PRO_API_KEY` header. Covers the coin map,
//! coin metadata, historical quotes and historical OHLCV.

pub mod client;
pub mod parser;
pub mod transport;
pub mod types;

pub use client::{CoinMarketCapClient, DEFAULT_CONVERT, OHLCV_INTERVAL, QUOTES_INTERVAL};
pub use parser::{parse_ohlcv_data, parse_quote_data};
pub use transport::{HttpTransport, Transport, API_KEY_HEADER};
pub use types::*;
