//! CoinMarketCap market data client
//!
//! Fetches coin listings, coin metadata, historical quotes and historical
//! OHLCV candles from the CoinMarketCap Pro API, and reshapes the historical
//! payloads into flat tables with normalized timestamps.
//!
//! ## Example
//! ```no_run
//! use coinmarket_data::{ClientConfig, CoinMarketCapClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("api_key").with_sandbox(false);
//!     let client = CoinMarketCapClient::new(config)?;
//!
//!     let candles = client.get_ohlcv_from_id(1, None).await?;
//!     println!("Fetched {} daily candles", candles.len());
//!     Ok(())
//! }
//! ```

pub mod coinmarketcap;
pub mod config;
pub mod error;
pub mod table;
pub mod timeutil;
pub mod utils;

pub use coinmarketcap::{CoinMarketCapClient, QuoteData, Transport};
pub use config::{ApiTier, ClientConfig, Environment, FileConfig};
pub use error::{ClientError, ClientResult};
pub use table::Table;
pub use timeutil::{convert_datetime_precision, convert_to_day_begin, DateRange, Precision};
pub use utils::{parse_list_to_string, split_list};
