//! CoinMarketCap API client
//!
//! Wraps the historical and reference endpoints of the Pro API:
//! - Fixed-delay retry on non-200 responses
//! - Envelope extraction into a typed result
//! - Quote and OHLCV payloads reshaped into tables
//!
//! # Example
//!
//! ```no_run
//! use coinmarket_data::config::ClientConfig;
//! use coinmarket_data::coinmarketcap::CoinMarketCapClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::new("api_key").with_tier("professional");
//!     let client = CoinMarketCapClient::new(config)?;
//!
//!     let quotes = client.get_market_quotes_from_id(1, None, None, None).await?;
//!     println!("{}: {} rows", quotes.symbol, quotes.result.len());
//!     Ok(())
//! }
//! ```

use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::parser::{parse_ohlcv_data, parse_quote_data};
use super::transport::{HttpTransport, Transport};
use super::types::{CoinMapEntry, Envelope, QuoteData, RawResponse};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::table::Table;
use crate::timeutil::DateRange;
use crate::utils::{parse_list_to_string, split_list};

/// Currency used when the caller does not pick one
pub const DEFAULT_CONVERT: &str = "USD";

/// Interval requested from the quotes endpoint
pub const QUOTES_INTERVAL: &str = "6h";

/// Interval requested from the OHLCV endpoint
pub const OHLCV_INTERVAL: &str = "1d";

pub const MAP_ENDPOINT: &str = "/cryptocurrency/map";
pub const INFO_ENDPOINT: &str = "/cryptocurrency/info";
pub const QUOTES_HISTORICAL_ENDPOINT: &str = "/cryptocurrency/quotes/historical";
pub const OHLCV_HISTORICAL_ENDPOINT: &str = "/cryptocurrency/ohlcv/historical";

/// CoinMarketCap Pro API client
///
/// Requests are issued one at a time. The transport is built once in
/// [`CoinMarketCapClient::new`] and shared by every call.
#[derive(Debug, Clone)]
pub struct CoinMarketCapClient<T: Transport = HttpTransport> {
    transport: T,
    url: String,
    lookback_days: u32,
    default_range: DateRange,
    max_retries: u32,
    retry_backoff: Duration,
}

impl CoinMarketCapClient<HttpTransport> {
    /// Create a client backed by reqwest. No request is sent here.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> CoinMarketCapClient<T> {
    /// Create a client over a custom transport
    pub fn with_transport(config: ClientConfig, transport: T) -> ClientResult<Self> {
        let lookback_days = config.lookback_days();
        let default_range = DateRange::lookback_from_today(lookback_days)?;

        info!(
            "CoinMarketCap client ready: {} (tier '{}', {} day lookback)",
            config.versioned_url(),
            config.tier,
            lookback_days
        );

        Ok(Self {
            transport,
            url: config.versioned_url(),
            lookback_days,
            default_range,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        })
    }

    /// Replace the window used when a call gives no start/end
    pub fn with_default_range(mut self, range: DateRange) -> Self {
        self.default_range = range;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub fn default_range(&self) -> DateRange {
        self.default_range
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `endpoint`, retrying non-200 responses up to `retry` extra times.
    ///
    /// Returns the envelope's `data`. Network errors are not retried.
    pub async fn get_response(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        retry: u32,
    ) -> ClientResult<Value> {
        let url = format!("{}{}", self.url, endpoint);
        debug!("GET {} params={:?}", endpoint, params);

        let mut response = self.transport.get(&url, params).await?;
        let mut attempt = 0;

        while !response.is_success() && attempt < retry {
            attempt += 1;
            warn!(
                "{} returned HTTP {} (attempt {}/{}), retrying in {}s",
                endpoint,
                response.status,
                attempt,
                retry + 1,
                self.retry_backoff.as_secs_f64()
            );
            sleep(self.retry_backoff).await;
            response = self.transport.get(&url, params).await?;
        }

        Self::get_response_data(endpoint, response)
    }

    fn get_response_data(endpoint: &str, response: RawResponse) -> ClientResult<Value> {
        if response.is_success() {
            let envelope: Envelope = serde_json::from_str(&response.body)?;
            return envelope.data.ok_or_else(|| ClientError::missing("data"));
        }

        error!(
            "{} failed with HTTP {}: {}",
            endpoint, response.status, response.body
        );

        // Error bodies are usually an envelope too, but not always
        let status = serde_json::from_str::<Envelope>(&response.body)
            .map(|e| e.status)
            .unwrap_or_default();

        Err(ClientError::Api {
            status: response.status,
            error_code: status.error_code,
            message: status
                .error_message
                .unwrap_or_else(|| format!("HTTP {}", response.status)),
            body: response.body,
        })
    }

    /// Raw `/cryptocurrency/map` payload.
    ///
    /// Inactive coins are included; see [`CoinMapEntry::is_active`].
    pub async fn get_ticker_list(&self) -> ClientResult<Value> {
        self.get_response(MAP_ENDPOINT, &[], self.max_retries).await
    }

    /// `/cryptocurrency/map` decoded into typed entries
    pub async fn get_coin_map(&self) -> ClientResult<Vec<CoinMapEntry>> {
        let data = self.get_ticker_list().await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Raw `/cryptocurrency/info` payload for one coin
    pub async fn get_meta_data_from_id(&self, ticker_id: u64) -> ClientResult<Value> {
        self.get_response(
            INFO_ENDPOINT,
            &[("id", ticker_id.to_string())],
            self.max_retries,
        )
        .await
    }

    /// Metadata for many coins, fetched `chunk_size` ids per request.
    ///
    /// The result maps id (as a string) to that coin's metadata object.
    pub async fn get_meta_data_from_ids(
        &self,
        ticker_ids: &[u64],
        chunk_size: usize,
    ) -> ClientResult<Map<String, Value>> {
        let mut merged = Map::new();

        for chunk in split_list(ticker_ids, chunk_size)? {
            let ids = parse_list_to_string(&chunk);
            let data = self
                .get_response(INFO_ENDPOINT, &[("id", ids)], self.max_retries)
                .await?;

            match data {
                Value::Object(entries) => merged.extend(entries),
                _ => return Err(ClientError::missing("data (object keyed by id)")),
            }
        }

        debug!("Fetched metadata for {} coins", merged.len());
        Ok(merged)
    }

    /// Historical quotes at 6h granularity, reshaped into a table.
    ///
    /// Missing bounds fall back to the default range. A start after the end
    /// is only logged; the API decides what to do with it.
    pub async fn get_market_quotes_from_id(
        &self,
        ticker_id: u64,
        time_start: Option<i64>,
        time_end: Option<i64>,
        convert: Option<&str>,
    ) -> ClientResult<QuoteData> {
        let start = time_start.unwrap_or(self.default_range.start);
        let end = time_end.unwrap_or(self.default_range.end);
        let convert = convert.unwrap_or(DEFAULT_CONVERT);

        if start > end {
            warn!(
                "Time period out of range (start {} > end {}), check time input and default time point",
                start, end
            );
        }

        let params = [
            ("id", ticker_id.to_string()),
            ("time_start", start.to_string()),
            ("time_end", end.to_string()),
            ("interval", QUOTES_INTERVAL.to_string()),
            ("convert", convert.to_string()),
        ];

        let data = self
            .get_response(QUOTES_HISTORICAL_ENDPOINT, &params, self.max_retries)
            .await?;
        parse_quote_data(&data, convert)
    }

    /// Daily OHLCV over the default range, reshaped into a table
    pub async fn get_ohlcv_from_id(
        &self,
        ticker_id: u64,
        convert: Option<&str>,
    ) -> ClientResult<Table> {
        let convert = convert.unwrap_or(DEFAULT_CONVERT);
        let params = [
            ("id", ticker_id.to_string()),
            ("time_start", self.default_range.start.to_string()),
            ("time_end", self.default_range.end.to_string()),
            ("interval", OHLCV_INTERVAL.to_string()),
            ("convert", convert.to_string()),
        ];

        let data = self
            .get_response(OHLCV_HISTORICAL_ENDPOINT, &params, self.max_retries)
            .await?;
        parse_ohlcv_data(&data, convert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn test_client_creation() {
        let client = CoinMarketCapClient::new(ClientConfig::new("test_key")).unwrap();
        assert_eq!(client.url(), "https://sandbox-api.coinmarketcap.com/v1");
        assert_eq!(client.lookback_days(), 29);
        assert!(client.default_range().is_ordered());
    }

    #[test]
    fn test_production_professional() {
        let config = ClientConfig::new("test_key")
            .with_environment(Environment::Production)
            .with_tier("professional");
        let client = CoinMarketCapClient::new(config).unwrap();

        assert_eq!(client.url(), "https://pro-api.coinmarketcap.com/v1");
        assert_eq!(client.lookback_days(), 364);
    }

    #[test]
    fn test_unknown_tier_falls_back() {
        let config = ClientConfig::new("test_key").with_tier("enterprise");
        let client = CoinMarketCapClient::new(config).unwrap();
        assert_eq!(client.lookback_days(), 29);
    }

    #[test]
    fn test_response_data_extraction() {
        let ok = RawResponse::new(200, r#"{"status": {"error_code": 0}, "data": {"1": {}}}"#);
        let data = CoinMarketCapClient::<HttpTransport>::get_response_data("/x", ok).unwrap();
        assert!(data.get("1").is_some());

        let missing = RawResponse::new(200, r#"{"status": {"error_code": 0}}"#);
        assert!(matches!(
            CoinMarketCapClient::<HttpTransport>::get_response_data("/x", missing),
            Err(ClientError::MissingField(_))
        ));
    }

    #[test]
    fn test_response_failure_is_typed() {
        let body = r#"{"status": {"error_code": 1002, "error_message": "API key missing."}}"#;
        let err = CoinMarketCapClient::<HttpTransport>::get_response_data(
            "/x",
            RawResponse::new(401, body),
        )
        .unwrap_err();

        match err {
            ClientError::Api {
                status,
                error_code,
                message,
                body: raw,
            } => {
                assert_eq!(status, 401);
                assert_eq!(error_code, Some(1002));
                assert_eq!(message, "API key missing.");
                assert_eq!(raw, body);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_response_failure_non_json_body() {
        let err = CoinMarketCapClient::<HttpTransport>::get_response_data(
            "/x",
            RawResponse::new(502, "<html>Bad Gateway</html>"),
        )
        .unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("HTTP 502"));
    }
}
