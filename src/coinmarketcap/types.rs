//! CoinMarketCap API response types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::table::Table;

/// Status block present on every response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub elapsed: Option<i64>,
    #[serde(default)]
    pub credit_count: Option<i64>,
}

/// `{status, data}` wrapper around every payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: ResponseStatus,
    #[serde(default)]
    pub data: Option<Value>,
}

// Some API versions send the error code as a string ("0")
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Status code and body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// One entry of `/cryptocurrency/map`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinMapEntry {
    pub id: u64,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub is_active: Option<i64>,
    #[serde(default)]
    pub rank: Option<u64>,
    #[serde(default)]
    pub first_historical_data: Option<String>,
    #[serde(default)]
    pub last_historical_data: Option<String>,
    #[serde(default)]
    pub platform: Option<Value>,
}

impl CoinMapEntry {
    /// Entries without the flag count as active
    pub fn is_active(&self) -> bool {
        self.is_active.map(|v| v != 0).unwrap_or(true)
    }
}

/// Output of the quote parser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteData {
    pub symbol: String,
    /// One row per timestamp, `timestamp` column at hour precision
    pub result: Table,
}
