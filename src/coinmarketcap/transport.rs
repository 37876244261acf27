//! HTTP transport
//!
//! The client talks to the network only through [`Transport`], so tests and
//! embedders can swap in their own implementation.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::future::Future;
use tracing::debug;

use super::types::RawResponse;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-cmc_pro_api_key";

/// Issues one GET request and hands back status and body
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = ClientResult<RawResponse>> + Send;
}

/// reqwest-backed transport. Built once, with auth headers and timeout baked in.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ClientError::Config("API key is not a valid header value".to_string()))?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &[(&str, String)]) -> ClientResult<RawResponse> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!("GET {} -> HTTP {} ({} bytes)", url, status, body.len());
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let config = ClientConfig::new("test_key");
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[test]
    fn test_rejects_unprintable_key() {
        let config = ClientConfig::new("bad\nkey");
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ClientError::Config(_))
        ));
    }
}
