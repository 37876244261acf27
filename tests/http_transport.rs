//! HTTP-level tests for the reqwest transport
//!
//! The client is pointed at a local mock server so headers, query strings and
//! the retry loop run over a real connection.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coinmarket_data::coinmarketcap::{HttpTransport, Transport};
use coinmarket_data::{ClientConfig, CoinMarketCapClient};

fn envelope(data: Value) -> Value {
    json!({
        "status": {"timestamp": "2021-01-02T00:00:00.000Z", "error_code": 0,
                   "error_message": null, "elapsed": 5, "credit_count": 1},
        "data": data
    })
}

fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new("test-key")
        .with_base_url(server.uri())
        .with_retry_backoff(Duration::ZERO)
}

#[tokio::test]
async fn test_transport_sends_auth_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/map"))
        .and(header("X-CMC_PRO_API_KEY", "test-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = mock_config(&mock_server);
    let transport = HttpTransport::new(&config).unwrap();
    let url = format!("{}/cryptocurrency/map", config.versioned_url());

    let response = transport.get(&url, &[]).await.unwrap();
    assert_eq!(response.status, 200);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0]
            .headers
            .get("x-cmc_pro_api_key")
            .and_then(|v| v.to_str().ok()),
        Some("test-key")
    );
}

#[tokio::test]
async fn test_quotes_query_parameters() {
    let mock_server = MockServer::start().await;

    let payload = json!({
        "id": 1, "name": "Bitcoin", "symbol": "BTC",
        "quotes": [{"timestamp": "2021-01-01T06:00:00.000Z",
                    "quote": {"EUR": {"price": 24010.5, "volume_24h": 3.1e10}}}]
    });

    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/quotes/historical"))
        .and(query_param("id", "1"))
        .and(query_param("time_start", "1609459200"))
        .and(query_param("time_end", "1609545600"))
        .and(query_param("interval", "6h"))
        .and(query_param("convert", "EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(payload)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CoinMarketCapClient::new(mock_config(&mock_server)).unwrap();
    let quotes = client
        .get_market_quotes_from_id(1, Some(1_609_459_200), Some(1_609_545_600), Some("EUR"))
        .await
        .unwrap();

    assert_eq!(quotes.symbol, "BTC");
    assert_eq!(quotes.result.get(0, "timestamp"), Some(&json!("2021-01-01 06")));
}

#[tokio::test]
async fn test_ohlcv_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/ohlcv/historical"))
        .and(query_param("id", "1027"))
        .and(query_param("interval", "1d"))
        .and(query_param("convert", "USD"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({"symbol": "ETH", "quotes": []}))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CoinMarketCapClient::new(mock_config(&mock_server)).unwrap();
    let table = client.get_ohlcv_from_id(1027, None).await.unwrap();
    assert!(table.is_empty());
}

#[tokio::test]
async fn test_rate_limited_then_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/map"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "status": {"error_code": 1008,
                       "error_message": "You've exceeded your API Key's HTTP request rate limit."}
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/map"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            {"id": 1, "name": "Bitcoin", "symbol": "BTC", "is_active": 1}
        ]))))
        .mount(&mock_server)
        .await;

    let client = CoinMarketCapClient::new(mock_config(&mock_server)).unwrap();
    let entries = client.get_coin_map().await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].symbol, "BTC");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rate_limited_until_budget_spent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/info"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .mount(&mock_server)
        .await;

    let client = CoinMarketCapClient::new(mock_config(&mock_server)).unwrap();
    let err = client.get_meta_data_from_id(1).await.unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}
