//! Contract every `SeriesSource` adapter must honor, checked against recorded
//! payloads for each provider.

use std::sync::Arc;

use tickerpulse_core::{
    AlphaVantageAdapter, FixtureHttpClient, HealthState, HttpError, HttpResponse, ProviderId,
    RetryConfig, SeriesRequest, SeriesSource, SourceErrorKind, Symbol, Throttle, YahooAdapter,
};

const YAHOO_CHART: &str = r#"{
    "chart": {
        "result": [{
            "meta": {"symbol": "AAPL", "currency": "USD", "exchangeName": "NMS"},
            "timestamp": [1709251200, 1709510400, 1709596800, 1709683200, 1709769600],
            "indicators": {"quote": [{
                "open": [89.5, 94.0, 97.1, 101.0, 104.2],
                "close": [90.0, 95.0, 98.0, 102.0, 105.0]
            }]}
        }],
        "error": null
    }
}"#;

const ALPHAVANTAGE_DAILY: &str = r#"{
    "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": "AAPL"},
    "Time Series (Daily)": {
        "2024-03-07": {"1. open": "104.20", "4. close": "105.00"},
        "2024-03-06": {"1. open": "101.00", "4. close": "102.00"},
        "2024-03-05": {"1. open": "97.10", "4. close": "98.00"},
        "2024-03-04": {"1. open": "94.00", "4. close": "95.00"},
        "2024-03-01": {"1. open": "89.50", "4. close": "90.00"}
    }
}"#;

const ALPHAVANTAGE_UNKNOWN: &str =
    r#"{"Error Message": "Invalid API call. Please retry or visit the documentation for TIME_SERIES_DAILY."}"#;

struct ProviderCase {
    id: ProviderId,
    client: Arc<FixtureHttpClient>,
    source: Arc<dyn SeriesSource>,
}

fn yahoo_case(client: FixtureHttpClient) -> ProviderCase {
    let client = Arc::new(client);
    let source = YahooAdapter::new(client.clone())
        .with_base_url("https://yahoo.test")
        .with_retry(RetryConfig::no_retry());
    ProviderCase {
        id: ProviderId::Yahoo,
        client,
        source: Arc::new(source),
    }
}

fn alphavantage_case(client: FixtureHttpClient) -> ProviderCase {
    let client = Arc::new(client);
    let source = AlphaVantageAdapter::new(client.clone(), "contract-key")
        .with_base_url("https://av.test")
        .with_throttle(Throttle::unlimited())
        .with_retry(RetryConfig::no_retry());
    ProviderCase {
        id: ProviderId::Alphavantage,
        client,
        source: Arc::new(source),
    }
}

fn healthy_cases() -> Vec<ProviderCase> {
    vec![
        yahoo_case(
            FixtureHttpClient::new()
                .with_route("/chart/AAPL?", Ok(HttpResponse::ok_json(YAHOO_CHART))),
        ),
        alphavantage_case(
            FixtureHttpClient::new()
                .with_route("symbol=AAPL&", Ok(HttpResponse::ok_json(ALPHAVANTAGE_DAILY)))
                .with_route("symbol=ZZZZ&", Ok(HttpResponse::ok_json(ALPHAVANTAGE_UNKNOWN))),
        ),
    ]
}

fn failing_cases(response: Result<HttpResponse, HttpError>) -> Vec<ProviderCase> {
    vec![
        yahoo_case(FixtureHttpClient::new().with_route("/chart/", response.clone())),
        alphavantage_case(FixtureHttpClient::new().with_route("/query", response)),
    ]
}

fn request(symbol: &str) -> SeriesRequest {
    SeriesRequest::new(Symbol::parse(symbol).expect("valid symbol"), 5).expect("valid request")
}

#[tokio::test]
async fn every_provider_returns_closes_oldest_first() {
    for case in healthy_cases() {
        let series = case
            .source
            .daily_closes(request("AAPL"))
            .await
            .unwrap_or_else(|error| panic!("{} should return a series: {error}", case.id));

        let closes: Vec<Option<f64>> = series.points().iter().map(|point| point.close).collect();
        assert_eq!(
            closes,
            vec![Some(90.0), Some(95.0), Some(98.0), Some(102.0), Some(105.0)],
            "{} closes",
            case.id
        );
        assert!(
            series.points().windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp),
            "{} timestamps ascending",
            case.id
        );
        assert_eq!(case.source.id(), case.id);
    }
}

#[tokio::test]
async fn every_provider_rejects_unknown_symbols_as_invalid_requests() {
    for case in healthy_cases() {
        let error = case
            .source
            .daily_closes(request("ZZZZ"))
            .await
            .expect_err("unknown symbol should fail");

        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest, "{}", case.id);
        assert!(!error.retryable(), "{}", case.id);
    }
}

#[tokio::test]
async fn every_provider_reports_transport_failures_as_unavailable() {
    for case in failing_cases(Err(HttpError::connect("connection refused"))) {
        let error = case
            .source
            .daily_closes(request("AAPL"))
            .await
            .expect_err("transport failure");

        assert_eq!(error.kind(), SourceErrorKind::Unavailable, "{}", case.id);
        assert_eq!(error.code(), "source.unavailable");
        assert_eq!(case.client.recorded_requests().len(), 1, "{} attempts", case.id);
    }
}

#[tokio::test]
async fn every_provider_reports_garbage_payloads_as_malformed() {
    for case in failing_cases(Ok(HttpResponse::ok_json("<html>maintenance</html>"))) {
        let error = case
            .source
            .daily_closes(request("AAPL"))
            .await
            .expect_err("garbage payload");

        assert_eq!(error.kind(), SourceErrorKind::MalformedPayload, "{}", case.id);
    }
}

#[tokio::test]
async fn every_provider_starts_healthy_and_degrades_after_repeated_failures() {
    for case in failing_cases(Ok(HttpResponse::with_status(503, "unavailable"))) {
        let health = case.source.health().await;
        assert_eq!(health.provider, case.id);
        assert_eq!(health.state, HealthState::Healthy);

        for _ in 0..3 {
            let _ = case.source.daily_closes(request("AAPL")).await;
        }

        let health = case.source.health().await;
        assert_eq!(health.state, HealthState::Unhealthy, "{}", case.id);
        assert!(!health.rate_available);
        assert_eq!(health.consecutive_failures, 3);
    }
}

#[tokio::test]
async fn every_provider_never_puts_credentials_in_error_messages() {
    for case in failing_cases(Ok(HttpResponse::with_status(500, "boom"))) {
        let error = case
            .source
            .daily_closes(request("AAPL"))
            .await
            .expect_err("server error");

        assert!(!error.to_string().contains("contract-key"), "{}", case.id);
    }
}
