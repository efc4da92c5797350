use std::sync::Arc;

use serde::Deserialize;

use super::Upstream;
use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{HealthStatus, SeriesRequest, SeriesSource, SourceError, SourceFuture};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::retry::RetryConfig;
use crate::{PricePoint, ProviderId, TimeSeries};

/// Yahoo Finance chart adapter (`/v8/finance/chart`).
///
/// The chart endpoint needs no API key. Sessions without trades come back as
/// `null` closes and are kept as absent points.
#[derive(Clone)]
pub struct YahooAdapter {
    upstream: Upstream,
    base_url: String,
    auth: HttpAuth,
}

impl YahooAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            upstream: Upstream::new(ProviderId::Yahoo, http_client),
            base_url: String::from(ProviderId::Yahoo.default_base_url()),
            auth: HttpAuth::None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Sends a fixed session cookie, for deployments that sit behind Yahoo's
    /// consent wall.
    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.upstream.set_retry(retry);
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.upstream.set_circuit_breaker(circuit_breaker);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.upstream.set_timeout_ms(timeout_ms);
        self
    }

    pub fn chart_url(&self, req: &SeriesRequest) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            chart_range(req.sessions)
        )
    }

    async fn fetch_series(&self, req: SeriesRequest) -> Result<TimeSeries, SourceError> {
        let request = HttpRequest::get(self.chart_url(&req))
            .with_header("accept", "application/json")
            .with_auth(&self.auth);
        let response = self.upstream.get(request, "chart").await?;
        parse_chart(&response.body)
    }
}

impl SeriesSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn daily_closes<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> SourceFuture<'a, Result<TimeSeries, SourceError>> {
        Box::pin(self.fetch_series(req))
    }

    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus> {
        Box::pin(async move { self.upstream.health() })
    }
}

/// Smallest chart range that covers `sessions` trading days.
fn chart_range(sessions: usize) -> &'static str {
    match sessions {
        0..=5 => "5d",
        6..=21 => "1mo",
        22..=63 => "3mo",
        64..=126 => "6mo",
        _ => "1y",
    }
}

fn parse_chart(body: &str) -> Result<TimeSeries, SourceError> {
    let response: YahooChartResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::malformed_payload(format!("failed to parse yahoo chart: {e}"))
    })?;

    if let Some(error) = response.chart.error {
        return Err(SourceError::invalid_request(format!(
            "yahoo chart error {}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::malformed_payload("no chart result in response"))?;

    let timestamps = result
        .timestamp
        .ok_or_else(|| SourceError::malformed_payload("chart result has no timestamps"))?;
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|quote| quote.close)
        .ok_or_else(|| SourceError::malformed_payload("chart result has no quote indicators"))?;

    Ok(TimeSeries::new(timestamps.iter().enumerate().map(
        |(index, &timestamp)| PricePoint::new(timestamp, closes.get(index).copied().flatten()),
    )))
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}
