use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use super::Upstream;
use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{HealthStatus, SeriesRequest, SeriesSource, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpRequest};
use crate::provider_policy::ProviderPolicy;
use crate::retry::RetryConfig;
use crate::throttling::Throttle;
use crate::{PricePoint, ProviderId, TimeSeries};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Alpha Vantage `TIME_SERIES_DAILY` adapter.
///
/// The payload is a date-keyed object listed newest first with closes encoded
/// as strings. Throttle notes arrive as HTTP 200 with a `Note` or
/// `Information` key and no series.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    upstream: Upstream,
    base_url: String,
    api_key: String,
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        let mut upstream = Upstream::new(ProviderId::Alphavantage, http_client);
        upstream.set_throttle(Throttle::from_policy(&ProviderPolicy::alphavantage_default()));
        Self {
            upstream,
            base_url: String::from(ProviderId::Alphavantage.default_base_url()),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.upstream.set_throttle(throttle);
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

    fn series_url(&self, req: &SeriesRequest) -> String {
        // compact = latest 100 sessions
        let output_size = if req.sessions <= 100 { "compact" } else { "full" };
        format!(
            "{}/query?function=TIME_SERIES_DAILY&symbol={}&outputsize={}&apikey={}",
            self.base_url,
            urlencoding::encode(req.symbol.as_str()),
            output_size,
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch_series(&self, req: SeriesRequest) -> Result<TimeSeries, SourceError> {
        let request = HttpRequest::get(self.series_url(&req));
        let response = self.upstream.get(request, "time_series_daily").await?;
        parse_daily_series(&response.body)
    }
}

impl SeriesSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
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

fn parse_daily_series(body: &str) -> Result<TimeSeries, SourceError> {
    let response: HashMap<String, Value> = serde_json::from_str(body).map_err(|e| {
        SourceError::malformed_payload(format!("failed to parse alphavantage series: {e}"))
    })?;

    if let Some(message) = response.get("Error Message").and_then(Value::as_str) {
        return Err(SourceError::invalid_request(format!(
            "alphavantage rejected symbol: {message}"
        )));
    }
    if let Some(note) = response
        .get("Note")
        .or_else(|| response.get("Information"))
        .and_then(Value::as_str)
    {
        return Err(SourceError::rate_limited(format!("alphavantage: {note}")));
    }

    let series = response
        .iter()
        .find(|(key, _)| key.starts_with("Time Series"))
        .map(|(_, value)| value.clone())
        .ok_or_else(|| SourceError::malformed_payload("no time series data in response"))?;
    let sessions: HashMap<String, AlphaVantageDailyBar> = serde_json::from_value(series)
        .map_err(|e| {
            SourceError::malformed_payload(format!("unexpected alphavantage series shape: {e}"))
        })?;

    let mut points = Vec::with_capacity(sessions.len());
    for (date, bar) in sessions {
        let day = time::Date::parse(&date, DATE_FORMAT).map_err(|e| {
            SourceError::malformed_payload(format!("invalid session date '{date}': {e}"))
        })?;
        let timestamp = day.midnight().assume_utc().unix_timestamp();
        let close = bar.close.as_deref().and_then(|raw| raw.trim().parse::<f64>().ok());
        points.push(PricePoint::new(timestamp, close));
    }

    Ok(TimeSeries::new(points))
}

#[derive(Debug, Deserialize)]
struct AlphaVantageDailyBar {
    #[serde(rename = "4. close", default)]
    close: Option<String>,
}
