//! Provider adapters.
//!
//! Each adapter owns an [`Upstream`] call path: circuit breaker gate, local
//! throttle, request with timeout, bounded retries, breaker bookkeeping. The
//! adapters themselves only build URLs and turn payloads into a
//! [`TimeSeries`](crate::TimeSeries).

mod alphavantage;
mod yahoo;

pub use alphavantage::AlphaVantageAdapter;
pub use yahoo::YahooAdapter;

use std::sync::Arc;

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::data_source::{HealthState, HealthStatus, SourceError};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::retry::RetryConfig;
use crate::throttling::Throttle;
use crate::ProviderId;

/// Shared upstream call path used by every adapter.
#[derive(Clone)]
pub(crate) struct Upstream {
    provider: ProviderId,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    throttle: Throttle,
    timeout_ms: u64,
}

impl Upstream {
    pub(crate) fn new(provider: ProviderId, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            provider,
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::for_provider(provider)),
            retry: RetryConfig::default(),
            throttle: Throttle::unlimited(),
            timeout_ms: 10_000,
        }
    }

    pub(crate) fn set_circuit_breaker(&mut self, circuit_breaker: Arc<CircuitBreaker>) {
        self.circuit_breaker = circuit_breaker;
    }

    pub(crate) fn set_retry(&mut self, retry: RetryConfig) {
        self.retry = retry;
    }

    pub(crate) fn set_throttle(&mut self, throttle: Throttle) {
        self.throttle = throttle;
    }

    pub(crate) fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
    }

    pub(crate) fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Issues `request` and returns a 2xx response.
    ///
    /// The breaker sees one outcome per call, however many attempts the retry
    /// policy spends on it, so one stubborn symbol cannot open the circuit for
    /// its siblings. `label` identifies the call in logs; it must not contain
    /// credentials.
    pub(crate) async fn get(
        &self,
        request: HttpRequest,
        label: &str,
    ) -> Result<HttpResponse, SourceError> {
        let provider = self.provider;
        let request = request.with_timeout_ms(self.timeout_ms);
        let mut attempt: u32 = 0;

        loop {
            if !self.circuit_breaker.allow_request() {
                return Err(SourceError::unavailable(format!(
                    "{provider} circuit breaker is open; skipping upstream call"
                )));
            }

            if let Err(wait) = self.throttle.acquire() {
                return Err(SourceError::rate_limited(format!(
                    "{provider} request budget exhausted; retry in {:.2}s",
                    wait.as_secs_f64()
                )));
            }

            match self.http_client.execute(request.clone()).await {
                Ok(response) if response.is_success() => {
                    self.circuit_breaker.record_success();
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status;
                    if !self.retry.should_retry_status(status) {
                        // The provider answered; a 4xx says nothing about its health.
                        self.circuit_breaker.record_success();
                        return Err(status_error(provider, status));
                    }

                    if !self.retry.can_retry(attempt) {
                        self.circuit_breaker.record_failure();
                        return Err(status_error(provider, status));
                    }
                    tracing::debug!(provider = %provider, call = label, status, attempt, "retrying upstream call");
                }
                Err(error) => {
                    if !(self.retry.should_retry_error(&error) && self.retry.can_retry(attempt)) {
                        self.circuit_breaker.record_failure();
                        return Err(SourceError::unavailable(format!(
                            "{provider} transport error: {}",
                            error.message()
                        )));
                    }
                    tracing::debug!(provider = %provider, call = label, error = %error, attempt, "retrying upstream call");
                }
            }

            tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
            attempt += 1;
        }
    }

    pub(crate) fn health(&self) -> HealthStatus {
        let (state, rate_available) = match self.circuit_breaker.state() {
            CircuitState::Closed => (HealthState::Healthy, true),
            CircuitState::HalfOpen => (HealthState::Degraded, true),
            CircuitState::Open => (HealthState::Unhealthy, false),
        };
        HealthStatus::new(
            self.provider,
            state,
            rate_available,
            self.circuit_breaker.consecutive_failures(),
        )
    }
}

fn status_error(provider: ProviderId, status: u16) -> SourceError {
    match status {
        404 => SourceError::invalid_request(format!("{provider} has no data for this symbol")),
        429 => SourceError::rate_limited(format!("{provider} returned status 429")),
        400..=499 => SourceError::invalid_request(format!("{provider} returned status {status}")),
        _ => SourceError::unavailable(format!("{provider} returned status {status}")),
    }
}
