//! Series source trait and request/response types.
//!
//! A [`SeriesSource`] is the only thing the batch orchestrator knows about a
//! market-data provider: it turns a symbol into a [`TimeSeries`] of closes.
//! Provider payload quirks (ordering, null sessions, string-encoded numbers,
//! throttle notes) stay inside the adapter.
//!
//! # Example
//!
//! ```rust,ignore
//! use tickerpulse_core::{SeriesRequest, SeriesSource, SourceError, Symbol, YahooAdapter};
//!
//! async fn latest_closes(adapter: &YahooAdapter) -> Result<(), SourceError> {
//!     let request = SeriesRequest::new(Symbol::parse("AAPL")?, 5)?;
//!     let series = adapter.daily_closes(request).await?;
//!     println!("{} sessions", series.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, Symbol, TimeSeries, ValidationError};

/// Health state reported by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub provider: ProviderId,
    pub state: HealthState,
    pub rate_available: bool,
    /// Consecutive upstream failures seen by the circuit breaker.
    pub consecutive_failures: u32,
}

impl HealthStatus {
    pub const fn new(
        provider: ProviderId,
        state: HealthState,
        rate_available: bool,
        consecutive_failures: u32,
    ) -> Self {
        Self {
            provider,
            state,
            rate_available,
            consecutive_failures,
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    MalformedPayload,
    Internal,
}

/// Structured source error; every kind degrades to a default quote record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedPayload,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for a daily close series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub symbol: Symbol,
    /// Trailing sessions the caller needs; adapters may return more.
    pub sessions: usize,
}

impl SeriesRequest {
    pub fn new(symbol: Symbol, sessions: usize) -> Result<Self, ValidationError> {
        if sessions == 0 {
            return Err(ValidationError::EmptyRange);
        }
        Ok(Self { symbol, sessions })
    }
}

/// Boxed future returned by [`SeriesSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Provider adapter contract.
///
/// Implementations must be `Send + Sync`: one adapter instance serves every
/// concurrent symbol lookup of every request.
pub trait SeriesSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches the most recent daily closes for one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, throttled,
    /// rejects the symbol, or answers with a payload that does not contain a
    /// close series.
    fn daily_closes<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> SourceFuture<'a, Result<TimeSeries, SourceError>>;

    /// Returns the current health of this source.
    fn health<'a>(&'a self) -> SourceFuture<'a, HealthStatus>;
}
