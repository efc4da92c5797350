//! # Tickerpulse Core
//!
//! Quote delta calculation, upstream provider adapters and batch orchestration
//! for the tickerpulse quote proxy.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo chart, Alpha Vantage daily) |
//! | [`calculator`] | Daily and multi-session percent change over a close series |
//! | [`circuit_breaker`] | Circuit breaker guarding upstream calls |
//! | [`config`] | Provider and orchestration settings |
//! | [`data_source`] | Series source trait, requests, health and errors |
//! | [`domain`] | Symbols, price series and quote records |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction and fixtures |
//! | [`orchestrator`] | Concurrent per-symbol batch quoting |
//! | [`provider_policy`] | Concurrency and quota defaults per provider |
//! | [`retry`] | Retry and backoff policy |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Local rate limiting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerpulse_core::{ProviderConfig, QuoteService, QuoteServiceConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = ProviderConfig::default().build_source(Arc::new(ReqwestHttpClient::new()))?;
//!     let service = QuoteService::new(source, QuoteServiceConfig::default());
//!
//!     for record in service.quote_batch(&["AAPL".into(), "MSFT".into()]).await {
//!         println!("{} {} {}%", record.symbol, record.price, record.change);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Lookups never fail as a whole. Upstream problems surface as
//! [`SourceError`] values inside an adapter and are folded into a default
//! record by the orchestrator:
//!
//! ```rust
//! use tickerpulse_core::{SourceError, SourceErrorKind};
//!
//! fn describe(error: &SourceError) -> &'static str {
//!     match error.kind() {
//!         SourceErrorKind::RateLimited => "provider throttled the call",
//!         SourceErrorKind::InvalidRequest => "provider rejected the symbol",
//!         _ => "provider unavailable",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys and cookies are redacted from `Debug` output and never logged
//! - Symbols are validated before any URL is built

pub mod adapters;
pub mod calculator;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod orchestrator;
pub mod provider_policy;
pub mod retry;
pub mod source;
pub mod throttling;

// Adapter implementations
pub use adapters::{AlphaVantageAdapter, YahooAdapter};

// Calculation
pub use calculator::{compute_quote, format_fixed2, percent_change, LookbackWindow};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Configuration
pub use config::{ProviderConfig, QuoteServiceConfig, DEFAULT_LOOKUP_TIMEOUT};

// Series source trait and types
pub use data_source::{
    HealthState, HealthStatus, SeriesRequest, SeriesSource, SourceError, SourceErrorKind,
    SourceFuture,
};

// Domain models
pub use domain::{PricePoint, QuoteRecord, Symbol, TimeSeries, ZERO_FIXED};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest,
    HttpResponse, ReqwestHttpClient,
};

// Orchestration
pub use orchestrator::QuoteService;

// Provider policies
pub use provider_policy::{ProviderPolicy, Quota};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::Throttle;
