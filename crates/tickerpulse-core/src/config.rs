//! Explicit configuration values for the quote proxy.
//!
//! Nothing in the core reads the environment. The server binary folds its CLI
//! and env settings into these values and hands them to
//! [`ProviderConfig::build_source`] and [`QuoteService::new`](crate::QuoteService::new).

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{AlphaVantageAdapter, YahooAdapter};
use crate::calculator::LookbackWindow;
use crate::data_source::SeriesSource;
use crate::http_client::{HttpAuth, HttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::retry::RetryConfig;
use crate::{ProviderId, ValidationError};

/// Upstream provider settings.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    /// Overrides [`ProviderId::default_base_url`].
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Session cookie sent with Yahoo chart requests.
    pub cookie: Option<String>,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(ProviderId::Yahoo)
    }
}

// Hand-written so API keys and cookies never end up in logs.
impl Debug for ProviderConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cookie", &self.cookie.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            base_url: None,
            api_key: None,
            cookie: None,
            timeout_ms: 10_000,
            retry: RetryConfig::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn policy(&self) -> ProviderPolicy {
        ProviderPolicy::default_for(self.provider)
    }

    /// Builds the adapter for the configured provider on top of `http_client`.
    pub fn build_source(
        &self,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Arc<dyn SeriesSource>, ValidationError> {
        match self.provider {
            ProviderId::Yahoo => {
                let auth = self
                    .cookie
                    .clone()
                    .map_or(HttpAuth::None, HttpAuth::Cookie);
                Ok(Arc::new(
                    YahooAdapter::new(http_client)
                        .with_base_url(self.base_url())
                        .with_auth(auth)
                        .with_retry(self.retry.clone())
                        .with_timeout_ms(self.timeout_ms),
                ))
            }
            ProviderId::Alphavantage => {
                let api_key = self
                    .api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .ok_or(ValidationError::MissingApiKey {
                        provider: ProviderId::Alphavantage.as_str(),
                    })?;
                Ok(Arc::new(
                    AlphaVantageAdapter::new(http_client, api_key)
                        .with_base_url(self.base_url())
                        .with_retry(self.retry.clone())
                        .with_timeout_ms(self.timeout_ms),
                ))
            }
        }
    }
}

/// Batch orchestration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteServiceConfig {
    pub window: LookbackWindow,
    /// Upper bound on concurrent series fetches per batch.
    pub max_concurrency: usize,
    /// Wall-clock budget for one symbol, retries and permit wait included.
    /// Must stay under any request timeout wrapped around a batch.
    pub lookup_timeout: Duration,
}

/// Default per-symbol budget, under the server's 15 s request timeout.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(12);

impl Default for QuoteServiceConfig {
    fn default() -> Self {
        Self {
            window: LookbackWindow::default(),
            max_concurrency: ProviderPolicy::yahoo_default().max_concurrency,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }
}

impl QuoteServiceConfig {
    pub fn new(window: LookbackWindow, max_concurrency: usize) -> Result<Self, ValidationError> {
        if max_concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }
        Ok(Self {
            window,
            max_concurrency,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        })
    }

    /// Uses the provider policy's concurrency bound.
    pub fn for_policy(window: LookbackWindow, policy: &ProviderPolicy) -> Self {
        Self {
            window,
            max_concurrency: policy.max_concurrency.max(1),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }
}
