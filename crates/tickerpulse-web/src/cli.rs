//! Command-line and environment settings for the quote proxy server.
//!
//! Every flag can also be supplied through a `TICKERPULSE_*` environment
//! variable, except the Alpha Vantage key which uses the provider's
//! conventional `ALPHAVANTAGE_API_KEY`.
//!
//! # Examples
//!
//! ```bash
//! # Yahoo chart data on the default port
//! tickerpulse
//!
//! # Alpha Vantage with JSON logs
//! ALPHAVANTAGE_API_KEY=... tickerpulse --provider alphavantage --log-format json
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tickerpulse_core::{
    LookbackWindow, ProviderConfig, ProviderId, ProviderPolicy, QuoteServiceConfig, RetryConfig,
    ValidationError,
};

/// Stock quote proxy for the news site ticker.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tickerpulse",
    author,
    version,
    about = "Stock quote proxy: batch percent-change quotes over HTTP"
)]
pub struct Cli {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TICKERPULSE_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Upstream market-data provider.
    #[arg(long, env = "TICKERPULSE_PROVIDER", value_enum, default_value_t = ProviderArg::Yahoo)]
    pub provider: ProviderArg,

    /// Overrides the provider's default base URL.
    #[arg(long, env = "TICKERPULSE_PROVIDER_BASE_URL")]
    pub provider_base_url: Option<String>,

    /// API key, required with `--provider alphavantage`.
    #[arg(long, env = "ALPHAVANTAGE_API_KEY", hide_env_values = true)]
    pub alphavantage_api_key: Option<String>,

    /// Session cookie forwarded to Yahoo.
    #[arg(long, env = "TICKERPULSE_YAHOO_COOKIE", hide_env_values = true)]
    pub yahoo_cookie: Option<String>,

    /// Transport timeout per upstream call in milliseconds.
    #[arg(long, env = "TICKERPULSE_UPSTREAM_TIMEOUT_MS", default_value_t = 10_000)]
    pub upstream_timeout_ms: u64,

    /// Budget for a whole inbound request in milliseconds.
    #[arg(long, env = "TICKERPULSE_REQUEST_TIMEOUT_MS", default_value_t = 15_000)]
    pub request_timeout_ms: u64,

    /// Retries per upstream call after the first attempt (0 disables).
    #[arg(long, env = "TICKERPULSE_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    /// Sessions in the long change window (0 disables `fiveDayChange`).
    #[arg(long, env = "TICKERPULSE_LONG_LOOKBACK", default_value_t = 5)]
    pub long_lookback: usize,

    /// Concurrent upstream fetches per batch; defaults to the provider policy.
    #[arg(long, env = "TICKERPULSE_MAX_CONCURRENCY")]
    pub max_concurrency: Option<usize>,

    /// Log filter used when `TICKERPULSE_LOG` is unset.
    #[arg(long, env = "TICKERPULSE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "TICKERPULSE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Yahoo Finance chart API (no key required).
    Yahoo,
    /// Alpha Vantage daily series.
    #[value(alias = "alpha-vantage")]
    Alphavantage,
}

impl From<ProviderArg> for ProviderId {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Yahoo => ProviderId::Yahoo,
            ProviderArg::Alphavantage => ProviderId::Alphavantage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    pub fn provider_id(&self) -> ProviderId {
        self.provider.into()
    }

    pub fn provider_config(&self) -> ProviderConfig {
        let retry = if self.max_retries == 0 {
            RetryConfig::no_retry()
        } else {
            RetryConfig::exponential(self.max_retries)
        };
        ProviderConfig {
            base_url: self.provider_base_url.clone(),
            api_key: self.alphavantage_api_key.clone(),
            cookie: self.yahoo_cookie.clone(),
            timeout_ms: self.upstream_timeout_ms,
            retry,
            ..ProviderConfig::new(self.provider_id())
        }
    }

    pub fn lookback_window(&self) -> Result<LookbackWindow, ValidationError> {
        match self.long_lookback {
            0 => Ok(LookbackWindow::daily()),
            sessions => LookbackWindow::with_long_lookback(sessions),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Per-symbol budget, kept at four fifths of the request timeout so slow
    /// symbols degrade before the whole response times out.
    pub fn lookup_timeout(&self) -> Duration {
        self.request_timeout() * 4 / 5
    }

    pub fn service_config(&self) -> Result<QuoteServiceConfig, ValidationError> {
        let window = self.lookback_window()?;
        let config = match self.max_concurrency {
            Some(limit) => QuoteServiceConfig::new(window, limit)?,
            None => QuoteServiceConfig::for_policy(
                window,
                &ProviderPolicy::default_for(self.provider_id()),
            ),
        };
        Ok(config.with_lookup_timeout(self.lookup_timeout()))
    }
}
