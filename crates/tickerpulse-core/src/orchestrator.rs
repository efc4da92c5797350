//! Batch orchestration: one independent fetch-and-compute pipeline per symbol.
//!
//! Every symbol runs in its own task. Tasks are joined with a wait-for-all
//! loop and each one carries its own failure boundary, so an unreachable
//! provider, a malformed payload, an invalid ticker, or even a panicking task
//! degrades only that symbol to [`QuoteRecord::unavailable`]. Each lookup also
//! runs under [`QuoteServiceConfig::lookup_timeout`] so a hanging upstream
//! cannot hold the whole batch past the caller's request timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::calculator::{compute_quote, LookbackWindow};
use crate::config::QuoteServiceConfig;
use crate::data_source::{HealthStatus, SeriesRequest, SeriesSource, SourceError};
use crate::{ProviderId, QuoteRecord, Symbol, TimeSeries};

/// Fans a symbol list out to a [`SeriesSource`] and collects quote records.
#[derive(Clone)]
pub struct QuoteService {
    source: Arc<dyn SeriesSource>,
    config: QuoteServiceConfig,
    permits: Arc<Semaphore>,
}

impl QuoteService {
    pub fn new(source: Arc<dyn SeriesSource>, config: QuoteServiceConfig) -> Self {
        Self {
            source,
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            config,
        }
    }

    pub fn config(&self) -> &QuoteServiceConfig {
        &self.config
    }

    pub fn provider(&self) -> ProviderId {
        self.source.id()
    }

    pub async fn health(&self) -> HealthStatus {
        self.source.health().await
    }

    /// Quotes a single symbol. Never fails; see [`QuoteService::quote_batch`].
    pub async fn quote_one(&self, symbol: &str) -> QuoteRecord {
        lookup(
            Arc::clone(&self.source),
            Arc::clone(&self.permits),
            symbol,
            self.config.window,
            self.config.lookup_timeout,
        )
        .await
    }

    /// Quotes every entry of `symbols`, one record per entry, in input order.
    ///
    /// Records are keyed by the caller's raw symbol string so consumers can
    /// index the response by what they sent.
    pub async fn quote_batch(&self, symbols: &[String]) -> Vec<QuoteRecord> {
        let started = Instant::now();
        let window = self.config.window;
        let budget = self.config.lookup_timeout;

        let handles: Vec<_> = symbols
            .iter()
            .map(|raw| {
                let source = Arc::clone(&self.source);
                let permits = Arc::clone(&self.permits);
                let symbol = raw.clone();
                let span = tracing::debug_span!("quote_lookup", symbol = %raw);
                let handle = tokio::spawn(
                    async move { lookup(source, permits, &symbol, window, budget).await }.instrument(span),
                );
                (raw, handle)
            })
            .collect();

        let mut records = Vec::with_capacity(handles.len());
        for (raw, handle) in handles {
            let record = match handle.await {
                Ok(record) => record,
                Err(error) => {
                    tracing::error!(symbol = %raw, error = %error, "quote lookup task aborted");
                    QuoteRecord::unavailable(raw.as_str(), window.includes_long_change())
                }
            };
            records.push(record);
        }

        let degraded = records.iter().filter(|record| record.is_unavailable()).count();
        tracing::info!(
            provider = %self.source.id(),
            symbols = records.len(),
            degraded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "quote batch served"
        );
        records
    }
}

async fn lookup(
    source: Arc<dyn SeriesSource>,
    permits: Arc<Semaphore>,
    raw: &str,
    window: LookbackWindow,
    budget: Duration,
) -> QuoteRecord {
    let fetched = tokio::time::timeout(budget, fetch_series(source.as_ref(), &permits, raw, window))
        .await
        .unwrap_or_else(|_| {
            Err(SourceError::unavailable(format!(
                "lookup exceeded its {} ms budget",
                budget.as_millis()
            )))
        });
    match fetched {
        Ok(series) => {
            let record = compute_quote(raw, &series, window);
            if record.is_unavailable() {
                tracing::warn!(
                    symbol = raw,
                    sessions = series.len(),
                    closes = series.present_len(),
                    "insufficient closes; serving default record"
                );
            }
            record
        }
        Err(error) => {
            tracing::warn!(
                symbol = raw,
                code = error.code(),
                error = %error,
                "series fetch failed; serving default record"
            );
            QuoteRecord::unavailable(raw, window.includes_long_change())
        }
    }
}

async fn fetch_series(
    source: &dyn SeriesSource,
    permits: &Semaphore,
    raw: &str,
    window: LookbackWindow,
) -> Result<TimeSeries, SourceError> {
    let symbol = Symbol::parse(raw)?;
    let request = SeriesRequest::new(symbol, window.sessions_required())?;
    let _permit = permits
        .acquire()
        .await
        .map_err(|_| SourceError::internal("quote service is shutting down"))?;
    source.daily_closes(request).await
}
