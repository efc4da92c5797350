use std::time::Duration;

use crate::ProviderId;

/// Per-provider limits applied by adapters and the batch orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    /// Upper bound on in-flight series fetches for one batch.
    pub max_concurrency: usize,
    /// Published request quota, if the provider enforces one.
    pub quota: Option<Quota>,
}

/// `limit` calls per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub window: Duration,
    pub limit: u32,
}

impl ProviderPolicy {
    /// Yahoo's chart endpoint has no published quota; concurrency is kept
    /// modest so a large watchlist does not look like a scraper.
    pub fn yahoo_default() -> Self {
        Self {
            provider_id: ProviderId::Yahoo,
            max_concurrency: 8,
            quota: None,
        }
    }

    /// Alpha Vantage free tier: five calls per minute.
    pub fn alphavantage_default() -> Self {
        Self {
            provider_id: ProviderId::Alphavantage,
            max_concurrency: 1,
            quota: Some(Quota {
                window: Duration::from_secs(60),
                limit: 5,
            }),
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::Yahoo => Self::yahoo_default(),
            ProviderId::Alphavantage => Self::alphavantage_default(),
        }
    }
}
