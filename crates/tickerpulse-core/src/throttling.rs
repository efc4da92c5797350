use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota as GovernorQuota, RateLimiter};

use crate::provider_policy::{ProviderPolicy, Quota};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Local rate gate that keeps an adapter inside its provider quota.
///
/// Calls over budget are rejected with the wait time instead of being queued:
/// a quote batch must answer within one poll interval, so a throttled symbol
/// degrades to its default record and the next poll picks it up.
#[derive(Clone)]
pub struct Throttle {
    limiter: Option<Arc<DirectRateLimiter>>,
    clock: DefaultClock,
}

impl Throttle {
    pub fn new(quota: Option<Quota>) -> Self {
        Self {
            limiter: quota.map(|quota| Arc::new(RateLimiter::direct(governor_quota(quota)))),
            clock: DefaultClock::default(),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.quota)
    }

    /// Takes one call from the budget, or returns how long until one frees up.
    pub fn acquire(&self) -> Result<(), Duration> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };
        limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }
}

fn governor_quota(quota: Quota) -> GovernorQuota {
    let limit = quota.limit.max(1);
    let burst = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (quota.window.as_secs_f64() / f64::from(limit)).max(0.001);
    GovernorQuota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .unwrap_or_else(|| GovernorQuota::per_second(burst))
        .allow_burst(burst)
}
