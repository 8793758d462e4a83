use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::debug;

use crate::metrics::API_RATE_LIMIT_WAITS_TOTAL;

/// Client-side request throttle.
///
/// A limit of zero disables throttling entirely.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Option<Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    requests_per_second: u32,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_second)
            .map(|limit| Arc::new(GovernorRateLimiter::direct(Quota::per_second(limit))));

        Self {
            limiter,
            requests_per_second,
        }
    }

    /// Wait until the next request is admitted.
    pub async fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };

        loop {
            match limiter.check() {
                Ok(_) => return,
                Err(not_until) => {
                    let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                    debug!("request throttled, waiting {:?}", wait_time);
                    API_RATE_LIMIT_WAITS_TOTAL.with_label_values(&[]).inc();
                    sleep(wait_time).await;
                }
            }
        }
    }

    /// Try to acquire without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter
            .as_ref()
            .map_or(true, |limiter| limiter.check().is_ok())
    }

    /// The configured requests per second; zero means unlimited.
    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }
}
