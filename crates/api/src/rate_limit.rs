use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Sliding-window limiter keyed by client address.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests: max_requests.max(1),
        }
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut windows = self.windows.lock();

        // Keep the map from growing with one-off clients.
        if windows.len() > 4_096 {
            windows.retain(|_, hits| {
                hits.back()
                    .is_some_and(|last| now.duration_since(*last) <= self.window)
            });
        }

        let hits = windows.entry(key.to_string()).or_default();
        while hits
            .front()
            .is_some_and(|first| now.duration_since(*first) > self.window)
        {
            hits.pop_front();
        }

        if hits.len() >= self.max_requests {
            let retry_after = hits
                .front()
                .map(|first| self.window.saturating_sub(now.duration_since(*first)))
                .unwrap_or(self.window);
            return RateDecision::Limited { retry_after };
        }

        hits.push_back(now);
        RateDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_after_max_and_recovers_after_window() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(10), 2);
        let start = Instant::now();

        assert_eq!(limiter.check_at("a", start), RateDecision::Allowed);
        assert_eq!(limiter.check_at("a", start), RateDecision::Allowed);
        assert!(matches!(
            limiter.check_at("a", start + Duration::from_secs(4)),
            RateDecision::Limited { retry_after } if retry_after == Duration::from_secs(6)
        ));
        assert_eq!(limiter.check_at("b", start), RateDecision::Allowed);
        assert_eq!(
            limiter.check_at("a", start + Duration::from_secs(11)),
            RateDecision::Allowed
        );
    }
}
