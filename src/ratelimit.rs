use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, per_sec: f64, now: Instant) {
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.last_refill = now;
        self.tokens = (self.tokens + elapsed * per_sec).min(self.capacity);
    }

    fn try_take(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-client token buckets keyed by remote address. Buckets idle past the
/// configured window are swept on every check so the map stays bounded.
#[derive(Clone)]
pub struct ClientRateLimiter {
    state: Arc<Mutex<HashMap<String, TokenBucket>>>,
    burst: f64,
    refill_per_sec: f64,
    idle_window: Duration,
}

impl ClientRateLimiter {
    pub fn new(rate_per_minute: u32, burst: u32, idle_window: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(HashMap::new())),
            burst: burst.max(1) as f64,
            refill_per_sec: (rate_per_minute.max(1) as f64) / 60.0,
            idle_window,
        }
    }

    pub async fn allow(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        state.retain(|_, bucket| now.duration_since(bucket.last_refill) < self.idle_window);
        let bucket = state
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::full(self.burst, now));
        bucket.refill(self.refill_per_sec, now);
        bucket.try_take()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ClientRateLimiter;

    #[tokio::test]
    async fn denies_once_burst_is_spent() {
        let limiter = ClientRateLimiter::new(1, 2, Duration::from_secs(30 * 60));
        assert!(limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.1").await);
        assert!(!limiter.allow("10.0.0.1").await);
        // other clients keep their own bucket
        assert!(limiter.allow("10.0.0.2").await);
    }

    #[tokio::test]
    async fn idle_buckets_are_swept() {
        // a zero window drops every bucket between checks, so even a spent
        // client starts fresh
        let limiter = ClientRateLimiter::new(1, 1, Duration::ZERO);
        assert!(limiter.allow("10.0.0.1").await);
        assert!(limiter.allow("10.0.0.1").await);
    }
}
