use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Fixed-window request limiter keyed by principal id or anonymous
/// address. Windows reset a minute after the first hit; stale keys are
/// swept opportunistically.
pub struct Throttle {
    limit: u32,
    window: Duration,
    hits: Mutex<HashMap<String, (Instant, u32)>>,
}

impl Throttle {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// 10 requests per minute, for authentication endpoints
    pub fn per_minute_auth() -> Self {
        Self::new(10, Duration::from_secs(60))
    }

    /// 30 requests per minute, for search endpoints
    pub fn per_minute_search() -> Self {
        Self::new(30, Duration::from_secs(60))
    }

    /// Record a hit for `key`; false means the caller is over the limit
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().expect("throttle lock poisoned");

        if hits.len() > 4096 {
            hits.retain(|_, (start, _)| now.duration_since(*start) < self.window);
        }

        let entry = hits.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }
        entry.1 += 1;
        entry.1 <= self.limit
    }
}
