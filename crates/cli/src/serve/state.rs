//! Shared server state: the repair store and the per-client request budget.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use repairdesk_storage::RepairStore;
use tokio::sync::Mutex;

use super::RATE_LIMIT_WINDOW_SECS;

/// Requests seen from one client in its current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    requests: u64,
}

impl Window {
    fn is_expired(&self, now: Instant, length: Duration) -> bool {
        now.saturating_duration_since(self.opened) >= length
    }
}

#[derive(Debug)]
struct Windows {
    by_client: HashMap<IpAddr, Window>,
    last_sweep: Instant,
}

/// Fixed-window request limiter keyed by client address.
///
/// Windows that have run out are swept at most once per window length, so
/// the table only holds clients seen during roughly the last two windows.
#[derive(Debug)]
pub(crate) struct RateLimiter {
    windows: Mutex<Windows>,
    length: Duration,
    pub(crate) max_requests: u64,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64) -> Self {
        Self::with_window(max_requests, Duration::from_secs(RATE_LIMIT_WINDOW_SECS))
    }

    fn with_window(max_requests: u64, length: Duration) -> Self {
        RateLimiter {
            windows: Mutex::new(Windows {
                by_client: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            length,
            max_requests,
        }
    }

    /// Count one request from `ip`. `Err` carries the seconds until the
    /// client's window reopens.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), u64> {
        let mut windows = self.windows.lock().await;

        if now.saturating_duration_since(windows.last_sweep) >= self.length {
            let length = self.length;
            windows
                .by_client
                .retain(|_, window| !window.is_expired(now, length));
            windows.last_sweep = now;
        }

        let window = windows.by_client.entry(ip).or_insert(Window {
            opened: now,
            requests: 0,
        });
        if window.is_expired(now, self.length) {
            *window = Window {
                opened: now,
                requests: 0,
            };
        }

        window.requests = window.requests.saturating_add(1);
        if window.requests <= self.max_requests {
            return Ok(());
        }
        let remaining = self
            .length
            .saturating_sub(now.saturating_duration_since(window.opened));
        Err(remaining.as_secs().max(1))
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.by_client.len()
    }
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// The repair store both surfaces read and write.
    pub(crate) store: Arc<dyn RepairStore>,
    pub(crate) rate_limiter: RateLimiter,
    /// Required API key. `None` = no auth.
    pub(crate) api_key: Option<String>,
}
