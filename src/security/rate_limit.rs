//! Per-client fixed-window rate limiting.
//!
//! Each (client, category) pair owns an independent counter that resets at
//! discrete window boundaries. A client can therefore land up to twice the
//! capacity across one boundary; that is inherent to fixed windows.
//!
//! The window map is sharded (`DashMap`), so a check only locks the shard
//! holding its own key. When the map grows past `max_tracked_clients`, the
//! least recently seen window is evicted.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use axum::http::Method;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::config::{RateLimitConfig, WindowPolicy, MAX_WINDOW_SECS};

/// Protected operation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    Health,
    ConfigRead,
    ConfigWrite,
    Logs,
    Scan,
    Admin,
}

impl RateCategory {
    pub const ALL: [RateCategory; 6] = [
        RateCategory::Health,
        RateCategory::ConfigRead,
        RateCategory::ConfigWrite,
        RateCategory::Logs,
        RateCategory::Scan,
        RateCategory::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RateCategory::Health => "health",
            RateCategory::ConfigRead => "config_read",
            RateCategory::ConfigWrite => "config_write",
            RateCategory::Logs => "logs",
            RateCategory::Scan => "scan",
            RateCategory::Admin => "admin",
        }
    }

    /// Category guarding a route, or `None` for unprotected paths.
    pub fn for_route(method: &Method, path: &str) -> Option<Self> {
        let read = *method == Method::GET;
        let write = *method == Method::POST;
        match path {
            "/health" if read => Some(RateCategory::Health),
            "/scan" if write => Some(RateCategory::Scan),
            "/config" | "/rate-limit-stats" if read => Some(RateCategory::ConfigRead),
            "/config" if write => Some(RateCategory::ConfigWrite),
            "/logs" | "/ws/logs" if read => Some(RateCategory::Logs),
            "/rate-limiting" => Some(RateCategory::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Window exhausted; retry after this many whole seconds (at least 1).
    Limited { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed)
    }
}

/// Counter state for one (client, category) pair.
#[derive(Debug, Clone)]
struct ClientWindow {
    count: u32,
    reset_at: Instant,
    last_seen: Instant,
}

impl ClientWindow {
    fn open(now: Instant, policy: &WindowPolicy) -> Self {
        Self {
            count: 1,
            reset_at: window_end(now, policy),
            last_seen: now,
        }
    }

    fn admit(&mut self, now: Instant, policy: &WindowPolicy) -> RateDecision {
        self.last_seen = now;

        if now > self.reset_at {
            self.count = 1;
            self.reset_at = window_end(now, policy);
            return RateDecision::Allowed;
        }

        if self.count < policy.capacity {
            self.count += 1;
            return RateDecision::Allowed;
        }

        let remaining_ms = self.reset_at.saturating_duration_since(now).as_millis();
        let retry_after_secs = u64::try_from(remaining_ms.div_ceil(1000)).unwrap_or(u64::MAX);
        RateDecision::Limited {
            retry_after_secs: retry_after_secs.max(1),
        }
    }
}

/// End of a window opened at `now`, clamped instead of overflowing the clock.
fn window_end(now: Instant, policy: &WindowPolicy) -> Instant {
    now.checked_add(policy.window())
        .or_else(|| now.checked_add(Duration::from_secs(MAX_WINDOW_SECS)))
        .unwrap_or(now)
}

type WindowKey = (String, RateCategory);

/// In-memory rate limiter with a global kill switch.
pub struct RateLimiter {
    windows: DashMap<WindowKey, ClientWindow>,
    enabled: AtomicBool,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            enabled: AtomicBool::new(config.enabled),
            config,
        }
    }

    pub fn policy(&self, category: RateCategory) -> WindowPolicy {
        self.config.policy(category)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Flip the global toggle. Any actual change discards every window, so
    /// re-enabling starts each client on a fresh window.
    pub fn set_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            self.windows.clear();
            tracing::info!(enabled, "Rate limiting toggled");
        }
    }

    /// Check and count a request against the current clock.
    pub fn check(&self, client: &str, category: RateCategory) -> RateDecision {
        self.check_at(client, category, Instant::now())
    }

    /// Check and count a request at an explicit instant.
    pub fn check_at(&self, client: &str, category: RateCategory, now: Instant) -> RateDecision {
        if !self.is_enabled() {
            return RateDecision::Allowed;
        }

        let policy = self.config.policy(category);
        let key = (client.to_string(), category);

        let (decision, inserted) = match self.windows.entry(key.clone()) {
            Entry::Occupied(mut slot) => (slot.get_mut().admit(now, &policy), false),
            Entry::Vacant(slot) => {
                slot.insert(ClientWindow::open(now, &policy));
                (RateDecision::Allowed, true)
            }
        };

        if inserted {
            self.evict_overflow(&key);
        }

        decision
    }

    /// Number of (client, category) windows currently tracked.
    pub fn tracked_windows(&self) -> usize {
        self.windows.len()
    }

    /// Drop windows whose reset time has passed. Returns how many were removed.
    ///
    /// Such windows would be reset on their next request anyway.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| now <= window.reset_at);
        before.saturating_sub(self.windows.len())
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn evict_overflow(&self, keep: &WindowKey) {
        while self.windows.len() > self.config.max_tracked_clients {
            let oldest = self
                .windows
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.value().last_seen)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(victim) => {
                    tracing::debug!(client = %victim.0, category = %victim.1, "Evicting least recently seen rate window");
                    self.windows.remove(&victim);
                }
                None => break,
            }
        }
    }
}
