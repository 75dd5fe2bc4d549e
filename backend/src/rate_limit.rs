//! Fixed-window request budget per client, applied ahead of every API route.

use crate::config::RateLimitConfig;
use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use shared::models::ApiResponse;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const SWEEP_EVERY: u64 = 256;

#[derive(Clone, Copy, Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of one budget check, with everything the response headers need.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

impl RateLimitDecision {
    fn apply_headers(&self, headers: &mut HeaderMap, window: Duration) {
        let reset_secs = self.reset_after.as_secs_f64().ceil() as u64;
        headers.insert("ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(reset_secs));
        if let Ok(policy) = HeaderValue::from_str(&format!("{};w={}", self.limit, window.as_secs())) {
            headers.insert("ratelimit-policy", policy);
        }
        if !self.allowed {
            headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(reset_secs));
        }
    }
}

pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            checks: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Counts one request against `key` and reports whether it fits the budget.
    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let window = self.config.window;
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.windows
                .retain(|_, w| now.saturating_duration_since(w.started) < window);
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        let mut elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= window {
            *entry = Window {
                started: now,
                count: 0,
            };
            elapsed = Duration::ZERO;
        }

        let allowed = entry.count < self.config.max_requests;
        if allowed {
            entry.count += 1;
        }

        RateLimitDecision {
            allowed,
            limit: self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(entry.count),
            reset_after: window - elapsed,
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Peer address when the server was started with connect info, otherwise the
/// first forwarded-for hop.
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let decision = limiter.check(&key);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, tracked = limiter.tracked_clients(), "Rate limit exceeded");
        (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::error(
                "Too many requests, please try again later.",
            )),
        )
            .into_response()
    };
    decision.apply_headers(response.headers_mut(), limiter.config().window);
    response
}
