use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::api::AppState;
use crate::config::RateLimitConfig;

pub const WINDOW: Duration = Duration::from_secs(60);

/// How often idle client entries are dropped from the map.
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Per-client sliding window limiter. A limit of zero disables it.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    trust_proxy: bool,
    requests: Mutex<(HashMap<String, Vec<Instant>>, Instant)>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            trust_proxy: false,
            requests: Mutex::new((HashMap::new(), Instant::now())),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, WINDOW)
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            trust_proxy: config.trust_proxy,
            ..Self::per_minute(config.per_minute)
        }
    }

    /// Client identity. Forwarding headers count only when the proxy is trusted.
    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if self.trust_proxy {
            if let Some(forwarded) = forwarded_client(headers) {
                return forwarded;
            }
        }
        peer.map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".into())
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        if self.limit == 0 {
            return true;
        }

        let cutoff = now.checked_sub(self.window);
        let live = |t: &Instant| cutoff.map_or(true, |c| *t > c);

        let mut guard = self.requests.lock();
        let (requests, last_sweep) = &mut *guard;

        if now.saturating_duration_since(*last_sweep) >= SWEEP_INTERVAL {
            requests.retain(|_, stamps| {
                stamps.retain(live);
                !stamps.is_empty()
            });
            *last_sweep = now;
        }

        let stamps = requests.entry(key.to_owned()).or_default();
        stamps.retain(live);
        if stamps.len() >= self.limit as usize {
            return false;
        }
        stamps.push(now);
        true
    }
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    ["X-Forwarded-For", "X-Real-IP"].iter().find_map(|header_name| {
        let value = headers.get(*header_name)?.to_str().ok()?;
        let first = value.split(',').next()?.trim();
        (!first.is_empty()).then(|| first.to_owned())
    })
}

/// Middleware rejecting clients over the configured per-minute budget with 429.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = state.rate_limiter.client_key(request.headers(), peer);

    if !state.rate_limiter.allow(&key) {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        let body = serde_json::json!({
            "error": "Too many requests. Please retry later.",
            "retry_after": WINDOW.as_secs(),
        });
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::per_minute(2);
        let start = Instant::now();
        assert!(limiter.allow_at("a", start));
        assert!(limiter.allow_at("a", start));
        assert!(!limiter.allow_at("a", start));
        assert!(limiter.allow_at("b", start));
    }

    #[test]
    fn window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.allow_at("a", start));
        assert!(!limiter.allow_at("a", start + Duration::from_secs(5)));
        assert!(limiter.allow_at("a", start + Duration::from_secs(11)));
    }

    #[test]
    fn zero_limit_disables() {
        let limiter = RateLimiter::per_minute(0);
        assert!((0..100).all(|_| limiter.allow("a")));
    }

    fn limiter(trust_proxy: bool) -> RateLimiter {
        RateLimiter::from_config(&RateLimitConfig {
            per_minute: 2,
            trust_proxy,
        })
    }

    #[test]
    fn client_key_uses_peer_by_default() {
        let limiter = limiter(false);
        let peer: SocketAddr = "10.0.0.7:5555".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(limiter.client_key(&headers, Some(peer)), "10.0.0.7");
        assert_eq!(limiter.client_key(&headers, None), "unknown");

        headers.insert("X-Forwarded-For", "203.0.113.9".parse().unwrap());
        assert_eq!(limiter.client_key(&headers, Some(peer)), "10.0.0.7");
    }

    #[test]
    fn trusted_proxy_headers_identify_the_client() {
        let limiter = limiter(true);
        let peer: SocketAddr = "10.0.0.7:5555".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(limiter.client_key(&headers, Some(peer)), "10.0.0.7");

        headers.insert("X-Real-IP", "198.51.100.4".parse().unwrap());
        assert_eq!(limiter.client_key(&headers, Some(peer)), "198.51.100.4");

        headers.insert("X-Forwarded-For", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(limiter.client_key(&headers, Some(peer)), "203.0.113.9");
    }

    #[test]
    fn rotating_forwarded_headers_do_not_reset_the_budget() {
        let limiter = limiter(false);
        let peer: SocketAddr = "10.0.0.7:5555".parse().unwrap();
        let allowed = (0..100)
            .filter(|i| {
                let mut headers = HeaderMap::new();
                headers.insert("X-Forwarded-For", format!("192.0.2.{i}").parse().unwrap());
                limiter.allow(&limiter.client_key(&headers, Some(peer)))
            })
            .count();
        assert_eq!(allowed, 2);
        assert_eq!(limiter.requests.lock().0.len(), 1);
    }
}
