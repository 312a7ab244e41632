use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;

use crate::error::AppError;

const SWEEP_EVERY: Duration = Duration::from_secs(60);

/// Per-client sliding window limiter for the sign-in endpoints.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<Windows>>,
    max_requests: usize,
    window: Duration,
}

struct Windows {
    hits: HashMap<String, VecDeque<Instant>>,
    last_sweep: Instant,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(Windows {
                hits: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_requests,
            window,
        }
    }

    /// Records a hit for `key`, or returns how long until the oldest one expires.
    async fn hit(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut windows = self.windows.lock().await;

        if now.duration_since(windows.last_sweep) > SWEEP_EVERY {
            let window = self.window;
            windows
                .hits
                .retain(|_, hits| hits.back().is_some_and(|t| now.duration_since(*t) < window));
            windows.last_sweep = now;
        }

        let hits = windows.hits.entry(key.to_string()).or_default();
        while hits.front().is_some_and(|t| now.duration_since(*t) >= self.window) {
            hits.pop_front();
        }

        if hits.len() >= self.max_requests {
            let oldest = hits.front().copied().unwrap_or(now);
            return Err(self.window.saturating_sub(now.duration_since(oldest)));
        }

        hits.push_back(now);
        Ok(())
    }
}

/// First hop of `x-forwarded-for`, then `x-real-ip`, else one shared bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("global")
        .to_string()
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(req.headers());

    if let Err(retry_after) = limiter.hit(&key, Instant::now()).await {
        tracing::warn!(client = %key, "sign-in rate limit exceeded");
        let mut response = AppError::RateLimited.into_response();
        let secs = retry_after.as_secs().max(1);
        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(req).await
}
