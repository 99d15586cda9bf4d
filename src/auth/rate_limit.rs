use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Auth endpoints: max requests per IP per window.
const AUTH_MAX_REQUESTS: u32 = 5;
const AUTH_WINDOW_SECS: u64 = 60;

/// Entry/collection creation: max writes per user per window.
const WRITE_MAX_REQUESTS: u32 = 10;
const WRITE_WINDOW_SECS: u64 = 3600;

/// In-memory rate limit state (for single-instance deployments)
/// For multi-instance, use Redis or similar
#[derive(Clone, Default)]
pub struct RateLimitState {
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimitState {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Check if the key is rate limited. Returns Ok(remaining) or Err if limited.
    pub async fn check(&self, key: &str, max_requests: u32, window_secs: u64) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let window = Duration::from_secs(window_secs);

        let entry = entries.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) > window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= max_requests {
            let retry_after = window.saturating_sub(now.duration_since(entry.window_start));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(max_requests - entry.count)
    }

    /// Consume one write-quota token for a user, mirroring the hourly
    /// per-user budget on entry and collection creation.
    pub async fn check_user_write(&self, user_id: Uuid) -> Result<(), AppError> {
        let key = format!("writes:{}", user_id);
        match self
            .check(&key, WRITE_MAX_REQUESTS, WRITE_WINDOW_SECS)
            .await
        {
            Ok(remaining) => {
                tracing::debug!(user_id = %user_id, remaining = remaining, "Write rate limit check passed");
                Ok(())
            }
            Err(retry_after) => {
                tracing::warn!(
                    user_id = %user_id,
                    retry_after_secs = retry_after.as_secs(),
                    "Write rate limit exceeded"
                );
                Err(AppError::RateLimited)
            }
        }
    }

    /// Periodically clean up expired entries (call from a background task)
    pub async fn cleanup(&self) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        // Nothing re-reads a window after 2x its span; the widest window wins.
        let window = Duration::from_secs(WRITE_WINDOW_SECS * 2);

        entries.retain(|_, entry| now.duration_since(entry.window_start) < window);
    }
}

/// Rate limiting middleware for auth endpoints
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = addr.ip().to_string();
    let path = req.uri().path().to_string();

    // Rate limit key: IP + path (so /login and /register have separate limits)
    let key = format!("{}:{}", ip, path);

    match state
        .rate_limiter
        .check(&key, AUTH_MAX_REQUESTS, AUTH_WINDOW_SECS)
        .await
    {
        Ok(remaining) => {
            tracing::debug!(ip = %ip, path = %path, remaining = remaining, "Rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            let secs: u64 = retry_after.as_secs();
            tracing::warn!(
                ip = %ip,
                path = %path,
                retry_after_secs = secs,
                "Rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}

/// Sweep expired rate-limit windows every 10 minutes.
pub fn spawn_cleanup_worker(limiter: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limit_allows_under_limit() {
        let limiter = RateLimitState::new();

        for i in 0..AUTH_MAX_REQUESTS {
            let result = limiter.check("test_key", AUTH_MAX_REQUESTS, AUTH_WINDOW_SECS).await;
            assert!(result.is_ok(), "Request {} should be allowed", i + 1);
        }
    }

    #[tokio::test]
    async fn test_rate_limit_blocks_over_limit() {
        let limiter = RateLimitState::new();

        // Exhaust the limit
        for _ in 0..AUTH_MAX_REQUESTS {
            let _ = limiter.check("test_key", AUTH_MAX_REQUESTS, AUTH_WINDOW_SECS).await;
        }

        // Next request should be blocked
        let result = limiter.check("test_key", AUTH_MAX_REQUESTS, AUTH_WINDOW_SECS).await;
        assert!(result.is_err(), "Request over limit should be blocked");
    }

    #[tokio::test]
    async fn test_different_keys_have_separate_limits() {
        let limiter = RateLimitState::new();

        // Exhaust limit for key1
        for _ in 0..AUTH_MAX_REQUESTS {
            let _ = limiter.check("key1", AUTH_MAX_REQUESTS, AUTH_WINDOW_SECS).await;
        }

        // key2 should still be allowed
        let result = limiter.check("key2", AUTH_MAX_REQUESTS, AUTH_WINDOW_SECS).await;
        assert!(result.is_ok(), "Different key should have separate limit");
    }

    #[tokio::test]
    async fn test_user_write_budget_is_per_user() {
        let limiter = RateLimitState::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        for _ in 0..WRITE_MAX_REQUESTS {
            assert!(limiter.check_user_write(user_a).await.is_ok());
        }
        assert!(matches!(
            limiter.check_user_write(user_a).await,
            Err(AppError::RateLimited)
        ));
        assert!(limiter.check_user_write(user_b).await.is_ok());
    }
}
