use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::sleep;

use crate::auth::ApiTokenAuth;
use crate::config::ZendeskConfig;
use crate::error::{Result, ZendeskError};

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Last quota snapshot reported by the API, shared between the transport
/// (which writes it after every response) and the pagination layer (which
/// only ever reads it).
pub type SharedRateLimit = Arc<Mutex<Option<RateLimitState>>>;

/// Rate-limit accounting as reported by the API's quota headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    /// Total requests allowed in the current window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the window resets, if the API reported it
    pub reset_at: Option<SystemTime>,
}

/// Structured error body returned on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    #[allow(dead_code)]
    title: Option<String>,
    message: String,
    #[serde(default)]
    details: Option<Value>,
}

/// HTTP client for the Zendesk Support API with built-in rate limiting and
/// retry logic.
///
/// The `Zendesk` client is the entry point for every operation in this crate.
/// It layers three rate-limit defenses on top of a plain HTTP client:
///
/// 1. A client-side token bucket keeps the request rate below the account's
///    per-minute ceiling before the API ever has to push back.
/// 2. The quota headers on every response are tracked, and when the reported
///    remaining budget drops to the configured buffer the client waits for
///    the window to reset instead of spending the last few requests.
/// 3. 429 responses are retried with the server-provided `Retry-After` delay
///    when present, falling back to exponential backoff with jitter.
///
/// Authentication failures are never retried, and transport failures (no
/// response at all) surface immediately so callers can distinguish network
/// trouble from API pushback.
///
/// # Examples
///
/// ```ignore
/// use zenkit::Zendesk;
///
/// let client = Zendesk::new("acme", "agent@example.com", "api-token")?;
/// # Ok::<(), zenkit::ZendeskError>(())
/// ```
#[derive(Clone)]
pub struct Zendesk {
    /// HTTP client with auth headers installed
    pub(crate) client: reqwest::Client,

    /// Client-side token bucket
    pub(crate) rate_limiter: Arc<Governor>,

    /// Quota state mirrored from response headers
    pub(crate) rate_limit_state: SharedRateLimit,

    /// Base URL all request paths are appended to
    pub(crate) base_url: String,

    pub(crate) quota_buffer: u32,
    pub(crate) max_retries: u32,
    pub(crate) backoff_base: Duration,
}

impl Zendesk {
    /// Creates a client with the default limits for an account.
    pub fn new(
        subdomain: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(ZendeskConfig::new(subdomain, email, token))
    }

    /// Creates a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `ZendeskError::ConfigError` if the credentials cannot be
    /// encoded into a header, the rate limit is zero, or the HTTP client
    /// cannot be built.
    pub fn with_config(config: ZendeskConfig) -> Result<Self> {
        let auth = ApiTokenAuth::new(&config.email, &config.token);

        let client = reqwest::Client::builder()
            .default_headers(auth.headers()?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ZendeskError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                ZendeskError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        Ok(Zendesk {
            client,
            rate_limiter,
            rate_limit_state: Arc::new(Mutex::new(None)),
            base_url: config.base_url(),
            quota_buffer: config.quota_buffer,
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
        })
    }

    /// Returns the most recent quota snapshot reported by the API, if any
    /// response has carried rate-limit headers yet.
    pub fn rate_limit_state(&self) -> Option<RateLimitState> {
        *self
            .rate_limit_state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Shared handle to the quota snapshot for the pagination layer.
    pub(crate) fn rate_limit_handle(&self) -> SharedRateLimit {
        Arc::clone(&self.rate_limit_state)
    }

    /// Exponential backoff with ±20% jitter: `(2^retry × base) ± 20%`.
    fn calculate_backoff(&self, retry: u32) -> Duration {
        let backoff_ms = self.backoff_base.as_millis() as u64 * (2_u64.pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// Mirrors the quota headers into the shared snapshot. Responses without
    /// quota headers leave the previous snapshot untouched.
    fn update_rate_limit(&self, headers: &HeaderMap) {
        let limit = header_u32(headers, "x-rate-limit");
        let remaining = header_u32(headers, "x-rate-limit-remaining");
        let reset_at = header_u64(headers, "x-rate-limit-reset")
            .map(|secs| UNIX_EPOCH + Duration::from_secs(secs));

        if limit.is_none() && remaining.is_none() && reset_at.is_none() {
            return;
        }

        let mut guard = self
            .rate_limit_state
            .lock()
            .unwrap_or_else(|e| e.into_inner());

        match guard.as_mut() {
            Some(state) => {
                if let Some(limit) = limit {
                    state.limit = limit;
                }
                if let Some(remaining) = remaining {
                    state.remaining = remaining;
                }
                if reset_at.is_some() {
                    state.reset_at = reset_at;
                }
            }
            // The remaining count is the load-bearing field; without it
            // there is nothing useful to track yet.
            None => {
                if let Some(remaining) = remaining {
                    *guard = Some(RateLimitState {
                        limit: limit.unwrap_or(0),
                        remaining,
                        reset_at,
                    });
                }
            }
        }
    }

    /// Waits for the quota window to reset when the reported remaining
    /// budget is at or below the configured buffer.
    async fn wait_for_quota(&self) {
        let wait = {
            let guard = self
                .rate_limit_state
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            guard.as_ref().and_then(|state| {
                if state.remaining <= self.quota_buffer {
                    state
                        .reset_at
                        .and_then(|reset| reset.duration_since(SystemTime::now()).ok())
                } else {
                    None
                }
            })
        };

        if let Some(wait) = wait {
            tracing::warn!(
                "Remaining request quota at or below buffer, waiting {:?} for reset",
                wait
            );
            sleep(wait).await;
        }
    }

    /// Executes a request, returning the successful response.
    ///
    /// This is the single choke point every API call goes through: token
    /// bucket, quota-buffer wait, 429 retry loop, and error classification
    /// all live here.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: Option<&[(String, String)]>,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;
            self.wait_for_quota().await;

            let mut builder = self.client.request(method.clone(), &url);
            if let Some(params) = params {
                builder = builder.query(params);
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(ZendeskError::RequestError)?;

            self.update_rate_limit(response.headers());

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            match status {
                StatusCode::UNAUTHORIZED => return Err(ZendeskError::Authentication),
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok());

                    if retries >= self.max_retries {
                        return Err(ZendeskError::RateLimit { retry_after });
                    }

                    let wait = retry_after
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| self.calculate_backoff(retries));

                    tracing::warn!(
                        "Rate limit hit (429) for {}. Attempt {}/{}. Waiting {:?} before retry.",
                        url,
                        retries + 1,
                        self.max_retries + 1,
                        wait
                    );
                    sleep(wait).await;
                    retries += 1;
                }
                other_status => {
                    let status_text = other_status
                        .canonical_reason()
                        .unwrap_or("Unknown")
                        .to_string();
                    let body_text = response.text().await.unwrap_or_default();

                    return Err(match serde_json::from_str::<ErrorResponse>(&body_text) {
                        Ok(parsed) => ZendeskError::Api {
                            status: other_status.as_u16(),
                            status_text,
                            message: parsed.error.message,
                            details: parsed.error.details,
                        },
                        Err(_) => ZendeskError::Api {
                            status: other_status.as_u16(),
                            status_text,
                            message: body_text.chars().take(200).collect(),
                            details: None,
                        },
                    });
                }
            }
        }
    }

    /// GET a path and decode the JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&[(String, String)]>,
    ) -> Result<T> {
        let response = self.execute(Method::GET, path, params, None).await?;
        response.json().await.map_err(ZendeskError::RequestError)
    }

    /// POST a JSON body and decode the response.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let response = self.execute(Method::POST, path, None, Some(body)).await?;
        response.json().await.map_err(ZendeskError::RequestError)
    }

    /// PUT an optional JSON body and decode the response.
    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T> {
        let response = self.execute(Method::PUT, path, None, body).await?;
        response.json().await.map_err(ZendeskError::RequestError)
    }

    /// DELETE a path, discarding the response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, path, None, None).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Zendesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zendesk")
            .field("base_url", &self.base_url)
            .field("quota_buffer", &self.quota_buffer)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn header_u32(headers: &HeaderMap, name: &str) -> Option<u32> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse().ok())
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client() -> Zendesk {
        Zendesk::new("acme", "agent@example.com", "token").unwrap()
    }

    #[test]
    fn calculate_backoff_grows_exponentially() {
        let zendesk = client();

        let backoff0 = zendesk.calculate_backoff(0);
        let backoff1 = zendesk.calculate_backoff(1);
        let backoff2 = zendesk.calculate_backoff(2);

        // ±20% jitter around 1s, 2s, 4s
        assert!(backoff0.as_millis() >= 800 && backoff0.as_millis() <= 1200);
        assert!(backoff1.as_millis() >= 1600 && backoff1.as_millis() <= 2400);
        assert!(backoff2.as_millis() >= 3200 && backoff2.as_millis() <= 4800);
    }

    #[test]
    fn quota_headers_update_state() {
        let zendesk = client();

        let mut headers = HeaderMap::new();
        headers.insert("x-rate-limit", HeaderValue::from_static("700"));
        headers.insert("x-rate-limit-remaining", HeaderValue::from_static("699"));
        headers.insert("x-rate-limit-reset", HeaderValue::from_static("1700000000"));
        zendesk.update_rate_limit(&headers);

        let state = zendesk.rate_limit_state().unwrap();
        assert_eq!(state.limit, 700);
        assert_eq!(state.remaining, 699);
        assert_eq!(
            state.reset_at,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
    }

    #[test]
    fn missing_quota_headers_leave_state_untouched() {
        let zendesk = client();

        let mut headers = HeaderMap::new();
        headers.insert("x-rate-limit-remaining", HeaderValue::from_static("42"));
        zendesk.update_rate_limit(&headers);

        // A header-less response must not clear the snapshot.
        zendesk.update_rate_limit(&HeaderMap::new());

        let state = zendesk.rate_limit_state().unwrap();
        assert_eq!(state.remaining, 42);
    }

    #[test]
    fn partial_quota_headers_merge_into_state() {
        let zendesk = client();

        let mut headers = HeaderMap::new();
        headers.insert("x-rate-limit", HeaderValue::from_static("700"));
        headers.insert("x-rate-limit-remaining", HeaderValue::from_static("100"));
        zendesk.update_rate_limit(&headers);

        let mut partial = HeaderMap::new();
        partial.insert("x-rate-limit-remaining", HeaderValue::from_static("99"));
        zendesk.update_rate_limit(&partial);

        let state = zendesk.rate_limit_state().unwrap();
        assert_eq!(state.limit, 700);
        assert_eq!(state.remaining, 99);
    }
}
