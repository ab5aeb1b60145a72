use governor::{
    RateLimiter,
    Quota,
    DefaultDirectRateLimiter,
    Jitter
};
use moka::future::Cache;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::config::ApiConfig;
use crate::observability::ApiMetrics;

/// Rate-limited HTTP client for the portal backend.
///
/// Every outbound call waits on a shared token bucket first. Idempotent
/// lookups can opt into the response cache with [`RateLimitedHttpClient::post_json_cached`].
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    /// Decoded JSON responses by cache key; expiry is the cache TTL
    cache: Cache<String, serde_json::Value>,
    metrics: Arc<ApiMetrics>,
}

impl RateLimitedHttpClient {
    /// Create a new rate-limited HTTP client from the `[api]` settings
    pub fn new(settings: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(settings.base_url.clone()));
        }

        let per_second = NonZeroU32::new(settings.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(settings.burst_capacity).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.clone(),
                source,
            })?;

        let cache = Cache::builder()
            .max_capacity(settings.cache_capacity)
            .time_to_live(Duration::from_secs(settings.cache_ttl_seconds))
            .build();

        Ok(Self {
            http,
            base_url,
            rate_limiter,
            cache,
            metrics: Arc::new(ApiMetrics::new()),
        })
    }

    /// Client against `base_url` with default limits
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let settings = ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        };
        Self::new(&settings)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &ApiMetrics {
        &self.metrics
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let endpoint = self.endpoint(path);
        let response = self.send(self.http.get(&endpoint), &endpoint).await?;
        self.decode(response, &endpoint).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path);
        let response = self.send(self.http.post(&endpoint).json(body), &endpoint).await?;
        self.decode(response, &endpoint).await
    }

    /// POST without a body where only the status code matters
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let endpoint = self.endpoint(path);
        self.send(self.http.post(&endpoint), &endpoint).await?;
        Ok(())
    }

    /// Same as [`Self::post_json`] but answers repeated requests for `cache_key` from the cache
    pub async fn post_json_cached<B, T>(&self, cache_key: String, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: Serialize + DeserializeOwned,
    {
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(value) = serde_json::from_value(cached) {
                debug!(cache_key = %cache_key, "Cache hit");
                self.metrics.record_cache_hit();
                return Ok(value);
            }
        }
        self.metrics.record_cache_miss();

        let result: T = self.post_json(path, body).await?;

        if let Ok(serialized) = serde_json::to_value(&result) {
            self.cache.insert(cache_key, serialized).await;
            debug!("Cached response for future requests");
        }

        Ok(result)
    }

    async fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response, ApiError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        self.metrics.record_request();
        debug!(endpoint = %endpoint, "Executing backend request");

        let response = request.send().await.map_err(|source| {
            self.metrics.record_error();
            warn!(endpoint = %endpoint, error = %source, "Backend request failed");
            ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            self.metrics.record_error();
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint = %endpoint, status = status.as_u16(), "Backend returned error status");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response, endpoint: &str) -> Result<T, ApiError> {
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            self.metrics.record_error();
            ApiError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            }
        })
    }
}
