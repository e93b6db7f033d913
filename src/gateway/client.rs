// Request gateway client.
// Single entry point for outbound HTTP calls with optional GET caching.

use std::sync::Arc;

use reqwest::{
    Client, Method,
    header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::cache::{ApiCache, CacheStats, InvalidatePattern};
use crate::error::{CachegateError, Result};

use super::notify::{LogNotifier, Notifier};
use super::options::{CacheOptions, ErrorOptions, RequestOptions};

/// HTTP client with a consult-before-fetch response cache.
///
/// All outbound calls go through [`request`](Self::request): it checks the
/// cache for enabled GET calls, performs the network fetch on a miss, and
/// writes successful GET responses back. Non-GET methods always bypass the
/// cache. Failures funnel through one handler that logs, optionally
/// notifies, and either propagates or resolves to a fallback value.
pub struct ApiClient {
    http: Client,
    cache: Arc<ApiCache>,
    base_url: Option<String>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    /// Create a client over the given cache store.
    pub fn new(cache: Arc<ApiCache>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("cachegate"));

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(CachegateError::Transport)?;

        Ok(Self {
            http,
            cache,
            base_url: None,
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Resolve relative request paths against this base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Route failure notifications to a custom receiver.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// The cache store backing this client.
    pub fn cache(&self) -> &Arc<ApiCache> {
        &self.cache
    }

    /// Make an HTTP request, consulting the cache for enabled GET calls.
    ///
    /// Returns the parsed JSON payload. Non-2xx statuses, transport
    /// failures, and malformed payloads are failures; per `error_options`
    /// they either propagate or resolve to the configured fallback.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
        cache_options: CacheOptions,
        error_options: ErrorOptions,
    ) -> Result<Value> {
        let operation = format!("{} request to {}", method.as_str().to_lowercase(), url);

        match self.perform(method, url, options, cache_options).await {
            Ok(payload) => Ok(payload),
            Err(err) => self.handle_failure(&operation, err, &error_options),
        }
    }

    /// Shorthand for GET requests.
    pub async fn get(
        &self,
        url: &str,
        options: RequestOptions,
        cache_options: CacheOptions,
        error_options: ErrorOptions,
    ) -> Result<Value> {
        self.request(Method::GET, url, options, cache_options, error_options)
            .await
    }

    /// Shorthand for POST requests with a JSON body.
    pub async fn post(
        &self,
        url: &str,
        body: Value,
        options: RequestOptions,
        error_options: ErrorOptions,
    ) -> Result<Value> {
        self.request(
            Method::POST,
            url,
            options.body(body),
            CacheOptions::default(),
            error_options,
        )
        .await
    }

    /// Shorthand for PUT requests with a JSON body.
    pub async fn put(
        &self,
        url: &str,
        body: Value,
        options: RequestOptions,
        error_options: ErrorOptions,
    ) -> Result<Value> {
        self.request(
            Method::PUT,
            url,
            options.body(body),
            CacheOptions::default(),
            error_options,
        )
        .await
    }

    /// Shorthand for DELETE requests. Never cached.
    pub async fn delete(
        &self,
        url: &str,
        options: RequestOptions,
        error_options: ErrorOptions,
    ) -> Result<Value> {
        self.request(
            Method::DELETE,
            url,
            options,
            CacheOptions::default(),
            error_options,
        )
        .await
    }

    /// Delete every cached entry whose key matches the pattern. Call after
    /// mutations to evict responses the mutation made stale.
    pub async fn invalidate(&self, pattern: &InvalidatePattern) -> usize {
        self.cache.invalidate(pattern).await
    }

    /// Delete all cached entries.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Aggregate cache size and entry count.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn perform(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
        cache_options: CacheOptions,
    ) -> Result<Value> {
        if url.is_empty() {
            return Err(CachegateError::EmptyUrl);
        }

        let full_url = resolve_url(self.base_url.as_deref(), url);

        // Caching is a GET-only optimization; enabling it for other methods
        // would serve stale reads for mutations.
        let cache_enabled = cache_options.enabled && method == Method::GET;

        let params_value = options.params.clone().map(Value::Object);
        let cache_key = cache_options.key.clone().unwrap_or_else(|| {
            ApiCache::generate_key(
                &full_url,
                method.as_str(),
                params_value.as_ref(),
                options.body.as_ref(),
            )
        });

        if cache_enabled
            && let Some(payload) = self.cache.get(&cache_key, cache_options.ttl).await
        {
            debug!(url = %full_url, "cache hit");
            return Ok(payload);
        }

        let mut request = self.http.request(method.clone(), &full_url);

        if let Some(params) = &options.params {
            request = request.query(&build_query_pairs(params));
        }

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| CachegateError::InvalidHeader(err.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| CachegateError::InvalidHeader(err.to_string()))?;
            request = request.header(name, value);
        }

        if method != Method::GET
            && let Some(body) = &options.body
        {
            request = request.json(body);
        }

        debug!(url = %full_url, method = %method, "sending request");
        let response = request.send().await.map_err(CachegateError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CachegateError::HttpStatus {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let text = response.text().await.map_err(CachegateError::Transport)?;
        let payload: Value = serde_json::from_str(&text)?;

        if cache_enabled {
            // Best effort: a failed write degrades to a future cache miss.
            self.cache.set(&cache_key, payload.clone()).await;
            debug!(url = %full_url, "cached response");
        }

        Ok(payload)
    }

    /// Single funnel for request failures: log, optionally notify, then
    /// either propagate or resolve to the configured fallback value.
    fn handle_failure(
        &self,
        operation: &str,
        err: CachegateError,
        error_options: &ErrorOptions,
    ) -> Result<Value> {
        error!(operation, error = %err, "request failed");

        if error_options.notify {
            self.notifier.notify(operation, &err);
        }

        if error_options.rethrow {
            return Err(err);
        }

        Ok(error_options.default_value.clone().unwrap_or(Value::Null))
    }
}

/// Resolve a request path against an optional base URL. Absolute URLs pass
/// through untouched.
fn resolve_url(base_url: Option<&str>, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }

    match base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/')),
        None => url.to_string(),
    }
}

/// Flatten query params into string pairs: `null` values are omitted, bare
/// strings pass through unquoted, everything else serializes as compact JSON.
fn build_query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((name.clone(), text.clone())),
            other => Some((name.clone(), other.to_string())),
        })
        .collect()
}
