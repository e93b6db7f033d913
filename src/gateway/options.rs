// Per-call option types for the request gateway.
// Request shape, caching behavior, and failure handling are configured separately.

use std::time::Duration;

use serde_json::{Map, Value};

use crate::cache::DEFAULT_TTL;

/// Request shape beyond method and URL: headers, JSON body, query params.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers; `Content-Type: application/json` is always sent unless
    /// overridden here.
    pub headers: Vec<(String, String)>,
    /// JSON body, encoded for non-GET methods.
    pub body: Option<Value>,
    /// Query parameters appended to the URL. Entries with a `null` value are
    /// omitted; other values are stringified.
    pub params: Option<Map<String, Value>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value);
        self
    }
}

/// Caching behavior for a single call.
///
/// Caching is off unless explicitly enabled, and is forced off for non-GET
/// methods regardless of what the caller sets here.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Whether to consult and populate the cache for this call.
    pub enabled: bool,
    /// Maximum age for a cache hit to count as fresh, evaluated at read time.
    pub ttl: Duration,
    /// Caller-supplied key overriding the derived one.
    pub key: Option<String>,
}

impl CacheOptions {
    /// Caching enabled with the default TTL.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Caching enabled with a specific TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            enabled: true,
            ttl,
            ..Self::default()
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: DEFAULT_TTL,
            key: None,
        }
    }
}

/// Failure handling for a single call: fail loud (default) or fail soft with
/// a fallback value.
#[derive(Debug, Clone)]
pub struct ErrorOptions {
    /// Whether to emit a notification through the client's [`Notifier`].
    ///
    /// [`Notifier`]: crate::gateway::Notifier
    pub notify: bool,
    /// Whether to propagate the error to the caller. When false, the call
    /// resolves to `default_value` instead.
    pub rethrow: bool,
    /// Value returned on failure when `rethrow` is false; `Value::Null` if
    /// unset.
    pub default_value: Option<Value>,
}

impl ErrorOptions {
    /// Swallow failures and resolve to the given fallback value.
    pub fn soft(default_value: Value) -> Self {
        Self {
            notify: true,
            rethrow: false,
            default_value: Some(default_value),
        }
    }

    /// Propagate failures without emitting a notification.
    pub fn silent() -> Self {
        Self {
            notify: false,
            ..Self::default()
        }
    }
}

impl Default for ErrorOptions {
    fn default() -> Self {
        Self {
            notify: true,
            rethrow: true,
            default_value: None,
        }
    }
}
