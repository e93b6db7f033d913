// Request gateway module.
// Cached HTTP client, per-call options, and the failure notification seam.

pub mod client;
pub mod notify;
pub mod options;

pub use client::ApiClient;
pub use notify::{LogNotifier, Notifier};
pub use options::{CacheOptions, ErrorOptions, RequestOptions};
