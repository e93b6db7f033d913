// Notification seam for request failures.
// UI layers (snackbars, status bars) plug in here; the default just logs.

use tracing::warn;

use crate::error::CachegateError;

/// Receives user-visible failure notifications from the gateway.
///
/// Implement this to surface failures in a UI; the gateway calls it for any
/// failed request whose `ErrorOptions.notify` is set.
pub trait Notifier: Send + Sync {
    fn notify(&self, operation: &str, error: &CachegateError);
}

/// Default notifier that emits a warning log and nothing else.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, operation: &str, error: &CachegateError) {
        warn!(operation, %error, "request failed");
    }
}
