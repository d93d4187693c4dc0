//! Tracing hooks for dispatch observation.
//!
//! Plain functions shaped to slot straight into the router builder's
//! hook methods:
//!
//! ```rust,ignore
//! let router = Router::builder()
//!     .on_dispatch(observe::log_dispatch)
//!     .on_success(observe::log_success)
//!     .on_failure(observe::log_failure)
//!     .build()?;
//! ```

use std::time::Duration;

use courier_core::{BoxError, Context, DispatchError};

/// Log a resolved source at debug level. Context passes through
/// unchanged.
pub fn log_parse(ctx: Context, source: &str, key: &str) -> Context {
    tracing::debug!(source, key, "source resolved");
    ctx
}

/// Log the imminent handler invocation at debug level.
pub fn log_dispatch(_ctx: &Context, source: &str, key: &str) {
    tracing::debug!(source, key, "dispatching message");
}

/// Log a handled message with its duration at info level.
pub fn log_success(_ctx: &Context, source: &str, key: &str, elapsed: Duration) {
    tracing::info!(source, key, ?elapsed, "message handled");
}

/// Log a failed handler with its duration at error level.
pub fn log_failure(_ctx: &Context, source: &str, key: &str, err: &DispatchError, elapsed: Duration) {
    tracing::error!(source, key, error = %err, ?elapsed, "handler failed");
}

/// Log an unroutable message at warn level and vote to skip it.
///
/// Registering this hook changes behavior, not just visibility: with at
/// least one no-source hook in place the router skips unmatched messages
/// instead of failing them. Use it when unmatched traffic is expected
/// (shared queues, fan-in topics) and the transport's dead-letter policy
/// should take over.
pub fn skip_no_source(_ctx: &Context, raw: &[u8]) -> Option<BoxError> {
    tracing::warn!(len = raw.len(), "no source matched message, skipping");
    None
}
