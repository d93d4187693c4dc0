//! Lifecycle hook signatures.
//!
//! Hooks observe and steer a dispatch at fixed points. They come in three
//! shapes:
//!
//! - **Context-returning** (`OnParseFn`): consumes the context, returns
//!   the context used for the remainder of the dispatch. Hooks chain:
//!   each receives what the previous one produced.
//! - **Side-effect** (`OnDispatchFn`, `OnSuccessFn`, `OnFailureFn`):
//!   observation only; every registered hook always fires.
//! - **Decision** (the `On*Error`/`OnNo*` aliases): returns
//!   `Option<BoxError>`: `None` votes "skip this message", `Some` votes
//!   "fail with this error". All applicable hooks run; the first error in
//!   evaluation order wins. Registering even one global decision hook of
//!   a kind flips that kind's default from fail to skip.
//!
//! Global hooks are registered on the router builder. Per-source hooks
//! come from [`SourceHooks`], an optional capability of a source; every
//! method defaults to a no-op so implementors override only what they
//! need.

use std::time::Duration;

use crate::context::Context;
use crate::error::{BoxError, DispatchError};

/// Called after a source resolves an envelope. Returns the context used
/// for the rest of the dispatch. Args: context, source name, routing key.
pub type OnParseFn = Box<dyn Fn(Context, &str, &str) -> Context + Send + Sync>;

/// Called immediately before the handler runs. Args: context, source
/// name, routing key.
pub type OnDispatchFn = Box<dyn Fn(&Context, &str, &str) + Send + Sync>;

/// Called after the handler succeeds, with the handler's wall-clock
/// duration. Args: context, source name, routing key, elapsed.
pub type OnSuccessFn = Box<dyn Fn(&Context, &str, &str, Duration) + Send + Sync>;

/// Called after the handler fails, with the failure and the handler's
/// wall-clock duration. Args: context, source name, routing key, error,
/// elapsed.
pub type OnFailureFn = Box<dyn Fn(&Context, &str, &str, &DispatchError, Duration) + Send + Sync>;

/// Decision hook: no source matched the message. Args: context, raw
/// bytes.
pub type OnNoSourceFn = Box<dyn Fn(&Context, &[u8]) -> Option<BoxError> + Send + Sync>;

/// Decision hook: a source matched but its parse step failed. Args:
/// context, source name, parse error.
pub type OnSourceParseErrorFn =
    Box<dyn Fn(&Context, &str, &BoxError) -> Option<BoxError> + Send + Sync>;

/// Decision hook: the routing key has no handler. Args: context, source
/// name, routing key.
pub type OnNoHandlerFn = Box<dyn Fn(&Context, &str, &str) -> Option<BoxError> + Send + Sync>;

/// Decision hook: payload decode failed. Args: context, source name,
/// routing key, decode error.
pub type OnUnmarshalErrorFn =
    Box<dyn Fn(&Context, &str, &str, &BoxError) -> Option<BoxError> + Send + Sync>;

/// Decision hook: payload validation failed. Args: context, source name,
/// routing key, validation error.
pub type OnValidationErrorFn =
    Box<dyn Fn(&Context, &str, &str, &BoxError) -> Option<BoxError> + Send + Sync>;

/// Source-specific lifecycle hooks.
///
/// Returned by [`Source::hooks`]; every method defaults to a no-op, so a
/// source overrides only the points it cares about. Per-source hooks run
/// after the corresponding global hooks: the parse hook receives the
/// fully-chained context, and a decision hook's error loses to any error
/// an earlier global hook produced.
///
/// There is no per-source counterpart for the no-source and source-parse
/// decision points: in the first case no source matched, in the second
/// this source's own parse just failed.
///
/// [`Source::hooks`]: crate::Source::hooks
pub trait SourceHooks: Send + Sync {
    /// Enrich the context after this source parsed an envelope.
    fn on_parse(&self, ctx: Context, key: &str) -> Context {
        let _ = key;
        ctx
    }

    /// Observe the imminent handler invocation.
    fn on_dispatch(&self, ctx: &Context, key: &str) {
        let _ = (ctx, key);
    }

    /// Observe a successful handler invocation.
    fn on_success(&self, ctx: &Context, key: &str, elapsed: Duration) {
        let _ = (ctx, key, elapsed);
    }

    /// Observe a failed handler invocation.
    fn on_failure(&self, ctx: &Context, key: &str, err: &DispatchError, elapsed: Duration) {
        let _ = (ctx, key, err, elapsed);
    }

    /// Vote on a missing handler for this source's key.
    fn on_no_handler(&self, ctx: &Context, key: &str) -> Option<BoxError> {
        let _ = (ctx, key);
        None
    }

    /// Vote on a payload decode failure.
    fn on_unmarshal_error(&self, ctx: &Context, key: &str, err: &BoxError) -> Option<BoxError> {
        let _ = (ctx, key, err);
        None
    }

    /// Vote on a payload validation failure.
    fn on_validation_error(&self, ctx: &Context, key: &str, err: &BoxError) -> Option<BoxError> {
        let _ = (ctx, key, err);
        None
    }
}
