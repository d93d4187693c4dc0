//! Hook chain execution and decision precedence.
//!
//! One place owns the ordering rules:
//!
//! - global hooks fire in registration order, the source hook last;
//! - the parse chain threads the context through every hook;
//! - decision chains run every applicable hook (no short-circuit) and
//!   keep the first error produced in evaluation order;
//! - with no error, at least one registered *global* hook of the kind
//!   means "skip"; zero means the kind's fallback error is synthesized.
//!
//! That last rule is load-bearing: registering a single no-op decision
//! hook flips the default for its kind from fail to skip.

use std::time::Duration;

use courier_core::{
    BoxError, Context, DispatchError, OnDispatchFn, OnFailureFn, OnNoHandlerFn, OnNoSourceFn,
    OnParseFn, OnSourceParseErrorFn, OnSuccessFn, OnUnmarshalErrorFn, OnValidationErrorFn,
    SourceHooks,
};

/// Global hooks in registration order, one vector per lifecycle point.
#[derive(Default)]
pub(crate) struct HookSet {
    pub(crate) on_parse: Vec<OnParseFn>,
    pub(crate) on_dispatch: Vec<OnDispatchFn>,
    pub(crate) on_success: Vec<OnSuccessFn>,
    pub(crate) on_failure: Vec<OnFailureFn>,
    pub(crate) on_no_source: Vec<OnNoSourceFn>,
    pub(crate) on_source_parse_error: Vec<OnSourceParseErrorFn>,
    pub(crate) on_no_handler: Vec<OnNoHandlerFn>,
    pub(crate) on_unmarshal_error: Vec<OnUnmarshalErrorFn>,
    pub(crate) on_validation_error: Vec<OnValidationErrorFn>,
}

/// Resolve a decision chain: first error wins, otherwise skip or the
/// synthesized fallback depending on whether any global hook ran.
fn decide(
    first_error: Option<BoxError>,
    global_count: usize,
    fallback: impl FnOnce() -> DispatchError,
) -> Result<(), DispatchError> {
    match first_error {
        Some(err) => Err(DispatchError::Hook(err)),
        None if global_count == 0 => Err(fallback()),
        None => Ok(()),
    }
}

impl HookSet {
    /// Thread the context through global parse hooks, then the source
    /// hook. The returned context is used for the rest of the dispatch.
    pub(crate) fn chain_parse(
        &self,
        mut ctx: Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
    ) -> Context {
        for hook in &self.on_parse {
            ctx = hook(ctx, source, key);
        }
        if let Some(hooks) = source_hooks {
            ctx = hooks.on_parse(ctx, key);
        }
        ctx
    }

    pub(crate) fn notify_dispatch(
        &self,
        ctx: &Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
    ) {
        for hook in &self.on_dispatch {
            hook(ctx, source, key);
        }
        if let Some(hooks) = source_hooks {
            hooks.on_dispatch(ctx, key);
        }
    }

    pub(crate) fn notify_success(
        &self,
        ctx: &Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
        elapsed: Duration,
    ) {
        for hook in &self.on_success {
            hook(ctx, source, key, elapsed);
        }
        if let Some(hooks) = source_hooks {
            hooks.on_success(ctx, key, elapsed);
        }
    }

    pub(crate) fn notify_failure(
        &self,
        ctx: &Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
        err: &DispatchError,
        elapsed: Duration,
    ) {
        for hook in &self.on_failure {
            hook(ctx, source, key, err, elapsed);
        }
        if let Some(hooks) = source_hooks {
            hooks.on_failure(ctx, key, err, elapsed);
        }
    }

    /// No source matched. Global-only: there is no source to ask.
    pub(crate) fn decide_no_source(&self, ctx: &Context, raw: &[u8]) -> Result<(), DispatchError> {
        let mut first_error = None;
        for hook in &self.on_no_source {
            if let Some(err) = hook(ctx, raw) {
                first_error.get_or_insert(err);
            }
        }
        decide(first_error, self.on_no_source.len(), || {
            DispatchError::NoSource
        })
    }

    /// A source matched but its parse step failed. Global-only.
    pub(crate) fn decide_source_parse(
        &self,
        ctx: &Context,
        source: &str,
        cause: BoxError,
    ) -> Result<(), DispatchError> {
        let mut first_error = None;
        for hook in &self.on_source_parse_error {
            if let Some(err) = hook(ctx, source, &cause) {
                first_error.get_or_insert(err);
            }
        }
        decide(first_error, self.on_source_parse_error.len(), || {
            DispatchError::SourceParse {
                name: source.to_string(),
                cause,
            }
        })
    }

    pub(crate) fn decide_no_handler(
        &self,
        ctx: &Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
    ) -> Result<(), DispatchError> {
        let mut first_error = None;
        for hook in &self.on_no_handler {
            if let Some(err) = hook(ctx, source, key) {
                first_error.get_or_insert(err);
            }
        }
        if let Some(hooks) = source_hooks {
            if let Some(err) = hooks.on_no_handler(ctx, key) {
                first_error.get_or_insert(err);
            }
        }
        decide(first_error, self.on_no_handler.len(), || {
            DispatchError::NoHandler(key.to_string())
        })
    }

    pub(crate) fn decide_unmarshal(
        &self,
        ctx: &Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
        cause: BoxError,
    ) -> Result<(), DispatchError> {
        let mut first_error = None;
        for hook in &self.on_unmarshal_error {
            if let Some(err) = hook(ctx, source, key, &cause) {
                first_error.get_or_insert(err);
            }
        }
        if let Some(hooks) = source_hooks {
            if let Some(err) = hooks.on_unmarshal_error(ctx, key, &cause) {
                first_error.get_or_insert(err);
            }
        }
        decide(first_error, self.on_unmarshal_error.len(), || {
            DispatchError::Unmarshal(cause)
        })
    }

    pub(crate) fn decide_validation(
        &self,
        ctx: &Context,
        source_hooks: Option<&dyn SourceHooks>,
        source: &str,
        key: &str,
        cause: BoxError,
    ) -> Result<(), DispatchError> {
        let mut first_error = None;
        for hook in &self.on_validation_error {
            if let Some(err) = hook(ctx, source, key, &cause) {
                first_error.get_or_insert(err);
            }
        }
        if let Some(hooks) = source_hooks {
            if let Some(err) = hooks.on_validation_error(ctx, key, &cause) {
                first_error.get_or_insert(err);
            }
        }
        decide(first_error, self.on_validation_error.len(), || {
            DispatchError::Validation(cause)
        })
    }
}
