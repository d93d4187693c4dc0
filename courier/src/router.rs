//! The router: registration surface and the dispatch orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use courier_core::{
    BoxError, CompletionFn, Context, DispatchError, Envelope, Handler, Inspector, Payload, Source,
};
use courier_std::json::JsonInspector;
use serde::Serialize;
use thiserror::Error;

use crate::chain::HookSet;
use crate::matcher::{Group, Matcher};
use crate::registry::{self, HandlerRegistry, InvokeError, Invoker};

/// Errors detected while assembling a router.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Two handlers were registered for the same routing key.
    #[error("handler already registered for key: {0}")]
    DuplicateHandler(String),
}

/// Dispatches messages to registered handlers based on routing keys.
///
/// Usage:
///
/// 1. Create a builder with [`Router::builder`]
/// 2. Add sources with [`source`](RouterBuilder::source) (or
///    [`group`](RouterBuilder::group) for custom inspectors)
/// 3. Register handlers with [`register`](RouterBuilder::register) /
///    [`register_replying`](RouterBuilder::register_replying)
/// 4. Build, then call [`process`](Router::process) per message
///
/// A built router is immutable apart from the internal matching hint and
/// safe to share across tasks; call `process` concurrently, one call per
/// consumer task.
///
/// ```rust,ignore
/// let router = Router::builder()
///     .source(event_bridge_source)
///     .source(sns_source)
///     .register("user/created", |ctx: Context, p: UserCreated| async move {
///         onboarding.register(&p.email).await
///     })
///     .build()?;
///
/// // In an SQS consumer task:
/// router.process(Context::new(), body.as_bytes()).await?;
/// ```
pub struct Router {
    matcher: Matcher,
    registry: HandlerRegistry,
    hooks: HookSet,
}

impl Router {
    /// Start configuring a router. Sources in the default group are
    /// matched with the JSON inspector unless
    /// [`inspector`](RouterBuilder::inspector) overrides it.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Parse the raw message, route it to a handler, and run completion
    /// callbacks.
    ///
    /// The processing flow:
    ///
    /// 1. Resolve a source via discriminators (adaptive hint first)
    /// 2. Parse the message with the matched source
    /// 3. Chain the parse hooks into the request context
    /// 4. Look up the handler by routing key
    /// 5. Decode the payload into the handler's type, then validate it
    /// 6. Call the handler, timing it for the success/failure hooks
    /// 7. Deliver the reply (replying handlers with a replier present)
    /// 8. Fire the envelope's completion callback with the final outcome
    ///
    /// Every await in this flow is user code: the handler, the replier,
    /// the completion callback. Dropping the returned future cancels the
    /// dispatch at the next such point.
    pub async fn process(&self, ctx: Context, raw: &[u8]) -> Result<(), DispatchError> {
        let Some(source) = self.matcher.resolve(raw) else {
            return self.hooks.decide_no_source(&ctx, raw);
        };
        let name = source.name();
        let source_hooks = source.hooks();

        let envelope = match source.parse(raw) {
            Ok(envelope) => envelope,
            Err(cause) => return self.hooks.decide_source_parse(&ctx, name, cause),
        };
        let Envelope {
            key,
            version: _,
            payload,
            replier,
            complete,
        } = envelope;

        let ctx = self.hooks.chain_parse(ctx, source_hooks, name, &key);

        let Some(invoker) = self.registry.get(&key) else {
            return self.hooks.decide_no_handler(&ctx, source_hooks, name, &key);
        };

        self.hooks.notify_dispatch(&ctx, source_hooks, name, &key);

        let invocation = invoker(ctx.clone(), payload).await;
        let elapsed = invocation.elapsed.unwrap_or_default();

        let outcome = match invocation.result {
            Err(InvokeError::Unmarshal(cause)) => {
                self.hooks
                    .decide_unmarshal(&ctx, source_hooks, name, &key, cause)
            }
            Err(InvokeError::Validation(cause)) => {
                self.hooks
                    .decide_validation(&ctx, source_hooks, name, &key, cause)
            }
            Err(InvokeError::Handler(cause)) => {
                let err = DispatchError::Handler(cause);
                self.hooks
                    .notify_failure(&ctx, source_hooks, name, &key, &err, elapsed);

                // The transport acknowledges the failure; its own error,
                // if any, supersedes the handler's.
                match &replier {
                    Some(replier) => match replier.fail_dyn(&ctx, &err).await {
                        Ok(()) => Err(err),
                        Err(cause) => Err(DispatchError::Reply(cause)),
                    },
                    None => Err(err),
                }
            }
            Err(InvokeError::MarshalReply(cause)) => {
                let err = DispatchError::MarshalReply {
                    key: key.clone(),
                    cause,
                };
                self.hooks
                    .notify_failure(&ctx, source_hooks, name, &key, &err, elapsed);
                Err(err)
            }
            Ok(reply_body) => {
                self.hooks
                    .notify_success(&ctx, source_hooks, name, &key, elapsed);

                match (reply_body, &replier) {
                    (Some(body), Some(replier)) => match replier.reply_dyn(&ctx, &body).await {
                        Ok(()) => Ok(()),
                        Err(cause) => Err(DispatchError::Reply(cause)),
                    },
                    _ => Ok(()),
                }
            }
        };

        finish(ctx, complete, outcome).await
    }
}

/// Fire the completion callback, if any, with the concluded outcome.
///
/// The transport owns the final status from here: a successful callback
/// normalizes the dispatch to success, a failing one supersedes whatever
/// error preceded it.
async fn finish(
    ctx: Context,
    complete: Option<CompletionFn>,
    outcome: Result<(), DispatchError>,
) -> Result<(), DispatchError> {
    let Some(complete) = complete else {
        return outcome;
    };
    match complete(ctx, outcome.err()).await {
        Ok(()) => Ok(()),
        Err(cause) => Err(DispatchError::Completion(cause)),
    }
}

/// Builder for [`Router`].
///
/// All registration happens here; [`build`](Self::build) closes the
/// configuration, so nothing can mutate a router that is already serving
/// concurrent `process` calls.
pub struct RouterBuilder {
    default_inspector: Arc<dyn Inspector>,
    default_sources: Vec<Arc<dyn Source>>,
    groups: Vec<Group>,
    handlers: Vec<(String, Invoker)>,
    hooks: HookSet,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterBuilder {
    /// Create an empty builder with the JSON inspector as default.
    pub fn new() -> Self {
        Self {
            default_inspector: Arc::new(JsonInspector::new()),
            default_sources: Vec::new(),
            groups: Vec::new(),
            handlers: Vec::new(),
            hooks: HookSet::default(),
        }
    }

    /// Replace the inspector used for the default source group.
    #[must_use]
    pub fn inspector(mut self, inspector: impl Inspector) -> Self {
        self.default_inspector = Arc::new(inspector);
        self
    }

    /// Add a source to the default group. Sources are matched via their
    /// discriminator in registration order; register catch-all sources
    /// last.
    #[must_use]
    pub fn source(mut self, source: impl Source) -> Self {
        self.default_sources.push(Arc::new(source));
        self
    }

    /// Add a group of sources matched with their own inspector. Use this
    /// when some sources carry a different wire format. Groups are
    /// checked after the default group, in registration order.
    #[must_use]
    pub fn group<I, S>(mut self, inspector: I, sources: S) -> Self
    where
        I: Inspector,
        S: IntoIterator<Item = Arc<dyn Source>>,
    {
        self.groups.push(Group {
            inspector: Arc::new(inspector),
            sources: sources.into_iter().collect(),
        });
        self
    }

    /// Register a handler for a routing key. The key must match the
    /// `key` field of an envelope produced by some source.
    #[must_use]
    pub fn register<T, H>(mut self, key: impl Into<String>, handler: H) -> Self
    where
        T: Payload,
        H: Handler<T, Output = Result<(), BoxError>>,
    {
        self.handlers.push((key.into(), registry::erase(handler)));
        self
    }

    /// Register a request/response handler. On success its reply value
    /// is serialized to JSON and delivered through the envelope's
    /// replier, when one is present.
    #[must_use]
    pub fn register_replying<T, R, H>(mut self, key: impl Into<String>, handler: H) -> Self
    where
        T: Payload,
        R: Serialize + Send + 'static,
        H: Handler<T, Output = Result<R, BoxError>>,
    {
        self.handlers
            .push((key.into(), registry::erase_replying(handler)));
        self
    }

    /// Add a parse hook: runs after a source resolves an envelope, and
    /// its returned context is used for the rest of the dispatch.
    /// Multiple hooks chain in registration order.
    #[must_use]
    pub fn on_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(Context, &str, &str) -> Context + Send + Sync + 'static,
    {
        self.hooks.on_parse.push(Box::new(hook));
        self
    }

    /// Add a hook that runs immediately before each handler invocation.
    #[must_use]
    pub fn on_dispatch<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &str) + Send + Sync + 'static,
    {
        self.hooks.on_dispatch.push(Box::new(hook));
        self
    }

    /// Add a hook that observes successful handler runs and their
    /// duration.
    #[must_use]
    pub fn on_success<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &str, std::time::Duration) + Send + Sync + 'static,
    {
        self.hooks.on_success.push(Box::new(hook));
        self
    }

    /// Add a hook that observes failed handler runs and their duration.
    #[must_use]
    pub fn on_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &str, &DispatchError, std::time::Duration) + Send + Sync + 'static,
    {
        self.hooks.on_failure.push(Box::new(hook));
        self
    }

    /// Add a decision hook for unroutable messages. Returning `None`
    /// skips the message; `Some` fails it. Registering any hook here
    /// flips the default for unmatched messages from fail to skip.
    #[must_use]
    pub fn on_no_source<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &[u8]) -> Option<BoxError> + Send + Sync + 'static,
    {
        self.hooks.on_no_source.push(Box::new(hook));
        self
    }

    /// Add a decision hook for source parse failures. Same skip/fail
    /// semantics as [`on_no_source`](Self::on_no_source).
    #[must_use]
    pub fn on_source_parse_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &BoxError) -> Option<BoxError> + Send + Sync + 'static,
    {
        self.hooks.on_source_parse_error.push(Box::new(hook));
        self
    }

    /// Add a decision hook for routing keys without a handler. Same
    /// skip/fail semantics as [`on_no_source`](Self::on_no_source).
    #[must_use]
    pub fn on_no_handler<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &str) -> Option<BoxError> + Send + Sync + 'static,
    {
        self.hooks.on_no_handler.push(Box::new(hook));
        self
    }

    /// Add a decision hook for payload decode failures. Same skip/fail
    /// semantics as [`on_no_source`](Self::on_no_source).
    #[must_use]
    pub fn on_unmarshal_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &str, &BoxError) -> Option<BoxError> + Send + Sync + 'static,
    {
        self.hooks.on_unmarshal_error.push(Box::new(hook));
        self
    }

    /// Add a decision hook for payload validation failures. Same
    /// skip/fail semantics as [`on_no_source`](Self::on_no_source).
    #[must_use]
    pub fn on_validation_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context, &str, &str, &BoxError) -> Option<BoxError> + Send + Sync + 'static,
    {
        self.hooks.on_validation_error.push(Box::new(hook));
        self
    }

    /// Close the configuration and build the router.
    ///
    /// Fails if two handlers were registered for the same key.
    pub fn build(self) -> Result<Router, BuildError> {
        let mut groups = Vec::with_capacity(self.groups.len() + 1);
        groups.push(Group {
            inspector: self.default_inspector,
            sources: self.default_sources,
        });
        groups.extend(self.groups);

        let mut entries = HashMap::with_capacity(self.handlers.len());
        for (key, invoker) in self.handlers {
            if entries.insert(key.clone(), invoker).is_some() {
                return Err(BuildError::DuplicateHandler(key));
            }
        }

        Ok(Router {
            matcher: Matcher::new(groups),
            registry: HandlerRegistry::new(entries),
            hooks: self.hooks,
        })
    }
}
