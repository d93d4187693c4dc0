//! Sources: pluggable envelope parsers bound to a discriminator.
//!
//! A source knows one wire envelope (an EventBridge event, an SNS
//! notification, a task-token message, a custom webhook body) and turns
//! it into an [`Envelope`] the router can dispatch. Sources are matched
//! by their [`Discriminate`] predicate before `parse` runs, so the
//! expensive step only happens for messages that plausibly belong to
//! this source.

use std::fmt;
use std::sync::Arc;

use crate::BoxFuture;
use crate::context::Context;
use crate::discriminator::Discriminate;
use crate::error::{BoxError, DispatchError};
use crate::hooks::SourceHooks;
use crate::reply::DynReplier;

/// A transport completion callback.
///
/// Fires at most once per dispatch; `FnOnce` makes the "exactly once"
/// contract a type-level fact. It receives the final error the router
/// concluded (including any hook override) and its own return value
/// becomes the return value of the dispatch: `Ok` normalizes a failure
/// to success, `Err` supersedes everything that came before.
pub type CompletionFn = Box<
    dyn FnOnce(Context, Option<DispatchError>) -> BoxFuture<'static, Result<(), BoxError>> + Send,
>;

/// The result of a source's parse step.
///
/// Created per message and consumed within one dispatch; never persisted.
pub struct Envelope {
    /// Routing key, matched against registered handler keys.
    pub key: String,

    /// Schema version of the payload, if the envelope carries one.
    pub version: Option<String>,

    /// Raw payload bytes to decode into the handler's type.
    pub payload: Vec<u8>,

    /// Reply channel for request/response transports.
    pub replier: Option<Arc<dyn DynReplier>>,

    /// Transport completion callback, if any.
    pub complete: Option<CompletionFn>,
}

impl Envelope {
    /// Build an envelope with just a key and payload.
    pub fn new(key: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            version: None,
            payload,
            replier: None,
            complete: None,
        }
    }

    /// Attach a schema version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach a reply channel.
    #[must_use]
    pub fn with_replier(mut self, replier: Arc<dyn DynReplier>) -> Self {
        self.replier = Some(replier);
        self
    }

    /// Attach a completion callback.
    #[must_use]
    pub fn with_complete(mut self, complete: CompletionFn) -> Self {
        self.complete = Some(complete);
        self
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("key", &self.key)
            .field("version", &self.version)
            .field("payload_len", &self.payload.len())
            .field("replier", &self.replier.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// A message source: discriminator plus parse step.
///
/// Implement this for each envelope format the router should recognize:
///
/// ```rust,ignore
/// struct OrderSource;
///
/// impl Source for OrderSource {
///     fn name(&self) -> &str {
///         "orders"
///     }
///
///     fn discriminator(&self) -> &dyn Discriminate {
///         &self.disc
///     }
///
///     fn parse(&self, raw: &[u8]) -> Result<Envelope, BoxError> {
///         let env: OrderEnvelope = serde_json::from_slice(raw)?;
///         Ok(Envelope::new(env.kind, env.body))
///     }
/// }
/// ```
pub trait Source: Send + Sync + 'static {
    /// Source identifier for hooks, logging and metrics.
    fn name(&self) -> &str;

    /// The predicate that gates this source during matching.
    fn discriminator(&self) -> &dyn Discriminate;

    /// Parse raw bytes into a routing envelope.
    ///
    /// Only called after [`discriminator`](Self::discriminator) matched.
    fn parse(&self, raw: &[u8]) -> Result<Envelope, BoxError>;

    /// Source-specific lifecycle hooks.
    ///
    /// Returning `None` (the default) means every per-source hook is a
    /// no-op; the router asks once per dispatch.
    fn hooks(&self) -> Option<&dyn SourceHooks> {
        None
    }
}

/// A [`Source`] assembled from a name, a discriminator and a parse
/// closure, for sources that don't need a struct of their own.
///
/// ```rust,ignore
/// let source = FnSource::new("legacy", HasFields::new(["type", "payload"]), |raw| {
///     let env: LegacyEnvelope = serde_json::from_slice(raw)?;
///     Ok(Envelope::new(env.kind, env.body.to_vec()))
/// });
/// ```
pub struct FnSource<P> {
    name: String,
    discriminator: Box<dyn Discriminate>,
    parse: P,
}

impl<P> FnSource<P>
where
    P: Fn(&[u8]) -> Result<Envelope, BoxError> + Send + Sync + 'static,
{
    /// Build a source from its three parts.
    pub fn new(
        name: impl Into<String>,
        discriminator: impl Discriminate,
        parse: P,
    ) -> Self {
        Self {
            name: name.into(),
            discriminator: Box::new(discriminator),
            parse,
        }
    }
}

impl<P> Source for FnSource<P>
where
    P: Fn(&[u8]) -> Result<Envelope, BoxError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn discriminator(&self) -> &dyn Discriminate {
        &*self.discriminator
    }

    fn parse(&self, raw: &[u8]) -> Result<Envelope, BoxError> {
        (self.parse)(raw)
    }
}
