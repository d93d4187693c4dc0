//! # courier: discriminator-routed message dispatch
//!
//! `courier` routes raw byte payloads from queues, webhooks and event
//! buses to typed handler functions, keyed by a routing key discovered at
//! runtime. It handles envelope detection, payload decoding, validation
//! and transport acknowledgment, leaving handlers as pure business logic.
//!
//! ## Quick start
//!
//! Define a payload and a handler:
//!
//! ```rust,ignore
//! #[derive(Deserialize)]
//! struct UserCreated {
//!     user_id: String,
//!     email: String,
//! }
//!
//! impl Payload for UserCreated {}
//! ```
//!
//! Build a router, add sources, register handlers:
//!
//! ```rust,ignore
//! let router = Router::builder()
//!     .source(event_bridge_source)
//!     .register("user/created", move |ctx: Context, p: UserCreated| {
//!         let onboarding = onboarding.clone();
//!         async move { onboarding.register(&p.user_id, &p.email).await }
//!     })
//!     .build()?;
//!
//! // Per consumed message:
//! router.process(Context::new(), raw).await?;
//! ```
//!
//! ## Two-phase matching
//!
//! Sources are matched in two steps: a cheap [`Discriminate`] predicate
//! over an inspected [`View`] of the bytes, then the matched source's
//! full parse. The position of the last successful source is kept in an
//! atomic hint and revalidated per message, so steady traffic of one
//! shape resolves in O(1) instead of O(sources). Views are cached per
//! dispatch: each inspector runs at most once per message.
//!
//! ## Hooks
//!
//! Global hooks (builder methods) and per-source hooks ([`SourceHooks`])
//! observe parse, dispatch, success and failure, and decide skip-vs-fail
//! for unroutable, undecodable and invalid messages. See the builder's
//! `on_*` methods for the precedence rules.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod chain;
mod matcher;
mod registry;
mod router;

pub use courier_core::{
    All, AnyOf, BoxError, BoxFuture, CompletionFn, Context, Discriminate, DispatchError,
    DynReplier, Envelope, FieldEquals, FnSource, Handler, HasFields, Inspector, OnDispatchFn,
    OnFailureFn, OnNoHandlerFn, OnNoSourceFn, OnParseFn, OnSourceParseErrorFn, OnSuccessFn,
    OnUnmarshalErrorFn, OnValidationErrorFn, Payload, Replier, Source, SourceHooks, View,
};
pub use router::{BuildError, Router, RouterBuilder};

/// The default JSON inspector/view pair.
pub mod json {
    pub use courier_std::json::{InvalidJson, JsonInspector, JsonView};
}

/// Ready-made tracing hooks.
pub mod observe {
    pub use courier_std::observe::{
        log_dispatch, log_failure, log_parse, log_success, skip_no_source,
    };
}

/// Testing utilities.
pub mod testing {
    pub use courier_std::testing::{CountingInspector, FailingInspector, RecordingReplier};
}

/// Common imports for Courier.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BoxError, Context, Discriminate, DispatchError, Envelope, FieldEquals, FnSource, Handler,
        HasFields, Inspector, Payload, Replier, Router, Source, SourceHooks, View,
    };
}
