//! # courier-core
//!
//! Core traits for the Courier message dispatch engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! transport adapters and format plugins that don't need the full `courier`
//! router.
//!
//! # Anatomy of a dispatch
//!
//! Courier routes raw bytes to typed handlers in three stages, each backed
//! by a trait defined here:
//!
//! ## Stage 1: Detection ([`Inspector`] / [`View`] / [`Discriminate`])
//!
//! An [`Inspector`] turns raw bytes into a [`View`], a format-agnostic
//! field accessor. A [`Discriminate`] predicate is then evaluated against
//! the view to decide, cheaply, whether a source applies; full envelope
//! parsing only happens after a discriminator matches.
//!
//! ## Stage 2: Extraction ([`Source`] / [`Envelope`])
//!
//! A [`Source`] pairs a discriminator with a parse step that produces an
//! [`Envelope`]: the routing key, the payload bytes, and the transport's
//! optional acknowledgment callbacks ([`Replier`], [`CompletionFn`]).
//!
//! ## Stage 3: Invocation ([`Payload`] / [`Handler`])
//!
//! The router decodes the payload into the handler's concrete type,
//! runs [`Payload::validate`], and calls the user [`Handler`] with a
//! [`Context`] enriched by the hook chain.
//!
//! # Hooks
//!
//! Global lifecycle hooks are plain closures (see the aliases in this
//! crate); per-source hooks are supplied through the [`SourceHooks`]
//! capability trait, queried once per message via [`Source::hooks`].
//!
//! # Error Types
//!
//! - [`DispatchError`] - the single user-visible error taxonomy
//! - [`BoxError`] - alias for user-supplied dynamic errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

use std::future::Future;
use std::pin::Pin;

mod context;
mod discriminator;
mod error;
mod handler;
mod hooks;
mod reply;
mod source;
mod view;

/// A boxed future, used at the object-safe seams of the engine.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// Re-exports
pub use context::Context;
pub use discriminator::{All, AnyOf, Discriminate, FieldEquals, HasFields};
pub use error::{BoxError, DispatchError};
pub use handler::{Handler, Payload};
pub use hooks::{
    OnDispatchFn, OnFailureFn, OnNoHandlerFn, OnNoSourceFn, OnParseFn, OnSourceParseErrorFn,
    OnSuccessFn, OnUnmarshalErrorFn, OnValidationErrorFn, SourceHooks,
};
pub use reply::{DynReplier, Replier};
pub use source::{CompletionFn, Envelope, FnSource, Source};
pub use view::{Inspector, View};
