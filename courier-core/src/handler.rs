//! Typed payloads and the terminal handler trait.
//!
//! Handlers are the endpoint of a dispatch: pure business logic over a
//! concrete payload type. The router owns decoding and validation; the
//! handler never sees raw bytes.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::BoxError;

/// A decodable message payload.
///
/// Implementing `Payload` is the explicit opt-in that lets a type be the
/// target of handler registration. The default [`validate`](Self::validate)
/// accepts everything; override it to have the router reject a decoded
/// payload before the handler runs:
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct CreateUser {
///     email: String,
/// }
///
/// impl Payload for CreateUser {
///     fn validate(&self) -> Result<(), BoxError> {
///         if self.email.is_empty() {
///             return Err("email is required".into());
///         }
///         Ok(())
///     }
/// }
/// ```
///
/// A validation failure is reported as its own error kind, distinct from
/// decode failures and handler errors, and can be intercepted by the
/// matching decision hook.
pub trait Payload: DeserializeOwned + Send + 'static {
    /// Check the decoded payload before it reaches the handler.
    fn validate(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

/// The terminal endpoint of a dispatch.
///
/// `Output` is `Result<(), BoxError>` for fire-and-forget handlers, or
/// `Result<R, BoxError>` for request/response handlers whose reply value
/// the router serializes and hands to the envelope's replier.
///
/// Closures of shape `Fn(Context, T) -> Future` implement the trait
/// directly, so most handlers never name it:
///
/// ```rust,ignore
/// builder.register("user/created", |ctx: Context, p: CreateUser| async move {
///     onboarding.register(&p.email).await?;
///     Ok(())
/// });
/// ```
pub trait Handler<T: Payload>: Send + Sync + 'static {
    /// What the handler produces; see the trait docs.
    type Output: Send + 'static;

    /// Execute the handler logic.
    fn handle(&self, ctx: Context, payload: T) -> impl Future<Output = Self::Output> + Send;
}

impl<F, T, Fut> Handler<T> for F
where
    T: Payload,
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: Send + 'static,
{
    type Output = Fut::Output;

    fn handle(&self, ctx: Context, payload: T) -> impl Future<Output = Self::Output> + Send {
        self(ctx, payload)
    }
}
