//! Reply channels for request/response transports.
//!
//! A transport that expects an answer (an RPC-over-queue bridge, a
//! synchronous webhook, a task-token protocol) attaches a replier to the
//! envelope it parses. After the handler runs, the router hands the
//! serialized reply value to [`Replier::reply`], or the failure to
//! [`Replier::fail`].

use std::future::Future;

use crate::BoxFuture;
use crate::context::Context;
use crate::error::{BoxError, DispatchError};

/// Transport acknowledgment for request/response messages.
///
/// This trait uses native `async fn` for static dispatch. The envelope
/// stores the object-safe [`DynReplier`] form; every `Replier`
/// implements it automatically.
pub trait Replier: Send + Sync + 'static {
    /// Deliver a successful reply. `body` is the serialized reply value
    /// produced by the handler.
    fn reply(&self, ctx: &Context, body: &[u8]) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Deliver a failure. `err` is the handler outcome being acknowledged.
    ///
    /// Returning `Ok` leaves the original error standing; returning `Err`
    /// supersedes it.
    fn fail(
        &self,
        ctx: &Context,
        err: &DispatchError,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Object-safe version of [`Replier`], stored on the envelope.
pub trait DynReplier: Send + Sync + 'static {
    /// Deliver a successful reply (dynamic dispatch version).
    fn reply_dyn<'a>(&'a self, ctx: &'a Context, body: &'a [u8])
    -> BoxFuture<'a, Result<(), BoxError>>;

    /// Deliver a failure (dynamic dispatch version).
    fn fail_dyn<'a>(
        &'a self,
        ctx: &'a Context,
        err: &'a DispatchError,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

// Blanket implementation: any Replier is a DynReplier.
impl<T: Replier> DynReplier for T {
    fn reply_dyn<'a>(
        &'a self,
        ctx: &'a Context,
        body: &'a [u8],
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.reply(ctx, body))
    }

    fn fail_dyn<'a>(
        &'a self,
        ctx: &'a Context,
        err: &'a DispatchError,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.fail(ctx, err))
    }
}
