//! Handler registry and the type-erased invocation pipeline.
//!
//! A typed handler is erased at registration time into an invoker
//! closure that captures the concrete decode, validate and call steps.
//! The registry stores invokers by routing key; at dispatch time the
//! router only ever sees the erased form.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use courier_core::{BoxError, Context, Handler, Payload};
use futures::future::BoxFuture;
use serde::Serialize;

/// How an invocation went wrong. Tagging happens inside the invoker,
/// where the concrete payload type is still known; the router maps each
/// tag to its decision path.
pub(crate) enum InvokeError {
    /// Payload bytes did not decode into the handler's type.
    Unmarshal(BoxError),
    /// The decoded payload rejected itself.
    Validation(BoxError),
    /// The user handler returned an error.
    Handler(BoxError),
    /// The reply value did not serialize. Fatal.
    MarshalReply(BoxError),
}

/// Outcome of one invoker run.
///
/// `elapsed` covers the user handler call only (decode, validation and
/// reply marshalling are excluded) and is present only when the handler
/// actually ran.
pub(crate) struct Invocation {
    pub(crate) result: Result<Option<Vec<u8>>, InvokeError>,
    pub(crate) elapsed: Option<Duration>,
}

/// A type-erased handler invocation: decode, validate, call, and (for
/// replying handlers) marshal the reply value.
pub(crate) type Invoker =
    Box<dyn Fn(Context, Vec<u8>) -> BoxFuture<'static, Invocation> + Send + Sync>;

/// Routing key to invoker map. Immutable after build.
pub(crate) struct HandlerRegistry {
    entries: HashMap<String, Invoker>,
}

impl HandlerRegistry {
    pub(crate) fn new(entries: HashMap<String, Invoker>) -> Self {
        Self { entries }
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Invoker> {
        self.entries.get(key)
    }
}

fn decode_and_validate<T: Payload>(payload: &[u8]) -> Result<T, InvokeError> {
    let data: T =
        serde_json::from_slice(payload).map_err(|err| InvokeError::Unmarshal(err.into()))?;
    data.validate().map_err(InvokeError::Validation)?;
    Ok(data)
}

/// Erase a fire-and-forget handler.
pub(crate) fn erase<T, H>(handler: H) -> Invoker
where
    T: Payload,
    H: Handler<T, Output = Result<(), BoxError>>,
{
    let handler = Arc::new(handler);
    Box::new(move |ctx, payload| {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let data = match decode_and_validate::<T>(&payload) {
                Ok(data) => data,
                Err(err) => {
                    return Invocation {
                        result: Err(err),
                        elapsed: None,
                    };
                }
            };

            let start = Instant::now();
            let outcome = handler.handle(ctx, data).await;
            let elapsed = Some(start.elapsed());

            let result = match outcome {
                Ok(()) => Ok(None),
                Err(err) => Err(InvokeError::Handler(err)),
            };
            Invocation { result, elapsed }
        })
    })
}

/// Erase a request/response handler. The reply value is serialized here,
/// while its concrete type is still known; delivery happens later in the
/// dispatch, after the success hooks have run.
pub(crate) fn erase_replying<T, R, H>(handler: H) -> Invoker
where
    T: Payload,
    R: Serialize + Send + 'static,
    H: Handler<T, Output = Result<R, BoxError>>,
{
    let handler = Arc::new(handler);
    Box::new(move |ctx, payload| {
        let handler = Arc::clone(&handler);
        Box::pin(async move {
            let data = match decode_and_validate::<T>(&payload) {
                Ok(data) => data,
                Err(err) => {
                    return Invocation {
                        result: Err(err),
                        elapsed: None,
                    };
                }
            };

            let start = Instant::now();
            let outcome = handler.handle(ctx, data).await;
            let elapsed = Some(start.elapsed());

            let result = match outcome {
                Ok(reply) => match serde_json::to_vec(&reply) {
                    Ok(body) => Ok(Some(body)),
                    Err(err) => Err(InvokeError::MarshalReply(err.into())),
                },
                Err(err) => Err(InvokeError::Handler(err)),
            };
            Invocation { result, elapsed }
        })
    })
}
