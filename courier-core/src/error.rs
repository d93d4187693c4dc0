//! Error types for Courier.
//!
//! The engine reports every outcome through a single taxonomy,
//! [`DispatchError`], so callers can match on the kind of failure
//! (decode vs validation vs handler) instead of inspecting strings.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The outcome taxonomy of a single dispatch.
///
/// Each variant corresponds to one stage of the processing pipeline.
/// Variants stay matchable after wrapping: the original cause is carried
/// as the `source` of the variant, never flattened into a string.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No discriminator/inspector combination accepted the bytes.
    #[error("no source matched message")]
    NoSource,

    /// A discriminator matched but the source's own parse step failed.
    #[error("parse failed for source {name}")]
    SourceParse {
        /// Name of the source whose parse step failed.
        name: String,
        /// The parse error reported by the source.
        #[source]
        cause: BoxError,
    },

    /// The resolved routing key has no registered handler.
    #[error("no handler for key: {0}")]
    NoHandler(String),

    /// The payload bytes could not be decoded into the handler's type.
    #[error("unmarshal payload")]
    Unmarshal(#[source] BoxError),

    /// The decoded payload rejected itself via [`Payload::validate`].
    ///
    /// [`Payload::validate`]: crate::Payload::validate
    #[error("validate payload")]
    Validation(#[source] BoxError),

    /// The user handler returned an error.
    #[error("handler failed")]
    Handler(#[source] BoxError),

    /// A reply value could not be serialized. Fatal: no hook can
    /// convert this into a skip.
    #[error("marshal reply for key {key}")]
    MarshalReply {
        /// Routing key of the handler whose reply failed to serialize.
        key: String,
        /// The serialization error.
        #[source]
        cause: BoxError,
    },

    /// The transport's reply acknowledgment failed. Supersedes the
    /// handler outcome it was acknowledging.
    #[error("reply failed")]
    Reply(#[source] BoxError),

    /// The transport's completion callback failed. Supersedes every
    /// earlier outcome, including a handler error.
    #[error("completion failed")]
    Completion(#[source] BoxError),

    /// An error substituted by a decision hook.
    #[error(transparent)]
    Hook(BoxError),
}
