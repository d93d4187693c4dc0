//! Format-agnostic field access over raw bytes.
//!
//! An [`Inspector`] examines raw bytes and returns a [`View`] for field
//! queries. Different inspectors handle different wire formats (JSON,
//! protobuf, etc.); the router never touches the bytes directly during
//! matching; it only asks views about fields.

use crate::error::BoxError;

/// Examines raw bytes and produces a [`View`] for field queries.
///
/// Inspectors are format-specific. The router calls an inspector at most
/// once per message per inspector instance: the resulting view is cached
/// for the remainder of the dispatch, however many sources share it.
///
/// Returning an error means "this format does not apply to these bytes".
/// During matching that is not a failure: the group backed by this
/// inspector is simply skipped.
pub trait Inspector: Send + Sync + 'static {
    /// Parse `raw` into a queryable view.
    fn inspect(&self, raw: &[u8]) -> Result<Box<dyn View>, BoxError>;
}

/// Field access for discriminator matching.
///
/// Paths use dotted addressing for nested structures, e.g.
/// `"detail.order.id"`. Array elements are addressed by index segment,
/// e.g. `"records.0"`.
pub trait View: Send + Sync {
    /// Returns true if the path exists in the message.
    fn has_field(&self, path: &str) -> bool;

    /// Returns the string value at `path`, or `None` if the path is
    /// missing or the value is not a string.
    fn get_string(&self, path: &str) -> Option<String>;

    /// Returns the encoded bytes of the value at `path`, or `None` if the
    /// path is missing. For JSON this is the raw JSON encoding of the
    /// value, quotes included for strings.
    fn get_bytes(&self, path: &str) -> Option<Vec<u8>>;
}
