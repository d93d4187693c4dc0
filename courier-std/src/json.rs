//! JSON inspector and view.
//!
//! The default field accessor for source matching. The inspector parses
//! the document once up front; the router's per-dispatch view cache
//! guarantees that cost is paid at most once per message, however many
//! sources query the resulting view.

use courier_core::{BoxError, Inspector, View};
use serde_json::Value;
use thiserror::Error;

/// Error returned when the input is not valid JSON.
#[derive(Error, Debug)]
#[error("invalid JSON")]
pub struct InvalidJson(#[source] serde_json::Error);

/// An [`Inspector`] backed by `serde_json`.
///
/// This is the default inspector for sources added to the router's
/// default group.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonInspector;

impl JsonInspector {
    /// Create a JSON inspector.
    pub fn new() -> Self {
        Self
    }
}

impl Inspector for JsonInspector {
    fn inspect(&self, raw: &[u8]) -> Result<Box<dyn View>, BoxError> {
        let root: Value = serde_json::from_slice(raw).map_err(InvalidJson)?;
        Ok(Box::new(JsonView { root }))
    }
}

/// A [`View`] over a parsed JSON document.
///
/// Paths use dotted addressing; an integer segment indexes into an
/// array: `"records.0.eventName"`.
pub struct JsonView {
    root: Value,
}

impl JsonView {
    fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl View for JsonView {
    fn has_field(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    fn get_string(&self, path: &str) -> Option<String> {
        self.lookup(path)?.as_str().map(str::to_owned)
    }

    fn get_bytes(&self, path: &str) -> Option<Vec<u8>> {
        let value = self.lookup(path)?;
        serde_json::to_vec(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::JsonInspector;
    use courier_core::Inspector;

    const DOC: &[u8] = br#"{
        "type": "order/created",
        "detail": {"order": {"id": "o-1", "total": 42}},
        "records": [{"name": "first"}, {"name": "second"}]
    }"#;

    #[test]
    fn rejects_invalid_json() {
        assert!(JsonInspector::new().inspect(b"not json").is_err());
    }

    #[test]
    fn has_field_walks_nested_paths() {
        let view = JsonInspector::new().inspect(DOC).unwrap();

        assert!(view.has_field("type"));
        assert!(view.has_field("detail.order.id"));
        assert!(view.has_field("records.1.name"));
        assert!(!view.has_field("detail.order.missing"));
        assert!(!view.has_field("records.2"));
        assert!(!view.has_field("type.nested"));
    }

    #[test]
    fn get_string_only_returns_strings() {
        let view = JsonInspector::new().inspect(DOC).unwrap();

        assert_eq!(view.get_string("detail.order.id").as_deref(), Some("o-1"));
        assert_eq!(view.get_string("records.0.name").as_deref(), Some("first"));
        // Present but not a string.
        assert_eq!(view.get_string("detail.order.total"), None);
        assert_eq!(view.get_string("missing"), None);
    }

    #[test]
    fn get_bytes_returns_raw_json_encoding() {
        let view = JsonInspector::new().inspect(DOC).unwrap();

        // Strings keep their quotes, like the raw document.
        assert_eq!(view.get_bytes("detail.order.id").unwrap(), b"\"o-1\"");
        assert_eq!(view.get_bytes("detail.order.total").unwrap(), b"42");
        assert_eq!(view.get_bytes("missing"), None);
    }
}
