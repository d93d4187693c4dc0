//! Per-message request context.
//!
//! A [`Context`] travels with one message through the hook chain and into
//! the handler. Parse hooks enrich it (trace ids, logging fields, tenant
//! data); every later hook and the handler observe the enriched value.
//!
//! Cancellation is structural in Rust: dropping the `process` future
//! cancels the dispatch at its next await point, so the context carries
//! values only, no token.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A clonable, string-keyed bag of request-scoped values.
///
/// Values are stored behind `Arc`, so cloning a context is cheap and a
/// handler holding a clone sees the same values the hooks produced.
///
/// # Example
///
/// ```rust,ignore
/// let ctx = Context::new().with("tenant", "acme".to_string());
/// let tenant: Option<&String> = ctx.get("tenant");
/// ```
#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under `key`, replacing any previous value.
    pub fn insert<V>(&mut self, key: impl Into<String>, value: V)
    where
        V: Send + Sync + 'static,
    {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Chaining form of [`insert`](Self::insert), for use in parse hooks.
    #[must_use]
    pub fn with<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: Send + Sync + 'static,
    {
        self.insert(key, value);
        self
    }

    /// Look up the value under `key`, downcast to `V`.
    ///
    /// Returns `None` if the key is absent or holds a different type.
    pub fn get<V>(&self, key: &str) -> Option<&V>
    where
        V: Send + Sync + 'static,
    {
        self.values.get(key)?.downcast_ref::<V>()
    }

    /// Returns true if `key` holds a value of any type.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
