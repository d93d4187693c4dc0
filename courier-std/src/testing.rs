//! Testing utilities for Courier.
//!
//! Test doubles for the pieces a router test needs to observe:
//!
//! - [`CountingInspector`]: wraps an inspector and counts `inspect` calls
//! - [`FailingInspector`]: rejects every message
//! - [`RecordingReplier`]: records reply bodies and failure messages
//!
//! All doubles hand out `Clone`-able handles backed by shared state, so a
//! test can keep a handle while the router owns the double.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use courier_core::{BoxError, Context, DispatchError, Inspector, Replier, View};

use crate::json::JsonInspector;

/// An inspector wrapper that counts how often `inspect` runs.
///
/// The router's view cache promises at most one `inspect` per inspector
/// per dispatch; this double makes that observable:
///
/// ```rust,ignore
/// let inspector = CountingInspector::json();
/// let counter = inspector.clone();
///
/// let router = Router::builder().inspector(inspector) /* ... */ .build()?;
/// router.process(Context::new(), msg).await?;
///
/// assert_eq!(counter.count(), 1);
/// ```
pub struct CountingInspector {
    inner: Arc<dyn Inspector>,
    count: Arc<AtomicUsize>,
}

impl CountingInspector {
    /// Wrap an arbitrary inspector.
    pub fn new(inner: impl Inspector) -> Self {
        Self {
            inner: Arc::new(inner),
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wrap the standard JSON inspector.
    pub fn json() -> Self {
        Self::new(JsonInspector::new())
    }

    /// Number of `inspect` calls so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the call counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Clone for CountingInspector {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            count: self.count.clone(),
        }
    }
}

impl Inspector for CountingInspector {
    fn inspect(&self, raw: &[u8]) -> Result<Box<dyn View>, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.inspect(raw)
    }
}

/// An inspector that rejects every message.
///
/// Useful for asserting that a group whose inspector cannot parse the
/// bytes is skipped silently during matching.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingInspector;

impl FailingInspector {
    /// Create a failing inspector.
    pub fn new() -> Self {
        Self
    }
}

impl Inspector for FailingInspector {
    fn inspect(&self, _raw: &[u8]) -> Result<Box<dyn View>, BoxError> {
        Err("format mismatch".into())
    }
}

/// A replier that records every acknowledgment it receives.
///
/// ```rust,ignore
/// let replier = RecordingReplier::new();
/// let observer = replier.clone();
/// let envelope = Envelope::new("echo", body).with_replier(Arc::new(replier));
/// // ... dispatch ...
/// assert_eq!(observer.replies(), vec![br#"{"Value":42}"#.to_vec()]);
/// ```
pub struct RecordingReplier {
    replies: Arc<Mutex<Vec<Vec<u8>>>>,
    failures: Arc<Mutex<Vec<String>>>,
    reply_error: Arc<Mutex<Option<String>>>,
    fail_error: Arc<Mutex<Option<String>>>,
}

impl RecordingReplier {
    /// Create a replier that acknowledges everything successfully.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(Vec::new())),
            reply_error: Arc::new(Mutex::new(None)),
            fail_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Make subsequent `reply` calls fail with the given message.
    pub fn set_reply_error(&self, message: impl Into<String>) {
        *self.reply_error.lock().unwrap() = Some(message.into());
    }

    /// Make subsequent `fail` calls fail with the given message.
    pub fn set_fail_error(&self, message: impl Into<String>) {
        *self.fail_error.lock().unwrap() = Some(message.into());
    }

    /// Bodies passed to `reply`, in order.
    pub fn replies(&self) -> Vec<Vec<u8>> {
        self.replies.lock().unwrap().clone()
    }

    /// Rendered errors passed to `fail`, in order.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().unwrap().clone()
    }
}

impl Default for RecordingReplier {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RecordingReplier {
    fn clone(&self) -> Self {
        Self {
            replies: self.replies.clone(),
            failures: self.failures.clone(),
            reply_error: self.reply_error.clone(),
            fail_error: self.fail_error.clone(),
        }
    }
}

impl Replier for RecordingReplier {
    async fn reply(&self, _ctx: &Context, body: &[u8]) -> Result<(), BoxError> {
        self.replies.lock().unwrap().push(body.to_vec());
        if let Some(message) = self.reply_error.lock().unwrap().clone() {
            return Err(message.into());
        }
        Ok(())
    }

    async fn fail(&self, _ctx: &Context, err: &DispatchError) -> Result<(), BoxError> {
        self.failures.lock().unwrap().push(err.to_string());
        if let Some(message) = self.fail_error.lock().unwrap().clone() {
            return Err(message.into());
        }
        Ok(())
    }
}
