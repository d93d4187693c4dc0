//! Shared fixtures for router integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use courier::{
    BoxError, Context, Discriminate, DispatchError, Envelope, FnSource, HasFields, Payload,
    Source, SourceHooks,
};
use serde::Deserialize;
use serde_json::Value;

/// The canonical test message: `{"type": <key>, "payload": <payload>}`.
pub fn raw(key: &str, payload: &str) -> Vec<u8> {
    format!(r#"{{"type":"{key}","payload":{payload}}}"#).into_bytes()
}

/// Envelope parse for the canonical test message shape.
pub fn parse_event(raw: &[u8]) -> Result<Envelope, BoxError> {
    let doc: Value = serde_json::from_slice(raw)?;
    let key = doc
        .get("type")
        .and_then(Value::as_str)
        .ok_or("missing type field")?
        .to_string();
    let payload = doc.get("payload").cloned().unwrap_or(Value::Null);
    Ok(Envelope::new(key, serde_json::to_vec(&payload)?))
}

/// A source keyed on the "type"/"payload" fields.
pub fn event_source(name: &str) -> impl Source {
    FnSource::new(name, HasFields::new(["type", "payload"]), parse_event)
}

#[derive(Deserialize)]
pub struct TestPayload {
    pub value: String,
}

impl Payload for TestPayload {}

/// A payload that rejects an empty value.
#[derive(Deserialize)]
pub struct ValidatedPayload {
    pub value: String,
}

impl Payload for ValidatedPayload {
    fn validate(&self) -> Result<(), BoxError> {
        if self.value.is_empty() {
            return Err("value is required".into());
        }
        Ok(())
    }
}

/// Invocation counters for every per-source hook.
#[derive(Default)]
pub struct HookCounters {
    pub parse: AtomicUsize,
    pub dispatch: AtomicUsize,
    pub success: AtomicUsize,
    pub failure: AtomicUsize,
    pub no_handler: AtomicUsize,
    pub unmarshal: AtomicUsize,
    pub validation: AtomicUsize,
}

/// A source that exposes every optional hook, with observable counters
/// and configurable decision-hook errors.
pub struct HookedSource {
    discriminator: HasFields,
    pub counters: Arc<HookCounters>,
    /// Key/value the parse hook adds to the context.
    pub parse_insert: Option<(&'static str, &'static str)>,
    pub no_handler_error: Option<&'static str>,
    pub unmarshal_error: Option<&'static str>,
    pub validation_error: Option<&'static str>,
}

impl HookedSource {
    pub fn new() -> Self {
        Self {
            discriminator: HasFields::new(["type", "payload"]),
            counters: Arc::new(HookCounters::default()),
            parse_insert: None,
            no_handler_error: None,
            unmarshal_error: None,
            validation_error: None,
        }
    }
}

impl Source for HookedSource {
    fn name(&self) -> &str {
        "hooked"
    }

    fn discriminator(&self) -> &dyn Discriminate {
        &self.discriminator
    }

    fn parse(&self, raw: &[u8]) -> Result<Envelope, BoxError> {
        parse_event(raw)
    }

    fn hooks(&self) -> Option<&dyn SourceHooks> {
        Some(self)
    }
}

impl SourceHooks for HookedSource {
    fn on_parse(&self, ctx: Context, _key: &str) -> Context {
        self.counters.parse.fetch_add(1, Ordering::SeqCst);
        match self.parse_insert {
            Some((key, value)) => ctx.with(key, value.to_string()),
            None => ctx,
        }
    }

    fn on_dispatch(&self, _ctx: &Context, _key: &str) {
        self.counters.dispatch.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _ctx: &Context, _key: &str, _elapsed: Duration) {
        self.counters.success.fetch_add(1, Ordering::SeqCst);
    }

    fn on_failure(&self, _ctx: &Context, _key: &str, _err: &DispatchError, _elapsed: Duration) {
        self.counters.failure.fetch_add(1, Ordering::SeqCst);
    }

    fn on_no_handler(&self, _ctx: &Context, _key: &str) -> Option<BoxError> {
        self.counters.no_handler.fetch_add(1, Ordering::SeqCst);
        self.no_handler_error.map(Into::into)
    }

    fn on_unmarshal_error(&self, _ctx: &Context, _key: &str, _err: &BoxError) -> Option<BoxError> {
        self.counters.unmarshal.fetch_add(1, Ordering::SeqCst);
        self.unmarshal_error.map(Into::into)
    }

    fn on_validation_error(&self, _ctx: &Context, _key: &str, _err: &BoxError) -> Option<BoxError> {
        self.counters.validation.fetch_add(1, Ordering::SeqCst);
        self.validation_error.map(Into::into)
    }
}
