//! Transport completion semantics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use courier::{BoxError, Context, DispatchError, FnSource, HasFields, Router, Source};

mod common;
use common::{TestPayload, ValidatedPayload, raw};

/// Observer handle for a completion callback.
#[derive(Clone, Default)]
struct CompletionProbe {
    calls: Arc<AtomicUsize>,
    seen_error: Arc<Mutex<Option<String>>>,
    /// When set, the callback itself fails with this message.
    fail_with: Arc<Mutex<Option<String>>>,
}

impl CompletionProbe {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn seen_error(&self) -> Option<String> {
        self.seen_error.lock().unwrap().clone()
    }
}

/// A "type"/"payload" source whose envelopes carry a completion callback
/// wired to the probe.
fn completing_source(probe: &CompletionProbe) -> impl Source {
    let probe = probe.clone();
    FnSource::new(
        "completing",
        HasFields::new(["type", "payload"]),
        move |bytes: &[u8]| {
            let probe = probe.clone();
            let envelope = common::parse_event(bytes)?;
            Ok(envelope.with_complete(Box::new(move |_ctx, err| {
                probe.calls.fetch_add(1, Ordering::SeqCst);
                *probe.seen_error.lock().unwrap() = err.map(|e| e.to_string());
                let fail_with = probe.fail_with.lock().unwrap().clone();
                Box::pin(async move {
                    match fail_with {
                        Some(message) => Err(message.into()),
                        None => Ok(()),
                    }
                })
            })))
        },
    )
}

#[tokio::test]
async fn completion_fires_once_on_success_with_no_error() {
    let probe = CompletionProbe::default();

    let router = Router::builder()
        .source(completing_source(&probe))
        .register("test", |_ctx: Context, _p: TestPayload| async {
            Ok::<(), BoxError>(())
        })
        .build()
        .unwrap();

    router
        .process(Context::new(), &raw("test", r#"{"value":"x"}"#))
        .await
        .unwrap();

    assert_eq!(probe.calls(), 1);
    assert_eq!(probe.seen_error(), None);
}

#[tokio::test]
async fn completion_receives_handler_error_and_normalizes_it() {
    let probe = CompletionProbe::default();

    let router = Router::builder()
        .source(completing_source(&probe))
        .register("test", |_ctx: Context, _p: TestPayload| async {
            Err::<(), BoxError>("boom".into())
        })
        .build()
        .unwrap();

    // The callback acknowledged the failure successfully, so the
    // transport owns the outcome: process reports success.
    let result = router
        .process(Context::new(), &raw("test", r#"{"value":"x"}"#))
        .await;

    assert!(result.is_ok());
    assert_eq!(probe.calls(), 1);
    assert_eq!(probe.seen_error().as_deref(), Some("handler failed"));
}

#[tokio::test]
async fn completion_failure_supersedes_handler_error() {
    let probe = CompletionProbe::default();
    *probe.fail_with.lock().unwrap() = Some("send task status failed".to_string());

    let router = Router::builder()
        .source(completing_source(&probe))
        .register("test", |_ctx: Context, _p: TestPayload| async {
            Err::<(), BoxError>("boom".into())
        })
        .build()
        .unwrap();

    let err = router
        .process(Context::new(), &raw("test", r#"{"value":"x"}"#))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Completion(_)));
    assert_eq!(probe.calls(), 1);
}

#[tokio::test]
async fn completion_fires_on_unmarshal_error_path() {
    let probe = CompletionProbe::default();

    let router = Router::builder()
        .source(completing_source(&probe))
        .register("test", |_ctx: Context, _p: TestPayload| async {
            Ok::<(), BoxError>(())
        })
        .build()
        .unwrap();

    // The callback observed the unmarshal error and acknowledged it
    // successfully, normalizing the outcome.
    let result = router
        .process(Context::new(), &raw("test", r#""bad""#))
        .await;

    assert!(result.is_ok());
    assert_eq!(probe.calls(), 1);
    assert_eq!(probe.seen_error().as_deref(), Some("unmarshal payload"));
}

#[tokio::test]
async fn completion_fires_on_validation_error_path_even_when_skipped() {
    let probe = CompletionProbe::default();

    let router = Router::builder()
        .source(completing_source(&probe))
        .on_validation_error(|_ctx, _source, _key, _err| None)
        .register("test", |_ctx: Context, _p: ValidatedPayload| async {
            Ok::<(), BoxError>(())
        })
        .build()
        .unwrap();

    // The hook skipped the failure, and the callback still observes the
    // concluded (nil) outcome.
    let result = router
        .process(Context::new(), &raw("test", r#"{"value":""}"#))
        .await;

    assert!(result.is_ok());
    assert_eq!(probe.calls(), 1);
    assert_eq!(probe.seen_error(), None);
}

#[tokio::test]
async fn no_handler_path_does_not_fire_completion() {
    let probe = CompletionProbe::default();

    let router = Router::builder()
        .source(completing_source(&probe))
        .build()
        .unwrap();

    let err = router
        .process(Context::new(), &raw("unhandled", "{}"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::NoHandler(_)));
    assert_eq!(probe.calls(), 0);
}
