//! Request/response handlers and replier acknowledgment.

use std::sync::Arc;

use courier::testing::RecordingReplier;
use courier::{
    BoxError, Context, DispatchError, DynReplier, FnSource, HasFields, Router, Source,
};
use serde::{Deserialize, Serialize, Serializer};

mod common;
use common::{TestPayload, raw};

/// A "type"/"payload" source whose envelopes carry the given replier.
fn replying_source(replier: RecordingReplier) -> impl Source {
    let replier: Arc<dyn DynReplier> = Arc::new(replier);
    FnSource::new(
        "replying",
        HasFields::new(["type", "payload"]),
        move |bytes: &[u8]| {
            let envelope = common::parse_event(bytes)?;
            Ok(envelope.with_replier(Arc::clone(&replier)))
        },
    )
}

#[derive(Serialize)]
#[allow(non_snake_case)]
struct EchoReply {
    Value: i32,
}

#[derive(Deserialize)]
struct EchoRequest {
    value: i32,
}

impl courier::Payload for EchoRequest {}

#[tokio::test]
async fn reply_value_round_trips_as_json() {
    let replier = RecordingReplier::new();
    let observer = replier.clone();

    let router = Router::builder()
        .source(replying_source(replier))
        .register_replying("echo", |_ctx: Context, p: EchoRequest| async move {
            Ok::<_, BoxError>(EchoReply { Value: p.value })
        })
        .build()
        .unwrap();

    router
        .process(Context::new(), &raw("echo", r#"{"value":42}"#))
        .await
        .unwrap();

    assert_eq!(observer.replies(), vec![br#"{"Value":42}"#.to_vec()]);
    assert!(observer.failures().is_empty());
}

#[tokio::test]
async fn handler_failure_is_acknowledged_via_fail() {
    let replier = RecordingReplier::new();
    let observer = replier.clone();

    let router = Router::builder()
        .source(replying_source(replier))
        .register("test", |_ctx: Context, _p: TestPayload| async {
            Err::<(), BoxError>("boom".into())
        })
        .build()
        .unwrap();

    // fail() succeeded, so the handler error still stands.
    let err = router
        .process(Context::new(), &raw("test", r#"{"value":"x"}"#))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Handler(_)));
    assert_eq!(observer.failures(), vec!["handler failed".to_string()]);
}

#[tokio::test]
async fn reply_failure_supersedes_handler_success() {
    let replier = RecordingReplier::new();
    replier.set_reply_error("broken pipe");

    let router = Router::builder()
        .source(replying_source(replier))
        .register_replying("echo", |_ctx: Context, p: EchoRequest| async move {
            Ok::<_, BoxError>(EchoReply { Value: p.value })
        })
        .build()
        .unwrap();

    let err = router
        .process(Context::new(), &raw("echo", r#"{"value":1}"#))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Reply(_)));
}

#[tokio::test]
async fn fail_failure_supersedes_handler_error() {
    let replier = RecordingReplier::new();
    replier.set_fail_error("broken pipe");

    let router = Router::builder()
        .source(replying_source(replier))
        .register("test", |_ctx: Context, _p: TestPayload| async {
            Err::<(), BoxError>("boom".into())
        })
        .build()
        .unwrap();

    let err = router
        .process(Context::new(), &raw("test", r#"{"value":"x"}"#))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Reply(_)));
}

/// A reply value whose serialization always fails.
struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("cannot serialize"))
    }
}

#[tokio::test]
async fn reply_marshal_failure_is_fatal() {
    let replier = RecordingReplier::new();
    let observer = replier.clone();

    let router = Router::builder()
        .source(replying_source(replier))
        .register_replying("echo", |_ctx: Context, _p: EchoRequest| async {
            Ok::<_, BoxError>(Unserializable)
        })
        .build()
        .unwrap();

    let err = router
        .process(Context::new(), &raw("echo", r#"{"value":1}"#))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::MarshalReply { .. }));
    // Nothing reached the transport.
    assert!(observer.replies().is_empty());
    assert!(observer.failures().is_empty());
}

#[tokio::test]
async fn replying_handler_without_replier_still_succeeds() {
    let router = Router::builder()
        .source(common::event_source("plain"))
        .register_replying("echo", |_ctx: Context, p: EchoRequest| async move {
            Ok::<_, BoxError>(EchoReply { Value: p.value })
        })
        .build()
        .unwrap();

    router
        .process(Context::new(), &raw("echo", r#"{"value":7}"#))
        .await
        .unwrap();
}
