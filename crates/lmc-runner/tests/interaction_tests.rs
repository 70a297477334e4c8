//! End-to-end interaction protocol tests against the scripted adapter.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use lmc_graph::{CanvasStore, NodeChange, NodeId, NodeStatus, RootNodeOptions};
use lmc_message::Message;
use lmc_runner::{
    run_message_interaction, Delivery, DeliveryError, InteractionError, InteractionOptions,
    InteractionRunner, MessageAdapter, SendMessageRequest,
};
use lmc_test_utils::{assistant, seeded_store, user, Script, ScriptedAdapter};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn store_with_root(messages: Vec<Message>) -> (CanvasStore, NodeId) {
    let store = CanvasStore::new();
    let id = store.create_root_node(RootNodeOptions::new().with_id("n").with_messages(messages));
    (store, id)
}

#[tokio::test]
async fn streamed_partials_collapse_into_one_message() {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(ScriptedAdapter::streaming(vec![
        assistant("m2", "he"),
        assistant("m2", "hello"),
    ]));
    let runner = InteractionRunner::new(store.clone(), adapter.clone());

    let outcome = runner.send(node.clone(), user("m1", "hi")).await.unwrap();

    assert_eq!(outcome.status, NodeStatus::Completed);
    assert_eq!(outcome.messages, vec![user("m1", "hi"), assistant("m2", "hello")]);
    assert_eq!(store.get_node(&node).unwrap().status(), NodeStatus::Completed);
    assert_eq!(adapter.requests().len(), 1);
    assert!(adapter.errors().is_empty());
}

#[tokio::test]
async fn optimistic_append_skips_known_id() {
    let (store, node) = store_with_root(vec![user("m1", "hi")]);
    let adapter = Arc::new(ScriptedAdapter::new(Script::Complete));
    let runner = InteractionRunner::new(store.clone(), adapter);

    let outcome = runner.send(node, user("m1", "hi")).await.unwrap();
    assert_eq!(outcome.messages, vec![user("m1", "hi")]);
}

#[tokio::test]
async fn optimistic_disabled_leaves_outbound_out() {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(ScriptedAdapter::new(Script::Deferred(Ok(()))));
    let runner = InteractionRunner::new(store, adapter)
        .with_options(InteractionOptions::new().with_optimistic(false));

    let outcome = runner.send(node, user("m1", "hi")).await.unwrap();
    assert!(outcome.messages.is_empty());
}

#[tokio::test]
async fn missing_node_fails_without_touching_state() {
    let (store, _, _) = seeded_store(1);
    let before = store.snapshot();
    let adapter = ScriptedAdapter::new(Script::Complete);

    let err = run_message_interaction(
        &store,
        &adapter,
        SendMessageRequest::new("ghost", user("m1", "hi")),
        InteractionOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, InteractionError::NodeNotFound(ref id) if id.as_str() == "ghost"));
    assert!(!err.marked_node());
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
    assert!(adapter.requests().is_empty());
}

#[tokio::test]
async fn canonical_list_replaces_messages() {
    let (store, node) = store_with_root(vec![]);
    let canonical = vec![user("m1", "hi"), assistant("server-1", "from server")];
    let adapter = Arc::new(
        ScriptedAdapter::streaming(vec![assistant("m2", "local")])
            .with_canonical(canonical.clone()),
    );
    let runner = InteractionRunner::new(store.clone(), adapter);

    let outcome = runner.send(node.clone(), user("m1", "hi")).await.unwrap();
    assert_eq!(outcome.messages, canonical);
    assert_eq!(store.node_messages(&node), canonical);
}

#[tokio::test]
async fn empty_canonical_list_is_ignored() {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(ScriptedAdapter::new(Script::Complete).with_canonical(vec![]));
    let runner = InteractionRunner::new(store, adapter);

    let outcome = runner.send(node, user("m1", "hi")).await.unwrap();
    assert_eq!(outcome.messages, vec![user("m1", "hi")]);
}

#[tokio::test]
async fn sync_disabled_skips_canonical_fetch() {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(
        ScriptedAdapter::new(Script::Complete).with_canonical_failure("should not be called"),
    );
    let runner = InteractionRunner::new(store, adapter)
        .with_options(InteractionOptions::new().with_sync_on_complete(false));

    assert!(runner.send(node, user("m1", "hi")).await.is_ok());
}

async fn assert_failure_marks_node(adapter: ScriptedAdapter) {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(adapter);
    let runner = InteractionRunner::new(store.clone(), adapter.clone());

    let err = runner.send(node.clone(), user("m1", "hi")).await.unwrap_err();

    assert!(matches!(err, InteractionError::Delivery(_)));
    assert_eq!(store.get_node(&node).unwrap().status(), NodeStatus::Error);
    let errors = adapter.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1, node);
}

#[tokio::test]
async fn rejected_send_marks_error() {
    assert_failure_marks_node(ScriptedAdapter::new(Script::Reject("offline".into()))).await;
}

#[tokio::test]
async fn deferred_rejection_marks_error() {
    assert_failure_marks_node(ScriptedAdapter::new(Script::Deferred(Err("boom".into())))).await;
}

#[tokio::test]
async fn mid_stream_failure_keeps_received_partials() {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(ScriptedAdapter::new(Script::Stream(vec![
        Ok(assistant("m2", "par")),
        Err("connection reset".into()),
        Ok(assistant("m2", "never")),
    ])));
    let runner = InteractionRunner::new(store.clone(), adapter.clone());

    assert!(runner.send(node.clone(), user("m1", "hi")).await.is_err());

    assert_eq!(
        store.node_messages(&node),
        vec![user("m1", "hi"), assistant("m2", "par")]
    );
    assert_eq!(adapter.errors().len(), 1);
    assert!(adapter.errors()[0].0.contains("connection reset"));
}

#[tokio::test]
async fn canonical_fetch_failure_marks_error() {
    assert_failure_marks_node(
        ScriptedAdapter::new(Script::Complete).with_canonical_failure("sync down"),
    )
    .await;
}

#[tokio::test]
async fn request_metadata_reaches_adapter() {
    let (store, children) = {
        let (store, _, children) = seeded_store(1);
        (store, children)
    };
    let adapter = Arc::new(ScriptedAdapter::new(Script::Complete));
    let runner = InteractionRunner::new(store, adapter.clone());

    let request = SendMessageRequest::new(children[0].clone(), user("m9", "branch question"))
        .with_parent("root")
        .with_metadata(json!({"model": "test"}));
    runner.run(request.clone()).await.unwrap();

    assert_eq!(adapter.requests(), vec![request]);
}

#[tokio::test]
async fn adapter_status_takes_precedence() {
    let (store, node) = store_with_root(vec![]);
    let plain =
        InteractionRunner::new(store.clone(), Arc::new(ScriptedAdapter::new(Script::Complete)));
    assert_eq!(plain.status(&node), Some(NodeStatus::Idle));

    let tracked = InteractionRunner::new(
        store,
        Arc::new(ScriptedAdapter::new(Script::Complete).with_status(NodeStatus::Loading)),
    );
    assert_eq!(tracked.status(&node), Some(NodeStatus::Loading));
}

/// Removes the target node from the graph as soon as it is asked to send
struct RemovingAdapter {
    store: CanvasStore,
}

#[async_trait]
impl MessageAdapter for RemovingAdapter {
    async fn send_message(&self, request: SendMessageRequest) -> Result<Delivery, DeliveryError> {
        self.store
            .apply_node_changes(&[NodeChange::remove(request.node_id.clone())]);
        let reply = assistant("m2", "too late");
        Ok(Delivery::Stream(
            stream::iter(vec![Ok::<_, DeliveryError>(reply)]).boxed(),
        ))
    }
}

#[tokio::test]
async fn node_removed_mid_interaction_still_completes() {
    let (store, node) = store_with_root(vec![]);
    let adapter = Arc::new(RemovingAdapter {
        store: store.clone(),
    });
    let runner = InteractionRunner::new(store.clone(), adapter);

    let outcome = runner.send(node.clone(), user("m1", "hi")).await.unwrap();

    assert_eq!(outcome.status, NodeStatus::Completed);
    assert!(outcome.messages.is_empty());
    assert!(store.get_node(&node).is_none());
    assert!(store.nodes().is_empty());
}

/// Streams two partials of a reply keyed on the outbound id, yielding to
/// the scheduler before each one
struct EchoStreamAdapter;

#[async_trait]
impl MessageAdapter for EchoStreamAdapter {
    async fn send_message(&self, request: SendMessageRequest) -> Result<Delivery, DeliveryError> {
        let outbound = request.message.id().unwrap_or_default().to_string();
        let reply_id = format!("re-{outbound}");
        let partials = vec![
            assistant(&reply_id, "partial"),
            assistant(&reply_id, &format!("answer to {outbound}")),
        ];
        let items = stream::iter(partials).then(|message| async move {
            tokio::task::yield_now().await;
            Ok::<_, DeliveryError>(message)
        });
        Ok(Delivery::Stream(items.boxed()))
    }
}

#[tokio::test]
async fn interleaved_streams_on_one_node_keep_both_replies() {
    let (store, node) = store_with_root(vec![]);
    let runner = InteractionRunner::new(store.clone(), Arc::new(EchoStreamAdapter));

    let (first, second) = futures::join!(
        runner.send(node.clone(), user("q1", "first")),
        runner.send(node.clone(), user("q2", "second")),
    );
    assert_eq!(first.unwrap().status, NodeStatus::Completed);
    assert_eq!(second.unwrap().status, NodeStatus::Completed);

    let messages = store.node_messages(&node);
    assert_eq!(messages.len(), 4);
    for expected in [
        user("q1", "first"),
        user("q2", "second"),
        assistant("re-q1", "answer to q1"),
        assistant("re-q2", "answer to q2"),
    ] {
        assert!(messages.contains(&expected), "missing {expected:?}");
    }
    assert_eq!(store.get_node(&node).unwrap().status(), NodeStatus::Completed);
}
