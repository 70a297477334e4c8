//! Testing utilities for the LM Canvas workspace
//!
//! Shared fixtures and a scripted delivery adapter.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::{stream, FutureExt, StreamExt};
use lmc_graph::{BranchOptions, CanvasStore, NodeId, NodeStatus, RootNodeOptions};
use lmc_message::Message;
use lmc_runner::{Delivery, DeliveryError, MessageAdapter, SendMessageRequest};
use parking_lot::Mutex;

pub fn user(id: &str, content: &str) -> Message {
    Message::user(content).with_id(id)
}

pub fn assistant(id: &str, content: &str) -> Message {
    Message::assistant(content).with_id(id)
}

/// Message with a fixed timestamp, `minute` minutes after a fixed epoch
pub fn stamped(message: Message, minute: u32) -> Message {
    let at = Utc
        .with_ymd_and_hms(2024, 5, 1, 10, minute % 60, 0)
        .single()
        .unwrap_or_default();
    message.with_created_at(at)
}

/// user / assistant pairs followed by a trailing user message
pub fn sample_transcript(pairs: usize) -> Vec<Message> {
    let mut messages = Vec::with_capacity(pairs * 2 + 1);
    for i in 0..pairs {
        messages.push(user(&format!("u{i}"), &format!("question {i}")));
        messages.push(assistant(&format!("a{i}"), &format!("answer {i}")));
    }
    messages.push(user(&format!("u{pairs}"), "follow up"));
    messages
}

/// Store with a root node `root` holding one user message, plus `branches`
/// children of it
pub fn seeded_store(branches: usize) -> (CanvasStore, NodeId, Vec<NodeId>) {
    let store = CanvasStore::new();
    let root = store.create_root_node(
        RootNodeOptions::new()
            .with_id("root")
            .with_messages(vec![user("m0", "hello")]),
    );
    let children = (0..branches)
        .filter_map(|_| store.branch_node(&root, BranchOptions::new()))
        .collect();
    (store, root, children)
}

/// Response a [`ScriptedAdapter`] gives to every send
#[derive(Debug, Clone)]
pub enum Script {
    Complete,
    Deferred(Result<(), String>),
    /// Items are yielded in order; an `Err` ends the stream with a failure
    Stream(Vec<Result<Message, String>>),
    Reject(String),
}

/// Adapter that replays a fixed script and records what it was asked
#[derive(Debug)]
pub struct ScriptedAdapter {
    script: Script,
    canonical: Result<Option<Vec<Message>>, String>,
    status: Option<NodeStatus>,
    requests: Mutex<Vec<SendMessageRequest>>,
    errors: Mutex<Vec<(String, NodeId)>>,
}

impl ScriptedAdapter {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            canonical: Ok(None),
            status: None,
            requests: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn streaming(items: Vec<Message>) -> Self {
        Self::new(Script::Stream(items.into_iter().map(Ok).collect()))
    }

    #[must_use]
    pub fn with_canonical(mut self, messages: Vec<Message>) -> Self {
        self.canonical = Ok(Some(messages));
        self
    }

    #[must_use]
    pub fn with_canonical_failure(mut self, reason: impl Into<String>) -> Self {
        self.canonical = Err(reason.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: NodeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn requests(&self) -> Vec<SendMessageRequest> {
        self.requests.lock().clone()
    }

    /// `(error text, node)` for every `on_error` call
    pub fn errors(&self) -> Vec<(String, NodeId)> {
        self.errors.lock().clone()
    }
}

#[async_trait]
impl MessageAdapter for ScriptedAdapter {
    async fn send_message(&self, request: SendMessageRequest) -> Result<Delivery, DeliveryError> {
        self.requests.lock().push(request);

        match &self.script {
            Script::Complete => Ok(Delivery::Complete),
            Script::Reject(reason) => Err(DeliveryError::rejected(reason.clone())),
            Script::Deferred(outcome) => {
                let outcome = outcome.clone().map_err(DeliveryError::rejected);
                Ok(Delivery::Deferred(async move { outcome }.boxed()))
            }
            Script::Stream(items) => {
                let items: Vec<Result<Message, DeliveryError>> = items
                    .iter()
                    .cloned()
                    .map(|item| item.map_err(DeliveryError::stream))
                    .collect();
                Ok(Delivery::Stream(stream::iter(items).boxed()))
            }
        }
    }

    async fn canonical_messages(
        &self,
        _node_id: &NodeId,
    ) -> Result<Option<Vec<Message>>, DeliveryError> {
        self.canonical.clone().map_err(DeliveryError::rejected)
    }

    fn status(&self, _node_id: &NodeId) -> Option<NodeStatus> {
        self.status
    }

    fn on_error(&self, error: &DeliveryError, node_id: &NodeId) {
        self.errors.lock().push((error.to_string(), node_id.clone()));
    }
}
