//! Interaction protocol
//!
//! Drives one send on a node through `idle -> loading -> completed | error`:
//!
//! 1. mark the node `loading`
//! 2. optionally append the outbound message right away
//! 3. hand the message to the adapter and consume its [`Delivery`]
//! 4. optionally replace the node's messages with the adapter's canonical list
//! 5. mark the node `completed`
//!
//! Any adapter failure marks the node `error`, is reported to
//! [`MessageAdapter::on_error`] once and is returned to the caller.
//!
//! # Concurrency
//!
//! Interactions on the same node are not serialized. Each message edit is
//! atomic, so streamed partials from two interactions interleave rather than
//! overwrite each other, but statuses and the canonical sync are last writer
//! wins. Callers that need one interaction per node must enforce it.
//!
//! Dropping the returned future stops consumption and leaves the node
//! `loading`.

use crate::adapter::{Delivery, MessageAdapter, SendMessageRequest};
use crate::error::{DeliveryError, InteractionError, Result};
use crate::merge::{append_if_missing_by_id, upsert_message};
use futures::StreamExt;
use lmc_graph::{CanvasStore, NodeDataPatch, NodeId, NodeStatus};
use lmc_message::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Switches for one interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct InteractionOptions {
    /// Append the outbound message before the adapter answers
    pub optimistic: bool,
    /// Replace messages with the adapter's canonical list on completion
    pub sync_on_complete: bool,
}

impl InteractionOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With optimistic append
    #[inline]
    #[must_use]
    pub fn with_optimistic(mut self, optimistic: bool) -> Self {
        self.optimistic = optimistic;
        self
    }

    /// With canonical sync
    #[inline]
    #[must_use]
    pub fn with_sync_on_complete(mut self, sync: bool) -> Self {
        self.sync_on_complete = sync;
        self
    }
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            optimistic: true,
            sync_on_complete: true,
        }
    }
}

/// Result of a completed interaction
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOutcome {
    /// Final status, always `completed`
    pub status: NodeStatus,
    /// Node messages at completion; empty if the node vanished meanwhile
    pub messages: Vec<Message>,
}

/// Run one interaction on `request.node_id`
///
/// # Errors
///
/// - [`InteractionError::NodeNotFound`] if the node is absent; nothing is
///   changed and the adapter is not called
/// - [`InteractionError::Delivery`] if the adapter fails; the node is left
///   `error`
pub async fn run_message_interaction(
    store: &CanvasStore,
    adapter: &dyn MessageAdapter,
    request: SendMessageRequest,
    options: InteractionOptions,
) -> Result<InteractionOutcome> {
    let node_id = request.node_id.clone();
    if store.get_node(&node_id).is_none() {
        warn!(node_id = %node_id, "interaction target not found");
        return Err(InteractionError::NodeNotFound(node_id));
    }

    info!(node_id = %node_id, "starting interaction");
    set_status(store, &node_id, NodeStatus::Loading);

    match deliver(store, adapter, request, options).await {
        Ok(()) => {
            set_status(store, &node_id, NodeStatus::Completed);
            let messages = store.node_messages(&node_id);
            info!(node_id = %node_id, messages = messages.len(), "interaction completed");
            Ok(InteractionOutcome {
                status: NodeStatus::Completed,
                messages,
            })
        }
        Err(err) => {
            set_status(store, &node_id, NodeStatus::Error);
            warn!(node_id = %node_id, error = %err, "interaction failed");
            adapter.on_error(&err, &node_id);
            Err(err.into())
        }
    }
}

fn set_status(store: &CanvasStore, node_id: &NodeId, status: NodeStatus) {
    if store
        .patch_node_data(node_id, NodeDataPatch::status(status))
        .is_none()
    {
        debug!(node_id = %node_id, %status, "node gone, status not recorded");
    }
}

async fn deliver(
    store: &CanvasStore,
    adapter: &dyn MessageAdapter,
    request: SendMessageRequest,
    options: InteractionOptions,
) -> std::result::Result<(), DeliveryError> {
    let node_id = request.node_id.clone();

    if options.optimistic {
        let outbound = request.message.clone();
        store.update_node_messages(&node_id, |messages| {
            if !append_if_missing_by_id(messages, outbound) {
                debug!("outbound message already present");
            }
        });
    }

    let delivery = adapter.send_message(request).await?;
    debug!(node_id = %node_id, kind = delivery.kind(), "delivery accepted");

    match delivery {
        Delivery::Deferred(done) => done.await?,
        Delivery::Stream(mut items) => {
            while let Some(item) = items.next().await {
                let message = item?;
                store.update_node_messages(&node_id, |messages| upsert_message(messages, message));
            }
        }
        Delivery::Complete => {}
    }

    if options.sync_on_complete {
        match adapter.canonical_messages(&node_id).await? {
            Some(canonical) if !canonical.is_empty() => {
                debug!(node_id = %node_id, count = canonical.len(), "syncing canonical messages");
                store.set_node_messages(&node_id, canonical);
            }
            _ => {}
        }
    }

    Ok(())
}

/// Store, adapter and options bundled for repeated interactions
#[derive(Clone)]
pub struct InteractionRunner {
    store: CanvasStore,
    adapter: Arc<dyn MessageAdapter>,
    options: InteractionOptions,
}

impl InteractionRunner {
    /// Runner with default options
    #[must_use]
    pub fn new(store: CanvasStore, adapter: Arc<dyn MessageAdapter>) -> Self {
        Self {
            store,
            adapter,
            options: InteractionOptions::default(),
        }
    }

    /// With options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: InteractionOptions) -> Self {
        self.options = options;
        self
    }

    /// Store the runner writes to
    #[inline]
    #[must_use]
    pub fn store(&self) -> &CanvasStore {
        &self.store
    }

    /// Options applied to every interaction
    #[inline]
    #[must_use]
    pub fn options(&self) -> InteractionOptions {
        self.options
    }

    /// Status of a node, preferring the adapter's view
    #[must_use]
    pub fn status(&self, node_id: &NodeId) -> Option<NodeStatus> {
        self.adapter
            .status(node_id)
            .or_else(|| self.store.get_node(node_id).map(|node| node.status()))
    }

    /// Run one interaction
    ///
    /// # Errors
    ///
    /// See [`run_message_interaction`].
    pub async fn run(&self, request: SendMessageRequest) -> Result<InteractionOutcome> {
        run_message_interaction(&self.store, self.adapter.as_ref(), request, self.options).await
    }

    /// Send `message` on `node_id` with no parent or metadata
    ///
    /// # Errors
    ///
    /// See [`run_message_interaction`].
    pub async fn send(
        &self,
        node_id: impl Into<NodeId>,
        message: Message,
    ) -> Result<InteractionOutcome> {
        self.run(SendMessageRequest::new(node_id, message)).await
    }
}

impl std::fmt::Debug for InteractionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionRunner")
            .field("store", &self.store)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
