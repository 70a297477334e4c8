//! Message delivery collaborator
//!
//! The runner never talks to a model or transport directly. It hands the
//! outbound message to a [`MessageAdapter`] and consumes whatever shape of
//! response the adapter chooses through [`Delivery`].

use crate::error::DeliveryError;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use lmc_graph::{NodeId, NodeStatus};
use lmc_message::Message;
use serde_json::Value;
use std::fmt;

/// Outbound message addressed to a node
#[derive(Debug, Clone, PartialEq)]
pub struct SendMessageRequest {
    /// Node the conversation continues on
    pub node_id: NodeId,
    /// Message being sent
    pub message: Message,
    /// Node the target was branched from, if the caller tracks it
    pub parent_node_id: Option<NodeId>,
    /// Opaque caller data forwarded to the adapter
    pub metadata: Option<Value>,
}

impl SendMessageRequest {
    /// Request for `message` on `node_id`
    #[must_use]
    pub fn new(node_id: impl Into<NodeId>, message: Message) -> Self {
        Self {
            node_id: node_id.into(),
            message,
            parent_node_id: None,
            metadata: None,
        }
    }

    /// With parent node
    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent_node_id = Some(parent.into());
        self
    }

    /// With metadata
    #[inline]
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// How the adapter delivers its response
pub enum Delivery {
    /// Completion signalled by a future; messages arrive through
    /// [`MessageAdapter::canonical_messages`]
    Deferred(BoxFuture<'static, Result<(), DeliveryError>>),
    /// Response messages streamed one by one, possibly as growing partials
    /// of the same id
    Stream(BoxStream<'static, Result<Message, DeliveryError>>),
    /// Nothing further to wait for
    Complete,
}

impl Delivery {
    /// Short name of the variant
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Delivery::Deferred(_) => "deferred",
            Delivery::Stream(_) => "stream",
            Delivery::Complete => "complete",
        }
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Delivery").field(&self.kind()).finish()
    }
}

/// Transport binding used by the interaction runner
///
/// Only [`send_message`](Self::send_message) is required.
#[async_trait::async_trait]
pub trait MessageAdapter: Send + Sync {
    /// Send a message and describe how the response will arrive
    async fn send_message(&self, request: SendMessageRequest) -> Result<Delivery, DeliveryError>;

    /// Authoritative message list for a node after a send completes
    ///
    /// `Ok(None)` or an empty list leaves the node's messages as they are.
    async fn canonical_messages(
        &self,
        _node_id: &NodeId,
    ) -> Result<Option<Vec<Message>>, DeliveryError> {
        Ok(None)
    }

    /// Status as seen by the transport, if it tracks one
    fn status(&self, _node_id: &NodeId) -> Option<NodeStatus> {
        None
    }

    /// Called once when an interaction fails
    fn on_error(&self, _error: &DeliveryError, _node_id: &NodeId) {}
}
