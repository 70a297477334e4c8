//! Error types for message interactions

use lmc_graph::NodeId;

/// Failure reported by a delivery adapter
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The send was refused or its completion failed
    #[error("delivery rejected: {0}")]
    Rejected(String),

    /// The response stream failed part way through
    #[error("stream failed: {0}")]
    Stream(String),

    /// Anything else raised by the transport
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeliveryError {
    /// Rejection with a message
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Stream failure with a message
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }
}

/// Why an interaction did not complete
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    /// Target node is not in the store; nothing was changed
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The adapter failed; the node was marked `error`
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl InteractionError {
    /// Whether the node was left in the `error` state
    #[inline]
    #[must_use]
    pub fn marked_node(&self) -> bool {
        matches!(self, Self::Delivery(_))
    }
}

/// Result alias for interactions
pub type Result<T> = std::result::Result<T, InteractionError>;
