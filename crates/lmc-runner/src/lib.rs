//! LM Canvas Interaction Runner
//!
//! Sends a message on a conversation node and reconciles the response into
//! the node's message list while tracking the node's status.
//!
//! # Core Components
//!
//! - [`MessageAdapter`]: transport binding supplied by the caller
//! - [`Delivery`]: deferred completion, message stream, or already complete
//! - [`InteractionRunner`] / [`run_message_interaction`]: the protocol
//! - [`merge_message`] / [`upsert_message`]: partial message reconciliation
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use futures::{stream, StreamExt};
//! use lmc_graph::{CanvasStore, RootNodeOptions};
//! use lmc_message::Message;
//! use lmc_runner::{
//!     Delivery, DeliveryError, InteractionRunner, MessageAdapter, SendMessageRequest,
//! };
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl MessageAdapter for Echo {
//!     async fn send_message(
//!         &self,
//!         request: SendMessageRequest,
//!     ) -> Result<Delivery, DeliveryError> {
//!         let reply = Message::assistant(request.message.content.unwrap_or_default());
//!         Ok(Delivery::Stream(stream::iter(vec![Ok::<_, DeliveryError>(reply)]).boxed()))
//!     }
//! }
//!
//! # block_on(async {
//! let store = CanvasStore::new();
//! let node = store.create_root_node(RootNodeOptions::new());
//! let runner = InteractionRunner::new(store, Arc::new(Echo));
//!
//! let outcome = runner.send(node, Message::user("ping")).await.unwrap();
//! assert_eq!(outcome.messages.len(), 2);
//! # });
//! # fn block_on<F: std::future::Future>(f: F) {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod adapter;
pub mod error;
pub mod interaction;
pub mod merge;

// Re-exports
pub use adapter::{Delivery, MessageAdapter, SendMessageRequest};
pub use error::{DeliveryError, InteractionError, Result};
pub use interaction::{
    run_message_interaction, InteractionOptions, InteractionOutcome, InteractionRunner,
};
pub use merge::{append_if_missing_by_id, merge_message, upsert_message};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running interactions
    pub use crate::{
        Delivery, DeliveryError, InteractionOptions, InteractionRunner, MessageAdapter,
        SendMessageRequest,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
