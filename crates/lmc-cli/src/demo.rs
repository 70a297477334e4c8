//! Scripted demo interaction
//!
//! Runs one interaction end to end against a local adapter that echoes the
//! prompt back as a stream of growing partials, then saves the view.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use lmc_graph::{BranchOptions, CanvasStore, NodeId, RootNodeOptions};
use lmc_message::{message_text, Message};
use lmc_persistence::{save_view, PersistenceAdapter};
use lmc_runner::{
    Delivery, DeliveryError, InteractionOutcome, InteractionRunner, MessageAdapter,
    SendMessageRequest,
};
use std::sync::Arc;

use crate::config::CliConfig;

/// Replies with the prompt text, one more word per partial
#[derive(Debug, Default)]
pub struct EchoAdapter;

#[async_trait]
impl MessageAdapter for EchoAdapter {
    async fn send_message(&self, request: SendMessageRequest) -> Result<Delivery, DeliveryError> {
        let text = message_text(Some(&request.message));
        if text.is_empty() {
            return Err(DeliveryError::rejected("nothing to echo"));
        }

        let reply_id = format!("echo-{}", request.message.id().unwrap_or("anon"));
        let words: Vec<&str> = text.split_whitespace().collect();
        let partials: Vec<Result<Message, DeliveryError>> = (1..=words.len())
            .map(|n| Ok(Message::assistant(words[..n].join(" ")).with_id(reply_id.clone())))
            .collect();

        Ok(Delivery::Stream(stream::iter(partials).boxed()))
    }
}

/// What the demo did
#[derive(Debug)]
pub struct DemoReport {
    /// Node the interaction ran on
    pub node_id: NodeId,
    /// Interaction result
    pub outcome: InteractionOutcome,
    /// Nodes in the store afterwards
    pub node_count: usize,
}

/// Create a root, branch it, send `prompt` on the branch and save the view
///
/// # Errors
///
/// Fails if the interaction or the snapshot save fails.
pub async fn run_demo(
    config: &CliConfig,
    prompt: &str,
    persistence: Option<(&dyn PersistenceAdapter, &str)>,
) -> anyhow::Result<DemoReport> {
    let store = CanvasStore::with_layout(config.layout);
    let root = store.create_root_node(
        RootNodeOptions::new().with_messages(vec![Message::system("You are an echo.")]),
    );
    let branch = store
        .branch_node(&root, BranchOptions::new())
        .ok_or_else(|| anyhow::anyhow!("root node vanished before branching"))?;
    store.set_active_node_id(Some(branch.clone()));

    let runner = InteractionRunner::new(store.clone(), Arc::new(EchoAdapter))
        .with_options(config.interaction);
    let outcome = runner
        .send(branch.clone(), Message::user(prompt).with_id("prompt"))
        .await?;

    if let Some((adapter, key)) = persistence {
        save_view(adapter, &store, key).await?;
        tracing::info!(key, "saved demo view");
    }

    Ok(DemoReport {
        node_id: branch,
        outcome,
        node_count: store.snapshot().node_count(),
    })
}
