//! Subcommand implementations
//!
//! Each command takes its inputs as values and returns a printable result so
//! the binary stays a thin argument parser.

use anyhow::{Context, Result};
use lmc_graph::{build_linear_graph, LinearGraph, LinearGraphOptions, SnapshotError, ViewSnapshot};
use lmc_message::{message_text, Message};
use std::fmt::{self, Write as _};

/// Turn a JSON transcript (an array of messages) into a linear graph
///
/// # Errors
///
/// Fails if `raw` is not a JSON array of messages.
pub fn linearize(raw: &str, options: &LinearGraphOptions) -> Result<LinearGraph> {
    let messages: Vec<Message> =
        serde_json::from_str(raw).context("transcript must be a JSON array of messages")?;
    tracing::info!(messages = messages.len(), "linearizing transcript");
    Ok(build_linear_graph(&messages, options))
}

/// Human-readable outline of a linear graph
#[must_use]
pub fn describe_graph(graph: &LinearGraph) -> String {
    let mut out = String::new();
    for node in &graph.nodes {
        let _ = writeln!(
            out,
            "{} @ ({}, {}) [{} messages]",
            node.id,
            node.position.x,
            node.position.y,
            node.messages().len()
        );
        for message in node.messages() {
            let _ = writeln!(out, "  {}: {}", message.role, message_text(Some(message)));
        }
    }
    out
}

/// Result of checking a raw snapshot
#[derive(Debug)]
pub enum SnapshotReport {
    /// Snapshot is usable
    Valid(ViewSnapshot),
    /// Snapshot would be discarded on load
    Invalid(SnapshotError),
}

impl SnapshotReport {
    /// Check `raw`
    #[must_use]
    pub fn inspect(raw: &str) -> Self {
        match ViewSnapshot::parse(raw) {
            Ok(snapshot) => Self::Valid(snapshot),
            Err(err) => Self::Invalid(err),
        }
    }

    /// Whether the snapshot is usable
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl fmt::Display for SnapshotReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "invalid: {err}"),
            Self::Valid(snapshot) => {
                match snapshot.saved_at {
                    Some(at) => writeln!(f, "version {} saved {at}", snapshot.version)?,
                    None => writeln!(f, "version {} (no save time)", snapshot.version)?,
                }
                match &snapshot.active_node_id {
                    Some(id) => writeln!(f, "active node: {id}")?,
                    None => writeln!(f, "active node: none")?,
                }
                match snapshot.camera {
                    Some(c) => writeln!(f, "camera: ({}, {}) zoom {}", c.x, c.y, c.zoom)?,
                    None => writeln!(f, "camera: none")?,
                }
                writeln!(f, "nodes: {}", snapshot.nodes.len())?;
                for view in snapshot.nodes.values() {
                    write!(f, "  {} @ ({}, {})", view.id, view.x, view.y)?;
                    if let (Some(w), Some(h)) = (view.width, view.height) {
                        write!(f, " {w}x{h}")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linearize_rejects_non_array() {
        assert!(linearize(r#"{"role": "user"}"#, &LinearGraphOptions::default()).is_err());
    }

    #[test]
    fn outline_lists_every_message() {
        let graph = linearize(
            r#"[{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]"#,
            &LinearGraphOptions::default(),
        )
        .unwrap();

        let outline = describe_graph(&graph);
        assert!(outline.starts_with("linear-node-0 @ (0, 0) [2 messages]"));
        assert!(outline.contains("  assistant: hello"));
    }

    #[test]
    fn report_explains_rejection() {
        let report = SnapshotReport::inspect(r#"{"version": 9, "nodes": {}}"#);
        assert!(!report.is_valid());
        assert!(report.to_string().contains("version"));
    }
}
