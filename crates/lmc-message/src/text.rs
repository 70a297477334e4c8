//! Accessors over message content
//!
//! All accessors accept `Option<&Message>` so callers can pass the result of
//! a lookup straight through; `None` yields an empty result.

use crate::message::Message;
use crate::part::{ImagePart, MessagePart, ToolCallPart, ToolResultPart};

/// Displayable text of a message
///
/// Flat `content` first, then every text part, skipping empty pieces,
/// joined by newlines and trimmed.
#[must_use]
pub fn message_text(message: Option<&Message>) -> String {
    let Some(message) = message else {
        return String::new();
    };

    let parts_text = message.parts().iter().filter_map(|part| match part {
        MessagePart::Text(text) => Some(text.text.as_str()),
        _ => None,
    });

    message
        .content
        .as_deref()
        .into_iter()
        .chain(parts_text)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Image parts in order
#[must_use]
pub fn message_images(message: Option<&Message>) -> Vec<&ImagePart> {
    message
        .map(|m| {
            m.parts()
                .iter()
                .filter_map(|part| match part {
                    MessagePart::Image(image) => Some(image),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Tool-call parts in order
#[must_use]
pub fn message_tool_calls(message: Option<&Message>) -> Vec<&ToolCallPart> {
    message
        .map(|m| {
            m.parts()
                .iter()
                .filter_map(|part| match part {
                    MessagePart::ToolCall(call) => Some(call),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Tool-result parts in order
#[must_use]
pub fn message_tool_results(message: Option<&Message>) -> Vec<&ToolResultPart> {
    message
        .map(|m| {
            m.parts()
                .iter()
                .filter_map(|part| match part {
                    MessagePart::ToolResult(result) => Some(result),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
