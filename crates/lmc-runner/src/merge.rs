//! Message list reconciliation
//!
//! Streamed responses repeat the same message id with growing content.
//! These helpers fold such partials into a message list without
//! duplicating identified messages or dropping fields a partial omits.

use lmc_message::Message;

/// Combine an existing message with a newer version of it
///
/// Fields present on `incoming` win. Optional fields `incoming` leaves
/// empty (`content`, `parts`, `id`, `created_at`) keep the existing value;
/// an empty-string id is treated as absent.
#[must_use]
pub fn merge_message(existing: &Message, incoming: Message) -> Message {
    Message {
        id: incoming
            .id
            .filter(|id| !id.is_empty())
            .or_else(|| existing.id.clone()),
        role: incoming.role,
        content: incoming.content.or_else(|| existing.content.clone()),
        parts: incoming.parts.or_else(|| existing.parts.clone()),
        created_at: incoming.created_at.or(existing.created_at),
    }
}

/// Merge `incoming` into the message with the same id, or append it
///
/// Messages without an id (or with an empty one), or with an id not yet in
/// the list, are appended.
pub fn upsert_message(messages: &mut Vec<Message>, incoming: Message) {
    let slot = incoming
        .id()
        .and_then(|id| messages.iter().position(|m| m.has_id(id)));

    match slot {
        Some(index) => {
            let merged = merge_message(&messages[index], incoming);
            messages[index] = merged;
        }
        None => messages.push(incoming),
    }
}

/// Append `message` unless one with the same id is already present
///
/// Returns whether the message was appended.
pub fn append_if_missing_by_id(messages: &mut Vec<Message>, message: Message) -> bool {
    if let Some(id) = message.id() {
        if messages.iter().any(|m| m.has_id(id)) {
            return false;
        }
    }
    messages.push(message);
    true
}
