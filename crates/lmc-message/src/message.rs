//! Chat message and role types

use crate::part::MessagePart;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt / instructions
    System,
    /// Human input
    User,
    /// Model output
    Assistant,
    /// Tool output fed back to the model
    Tool,
}

impl MessageRole {
    /// Wire name of the role
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a role name that is not one of the four roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message role: {0}")]
pub struct UnknownRoleError(pub String);

impl FromStr for MessageRole {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            "tool" => Ok(MessageRole::Tool),
            other => Err(UnknownRoleError(other.to_string())),
        }
    }
}

/// One chat message
///
/// `id` is the merge key: two messages with the same id are versions of the
/// same logical message. Messages without an id, or with an empty one, are
/// never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Caller- or adapter-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Author role
    pub role: MessageRole,
    /// Flat text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Typed content parts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<MessagePart>>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message with the given role and no content
    #[inline]
    #[must_use]
    pub fn new(role: MessageRole) -> Self {
        Self {
            id: None,
            role,
            content: None,
            parts: None,
            created_at: None,
        }
    }

    /// System message with flat content
    #[inline]
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System).with_content(content)
    }

    /// User message with flat content
    #[inline]
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User).with_content(content)
    }

    /// Assistant message with flat content
    #[inline]
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant).with_content(content)
    }

    /// Tool message with flat content
    #[inline]
    #[must_use]
    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Tool).with_content(content)
    }

    /// With id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// With flat content
    #[inline]
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// With typed parts
    #[inline]
    #[must_use]
    pub fn with_parts(mut self, parts: Vec<MessagePart>) -> Self {
        self.parts = Some(parts);
        self
    }

    /// With creation timestamp
    #[inline]
    #[must_use]
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Identifier, if any; an empty id counts as none
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether this message shares a (present) id with `id`
    #[inline]
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    /// Whether the message was written by the assistant
    #[inline]
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Typed parts, empty when absent
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &[MessagePart] {
        self.parts.as_deref().unwrap_or_default()
    }
}
