//! Typed message content parts
//!
//! Wire format is internally tagged by `type`:
//! `text`, `image`, `tool-call`, `tool-result`.

use serde::{Deserialize, Serialize};

/// One typed content part of a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    /// Plain text
    Text(TextPart),
    /// Image reference (URL or data URI)
    Image(ImagePart),
    /// Tool invocation requested by the model
    ToolCall(ToolCallPart),
    /// Result of a tool invocation
    ToolResult(ToolResultPart),
}

impl MessagePart {
    /// Text part
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart { text: text.into() })
    }

    /// Image part without mime type or alt text
    #[inline]
    #[must_use]
    pub fn image(image: impl Into<String>) -> Self {
        Self::Image(ImagePart {
            image: image.into(),
            mime_type: None,
            alt: None,
        })
    }

    /// Tool call part
    #[inline]
    #[must_use]
    pub fn tool_call(tool_name: impl Into<String>, args: Option<serde_json::Value>) -> Self {
        Self::ToolCall(ToolCallPart {
            tool_name: tool_name.into(),
            args,
            id: None,
        })
    }

    /// Tool result part
    #[inline]
    #[must_use]
    pub fn tool_result(tool_name: impl Into<String>, result: Option<serde_json::Value>) -> Self {
        Self::ToolResult(ToolResultPart {
            tool_name: tool_name.into(),
            result,
            id: None,
        })
    }

    /// Wire tag of this part
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MessagePart::Text(_) => "text",
            MessagePart::Image(_) => "image",
            MessagePart::ToolCall(_) => "tool-call",
            MessagePart::ToolResult(_) => "tool-result",
        }
    }
}

/// Plain text content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text
    pub text: String,
}

/// Image content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePart {
    /// URL or data URI
    pub image: String,
    /// MIME type, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallPart {
    /// Name of the invoked tool
    pub tool_name: String,
    /// Arbitrary JSON arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    /// Call identifier linking the call to its result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Tool invocation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPart {
    /// Name of the tool that produced the result
    pub tool_name: String,
    /// Arbitrary JSON result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Call identifier this result answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}
