//! LM Canvas Message Model
//!
//! Plain value types for chat messages exchanged on a conversation node:
//! - [`Message`]: one chat message, optionally identified by an id
//! - [`MessageRole`]: system / user / assistant / tool
//! - [`MessagePart`]: typed content parts (text, image, tool call, tool result)
//!
//! The types carry no behavior beyond accessors. Identity matters: a message
//! with an `id` can be merged with a later version of itself, a message
//! without one is only ever appended.
//!
//! # Example
//!
//! ```rust
//! use lmc_message::{message_text, Message, MessagePart};
//!
//! let message = Message::assistant("Here you go")
//!     .with_id("m2")
//!     .with_parts(vec![MessagePart::text("second line")]);
//!
//! assert_eq!(message_text(Some(&message)), "Here you go\nsecond line");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod message;
pub mod part;
pub mod text;

// Re-exports
pub use message::{Message, MessageRole, UnknownRoleError};
pub use part::{ImagePart, MessagePart, TextPart, ToolCallPart, ToolResultPart};
pub use text::{message_images, message_text, message_tool_calls, message_tool_results};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with messages
    pub use crate::{
        message_images, message_text, message_tool_calls, Message, MessagePart, MessageRole,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
