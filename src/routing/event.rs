//! Server event types
//!
//! The closed set of events a session can receive. Events are typed here and
//! encoded to the wire format only at the transport edge (`wire::frame`).
//!
//! Designed to be cheap to clone for fan-out: the only large payload (file
//! content) is `Bytes`, so all recipients share one allocation.

use bytes::Bytes;

/// Sender name used for system-generated text messages
pub const SYSTEM_SENDER: &str = "System";

/// An event delivered to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// An identity came online
    Online { identity: String },
    /// An identity went offline
    Offline { identity: String },
    /// Broadcast text message
    Message { from: String, text: String },
    /// Direct text message
    PrivateMessage { from: String, text: String },
    /// Group-scoped text message
    GroupMessage {
        group: String,
        from: String,
        text: String,
    },
    /// Binary blob delivery
    File { name: String, content: Bytes },
}

impl ServerEvent {
    /// Create an online presence event
    pub fn online(identity: impl Into<String>) -> Self {
        ServerEvent::Online {
            identity: identity.into(),
        }
    }

    /// Create an offline presence event
    pub fn offline(identity: impl Into<String>) -> Self {
        ServerEvent::Offline {
            identity: identity.into(),
        }
    }

    /// Create a broadcast message event
    pub fn message(from: impl Into<String>, text: impl Into<String>) -> Self {
        ServerEvent::Message {
            from: from.into(),
            text: text.into(),
        }
    }

    /// Create a system-text broadcast (sender "System")
    pub fn system(text: impl Into<String>) -> Self {
        Self::message(SYSTEM_SENDER, text)
    }

    /// Create a private message event
    pub fn private_message(from: impl Into<String>, text: impl Into<String>) -> Self {
        ServerEvent::PrivateMessage {
            from: from.into(),
            text: text.into(),
        }
    }

    /// Create a group message event
    pub fn group_message(
        group: impl Into<String>,
        from: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        ServerEvent::GroupMessage {
            group: group.into(),
            from: from.into(),
            text: text.into(),
        }
    }

    /// Create a file delivery event
    pub fn file(name: impl Into<String>, content: Bytes) -> Self {
        ServerEvent::File {
            name: name.into(),
            content,
        }
    }

    /// Short name of the event kind (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Online { .. } => "online",
            ServerEvent::Offline { .. } => "offline",
            ServerEvent::Message { .. } => "message",
            ServerEvent::PrivateMessage { .. } => "private_message",
            ServerEvent::GroupMessage { .. } => "group_message",
            ServerEvent::File { .. } => "file",
        }
    }
}
