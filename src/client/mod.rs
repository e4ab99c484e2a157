//! Session client seam.
//!
//! The messaging session itself (browser automation, pairing, delivery) is
//! owned by an external collaborator; this module defines the two operations
//! the bridge needs from it and the sidecar-backed production implementation.

mod protocol;
mod sidecar;

pub use protocol::{SidecarCommand, SidecarEvent};
pub use sidecar::SidecarClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Types
// ============================================================================

/// Identity of the authenticated session, present only while connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub number: String,
}

/// Receipt for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Platform-assigned message id.
    pub message_id: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The client rejected the operation; `message` is the platform's own
    /// description and is forwarded verbatim to API callers.
    #[error("{message}")]
    Command { code: String, message: String },

    #[error("session client is not running")]
    ChannelClosed,
}

// ============================================================================
// Session Client
// ============================================================================

/// The two operations the bridge delegates to the messaging session.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Identity of the authenticated session, if any.
    async fn info(&self) -> Option<ClientInfo>;

    /// Deliver a text message to `chat_id` and return the receipt.
    async fn send_text(&self, chat_id: &str, body: &str) -> Result<SentMessage, ClientError>;
}
