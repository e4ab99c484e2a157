//! Wire protocol between the bridge and the session sidecar.
//!
//! Newline-delimited JSON over stdio, bidirectional:
//!
//! - **Commands** (bridge → sidecar): instructions for the session.
//! - **Events** (sidecar → bridge): lifecycle notifications and command
//!   results.
//!
//! Send commands carry a `request_id` that the sidecar echoes back in the
//! matching `send_ok`/`send_error` event.

use serde::{Deserialize, Serialize};

/// Commands sent from the bridge to the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarCommand {
    /// Deliver a text message to a chat.
    SendMessage {
        request_id: String,
        chat_id: String,
        content: String,
    },

    /// Request graceful shutdown.
    Shutdown,
}

/// Events sent from the sidecar to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidecarEvent {
    /// A pairing QR code was issued; `data` is the raw payload to scan.
    Qr { data: String },

    /// The QR was scanned and the session authenticated.
    Authenticated,

    /// The session is established; carries the account identity.
    Ready { name: String, number: String },

    /// The session was lost.
    Disconnected { reason: String },

    /// A send command completed.
    SendOk {
        request_id: String,
        message_id: String,
    },

    /// A send command failed.
    SendError {
        request_id: String,
        code: String,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = SidecarCommand::SendMessage {
            request_id: "01ARZ".to_string(),
            chat_id: "6281234@c.us".to_string(),
            content: "hi".to_string(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "send_message");
        assert_eq!(json["chat_id"], "6281234@c.us");

        let json = serde_json::to_string(&SidecarCommand::Shutdown).unwrap();
        assert_eq!(json, r#"{"type":"shutdown"}"#);
    }

    #[test]
    fn test_event_deserialization() {
        let event: SidecarEvent =
            serde_json::from_str(r#"{"type":"qr","data":"2@abc=="}"#).unwrap();
        assert!(matches!(event, SidecarEvent::Qr { data } if data == "2@abc=="));

        let event: SidecarEvent = serde_json::from_str(
            r#"{"type":"ready","name":"Alice","number":"6281234"}"#,
        )
        .unwrap();
        assert!(matches!(event, SidecarEvent::Ready { .. }));

        let event: SidecarEvent = serde_json::from_str(
            r#"{"type":"send_error","request_id":"01ARZ","code":"platform_error","message":"network down"}"#,
        )
        .unwrap();
        match event {
            SidecarEvent::SendError { message, .. } => assert_eq!(message, "network down"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_event_round_trip() {
        let event = SidecarEvent::SendOk {
            request_id: "01ARZ".to_string(),
            message_id: "3EB0A9".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SidecarEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, SidecarEvent::SendOk { message_id, .. } if message_id == "3EB0A9"));
    }
}
