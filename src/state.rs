//! Connection state store.
//!
//! Holds the single source of truth for "is there a pending QR to display".
//! The sidecar's lifecycle events are the only writer; HTTP handlers read
//! concurrently through cloned handles.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};

use crate::api::ConnectionStatus;
use crate::client::ClientInfo;

// ============================================================================
// Lifecycle Events
// ============================================================================

/// Lifecycle notifications emitted by the session client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A pairing QR code was issued.
    Qr(String),
    /// The session was authenticated (QR scanned).
    Authenticated,
    /// The session is fully established and can send messages.
    Ready,
    /// The session was lost; carries the platform's reason string.
    Disconnected(String),
}

// ============================================================================
// Connection State
// ============================================================================

/// Shared holder of the most recently issued QR payload.
///
/// The payload is present only between a `Qr` event and the next
/// `Authenticated`/`Ready`/`Disconnected` event.
#[derive(Clone, Default)]
pub struct ConnectionState {
    qr: Arc<RwLock<Option<String>>>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one lifecycle event to the store.
    pub async fn apply(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Qr(payload) => {
                info!("QR code issued");
                *self.qr.write().await = Some(payload);
            }
            LifecycleEvent::Authenticated => {
                info!("Session authenticated");
                *self.qr.write().await = None;
            }
            LifecycleEvent::Ready => {
                info!("Session ready");
                *self.qr.write().await = None;
            }
            LifecycleEvent::Disconnected(reason) => {
                info!(reason = %reason, "Session disconnected");
                *self.qr.write().await = None;
            }
        }
    }

    /// Current QR payload, if one is pending.
    pub async fn qr(&self) -> Option<String> {
        self.qr.read().await.clone()
    }
}

/// Derive the reported status from the QR payload and the client identity.
///
/// A pending QR wins over a (possibly stale) identity; the identity is only
/// reported while the status is `CONNECTED`.
pub fn derive_status(
    qr: Option<&str>,
    identity: Option<ClientInfo>,
) -> (ConnectionStatus, Option<ClientInfo>) {
    if qr.is_some() {
        (ConnectionStatus::ScanQr, None)
    } else if let Some(info) = identity {
        (ConnectionStatus::Connected, Some(info))
    } else {
        (ConnectionStatus::Disconnected, None)
    }
}

/// Bridge the session client's event channel into the state store.
///
/// Runs until the sending side is dropped.
pub async fn run_event_pump(state: ConnectionState, mut events: mpsc::Receiver<LifecycleEvent>) {
    while let Some(event) = events.recv().await {
        state.apply(event).await;
    }
    debug!("Lifecycle event channel closed");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ClientInfo {
        ClientInfo {
            name: "Alice".to_string(),
            number: "6281234".to_string(),
        }
    }

    #[tokio::test]
    async fn test_qr_absent_initially() {
        let state = ConnectionState::new();
        assert_eq!(state.qr().await, None);
    }

    #[tokio::test]
    async fn test_qr_event_stores_payload() {
        let state = ConnectionState::new();
        state.apply(LifecycleEvent::Qr("2@abc".to_string())).await;
        assert_eq!(state.qr().await.as_deref(), Some("2@abc"));
    }

    #[tokio::test]
    async fn test_latest_qr_wins() {
        let state = ConnectionState::new();
        state.apply(LifecycleEvent::Qr("first".to_string())).await;
        state.apply(LifecycleEvent::Qr("second".to_string())).await;
        assert_eq!(state.qr().await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_every_terminal_event_clears_qr() {
        let terminal = [
            LifecycleEvent::Authenticated,
            LifecycleEvent::Ready,
            LifecycleEvent::Disconnected("NAVIGATION".to_string()),
        ];
        for event in terminal {
            let state = ConnectionState::new();
            state.apply(LifecycleEvent::Qr("2@abc".to_string())).await;
            state.apply(event).await;
            assert_eq!(state.qr().await, None);
        }
    }

    #[tokio::test]
    async fn test_clear_without_pending_qr_is_harmless() {
        let state = ConnectionState::new();
        state.apply(LifecycleEvent::Ready).await;
        assert_eq!(state.qr().await, None);
    }

    #[test]
    fn test_derive_status_disconnected() {
        let (status, client_info) = derive_status(None, None);
        assert_eq!(status, ConnectionStatus::Disconnected);
        assert!(client_info.is_none());
    }

    #[test]
    fn test_derive_status_scan_qr_wins_over_identity() {
        let (status, client_info) = derive_status(Some("2@abc"), Some(info()));
        assert_eq!(status, ConnectionStatus::ScanQr);
        assert!(client_info.is_none());
    }

    #[test]
    fn test_derive_status_connected_reports_identity() {
        let (status, client_info) = derive_status(None, Some(info()));
        assert_eq!(status, ConnectionStatus::Connected);
        assert_eq!(client_info, Some(info()));
    }

    #[tokio::test]
    async fn test_event_pump_applies_in_order() {
        let state = ConnectionState::new();
        let (tx, rx) = mpsc::channel(8);
        let pump = tokio::spawn(run_event_pump(state.clone(), rx));

        tx.send(LifecycleEvent::Qr("2@abc".to_string()))
            .await
            .unwrap();
        tx.send(LifecycleEvent::Authenticated).await.unwrap();
        drop(tx);
        pump.await.unwrap();

        assert_eq!(state.qr().await, None);
    }
}
