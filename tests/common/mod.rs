//! Common test utilities.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::sync::Mutex;

use wabridge::client::{ClientError, ClientInfo, SentMessage, SessionClient};
use wabridge::server::{self, AppState};
use wabridge::state::ConnectionState;

/// Scriptable stand-in for the sidecar client.
#[derive(Default)]
pub struct MockClient {
    identity: Mutex<Option<ClientInfo>>,
    fail_with: Mutex<Option<String>>,
    sent: Mutex<Vec<(String, String)>>,
}

impl MockClient {
    pub async fn set_identity(&self, name: &str, number: &str) {
        *self.identity.lock().await = Some(ClientInfo {
            name: name.to_string(),
            number: number.to_string(),
        });
    }

    /// Make every subsequent send fail with the given platform message.
    pub async fn fail_sends_with(&self, message: &str) {
        *self.fail_with.lock().await = Some(message.to_string());
    }

    /// `(chat_id, body)` pairs forwarded to the client, in order.
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl SessionClient for MockClient {
    async fn info(&self) -> Option<ClientInfo> {
        self.identity.lock().await.clone()
    }

    async fn send_text(&self, chat_id: &str, body: &str) -> Result<SentMessage, ClientError> {
        self.sent
            .lock()
            .await
            .push((chat_id.to_string(), body.to_string()));

        match self.fail_with.lock().await.clone() {
            Some(message) => Err(ClientError::Command {
                code: "platform_error".to_string(),
                message,
            }),
            None => Ok(SentMessage {
                message_id: "3EB0A9".to_string(),
            }),
        }
    }
}

/// A test app plus handles for driving lifecycle events and the mock client.
pub struct TestContext {
    pub app: Router,
    pub connection: ConnectionState,
    pub client: Arc<MockClient>,
}

/// Create a test app with the shared-secret gate disabled.
pub fn test_context() -> TestContext {
    test_context_with_key(None)
}

/// Create a test app, optionally enabling the shared-secret gate.
pub fn test_context_with_key(api_key: Option<&str>) -> TestContext {
    let connection = ConnectionState::new();
    let client = Arc::new(MockClient::default());
    let session_client: Arc<dyn SessionClient> = client.clone();

    let state = AppState {
        connection: connection.clone(),
        client: session_client,
        api_key: api_key.map(String::from),
        chat_suffix: "@c.us".to_string(),
    };

    TestContext {
        app: server::build_app(state),
        connection,
        client,
    }
}
