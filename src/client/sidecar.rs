//! Sidecar-backed session client.
//!
//! Spawns the browser-automation sidecar once at startup and bridges its
//! stdio: events come in as JSON lines on stdout, commands go out as JSON
//! lines on stdin. The sidecar owns session persistence and reconnection;
//! this side never respawns it.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
use tracing::{debug, error, info, warn};
use ulid::Ulid;

use super::protocol::{SidecarCommand, SidecarEvent};
use super::{ClientError, ClientInfo, SentMessage, SessionClient};
use crate::config::ClientConfig;
use crate::state::LifecycleEvent;

type SendResult = Result<SentMessage, ClientError>;
type PendingSends = Mutex<HashMap<String, oneshot::Sender<SendResult>>>;

// ============================================================================
// Sidecar Client
// ============================================================================

/// Handle to the sidecar process.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct SidecarClient {
    command_tx: mpsc::Sender<SidecarCommand>,
    identity: Arc<RwLock<Option<ClientInfo>>>,
    pending: Arc<PendingSends>,
}

impl SidecarClient {
    /// Spawn the sidecar process and start the stdio bridge task.
    ///
    /// Lifecycle events are forwarded to `events` as they arrive.
    pub fn spawn(
        config: &ClientConfig,
        events: mpsc::Sender<LifecycleEvent>,
    ) -> std::io::Result<Self> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // On Linux, set PR_SET_PDEATHSIG so the sidecar dies with the bridge
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = cmd.spawn()?;

        let (command_tx, command_rx) = mpsc::channel(32);
        let identity = Arc::new(RwLock::new(None));
        let pending: Arc<PendingSends> = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(run_bridge(
            child,
            command_rx,
            events,
            identity.clone(),
            pending.clone(),
        ));

        Ok(Self {
            command_tx,
            identity,
            pending,
        })
    }

    /// Ask the sidecar to shut down gracefully.
    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(SidecarCommand::Shutdown).await;
    }
}

#[async_trait]
impl SessionClient for SidecarClient {
    async fn info(&self) -> Option<ClientInfo> {
        self.identity.read().await.clone()
    }

    async fn send_text(&self, chat_id: &str, body: &str) -> Result<SentMessage, ClientError> {
        let request_id = Ulid::new().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(request_id.clone(), tx);

        let command = SidecarCommand::SendMessage {
            request_id: request_id.clone(),
            chat_id: chat_id.to_string(),
            content: body.to_string(),
        };
        if self.command_tx.send(command).await.is_err() {
            self.pending.lock().await.remove(&request_id);
            return Err(ClientError::ChannelClosed);
        }

        // No timeout here: a hung sidecar send hangs the caller.
        rx.await.map_err(|_| ClientError::ChannelClosed)?
    }
}

// ============================================================================
// Stdio Bridge
// ============================================================================

/// Bridge the sidecar's stdio to the command channel and event sink.
///
/// Runs until the sidecar exits, its stdout closes, or a `Shutdown` command
/// is written.
async fn run_bridge(
    mut child: Child,
    mut command_rx: mpsc::Receiver<SidecarCommand>,
    events: mpsc::Sender<LifecycleEvent>,
    identity: Arc<RwLock<Option<ClientInfo>>>,
    pending: Arc<PendingSends>,
) {
    let mut stdin = child.stdin.take().expect("stdin should be piped");
    let stdout = child.stdout.take().expect("stdout should be piped");
    let mut stdout_reader = BufReader::new(stdout).lines();

    let mut exit_reason: Option<String> = None;

    loop {
        tokio::select! {
            // Read events from sidecar stdout
            line = stdout_reader.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        match serde_json::from_str::<SidecarEvent>(&line) {
                            Ok(event) => handle_event(event, &events, &identity, &pending).await,
                            Err(e) => {
                                warn!(line = %line, error = %e, "Failed to parse sidecar event");
                            }
                        }
                    }
                    Ok(None) => {
                        debug!("Sidecar stdout closed");
                        exit_reason = Some("session client closed its output".to_string());
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "Error reading sidecar stdout");
                        exit_reason = Some("session client stream error".to_string());
                        break;
                    }
                }
            }

            // Write commands to sidecar stdin
            cmd = command_rx.recv() => {
                match cmd {
                    Some(command) => {
                        let is_shutdown = matches!(command, SidecarCommand::Shutdown);
                        match serde_json::to_string(&command) {
                            Ok(json) => {
                                let line = format!("{json}\n");
                                if let Err(e) = stdin.write_all(line.as_bytes()).await {
                                    error!(error = %e, "Failed to write to sidecar stdin");
                                    exit_reason = Some("session client pipe broken".to_string());
                                    break;
                                }
                                if let Err(e) = stdin.flush().await {
                                    error!(error = %e, "Failed to flush sidecar stdin");
                                    exit_reason = Some("session client pipe broken".to_string());
                                    break;
                                }
                                if is_shutdown {
                                    break;
                                }
                            }
                            Err(e) => {
                                error!(error = %e, "Failed to serialize command");
                            }
                        }
                    }
                    None => {
                        debug!("Command channel closed");
                        break;
                    }
                }
            }

            // Sidecar exited on its own
            status = child.wait() => {
                match status {
                    Ok(status) => info!(status = %status, "Sidecar exited"),
                    Err(e) => error!(error = %e, "Error waiting for sidecar"),
                }
                exit_reason = Some("session client exited".to_string());
                break;
            }
        }
    }

    // The session is gone: drop the cached identity, fail in-flight sends,
    // and let readers observe the disconnect.
    *identity.write().await = None;
    for (_, tx) in pending.lock().await.drain() {
        let _ = tx.send(Err(ClientError::ChannelClosed));
    }
    if let Some(reason) = exit_reason {
        let _ = events.send(LifecycleEvent::Disconnected(reason)).await;
    }

    let _ = child.kill().await;
}

/// Translate one sidecar event: update the identity cache, resolve pending
/// sends, and forward lifecycle transitions.
async fn handle_event(
    event: SidecarEvent,
    events: &mpsc::Sender<LifecycleEvent>,
    identity: &RwLock<Option<ClientInfo>>,
    pending: &PendingSends,
) {
    match event {
        SidecarEvent::Qr { data } => {
            let _ = events.send(LifecycleEvent::Qr(data)).await;
        }
        SidecarEvent::Authenticated => {
            let _ = events.send(LifecycleEvent::Authenticated).await;
        }
        SidecarEvent::Ready { name, number } => {
            *identity.write().await = Some(ClientInfo { name, number });
            let _ = events.send(LifecycleEvent::Ready).await;
        }
        SidecarEvent::Disconnected { reason } => {
            // Identity must not outlive the session it belongs to.
            *identity.write().await = None;
            let _ = events.send(LifecycleEvent::Disconnected(reason)).await;
        }
        SidecarEvent::SendOk {
            request_id,
            message_id,
        } => {
            resolve_pending(pending, &request_id, Ok(SentMessage { message_id })).await;
        }
        SidecarEvent::SendError {
            request_id,
            code,
            message,
        } => {
            resolve_pending(pending, &request_id, Err(ClientError::Command { code, message }))
                .await;
        }
    }
}

async fn resolve_pending(pending: &PendingSends, request_id: &str, result: SendResult) {
    match pending.lock().await.remove(request_id) {
        Some(tx) => {
            let _ = tx.send(result);
        }
        None => {
            warn!(request_id = %request_id, "Send result for unknown request");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
