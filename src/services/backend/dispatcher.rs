use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::ConversationClient;
use crate::kernel::event::{Channel, Event, TurnEpoch};

/// Runs backend round-trips off the reactor and posts the results back as events.
pub struct TurnDispatcher {
    client: Arc<ConversationClient>,
    tx: mpsc::Sender<Event>,
    cancel: CancellationToken,
}

impl TurnDispatcher {
    pub fn new(client: Arc<ConversationClient>, tx: mpsc::Sender<Event>) -> Self {
        Self {
            client,
            tx,
            cancel: CancellationToken::new(),
        }
    }

    pub fn client(&self) -> &ConversationClient {
        &self.client
    }

    pub fn start_session(&self) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let event = tokio::select! {
                _ = cancel.cancelled() => return,
                result = client.start_session() => match result {
                    Ok(start) => Event::SessionStarted {
                        session_id: start.session_id.unwrap_or_default(),
                        greeting: start.response_text,
                    },
                    Err(e) => {
                        warn!("session start failed: {}", e);
                        Event::SessionFailed
                    }
                },
            };
            post(&tx, event).await;
        });
    }

    pub fn send_text(&self, epoch: TurnEpoch, session_id: String, text: String) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%epoch, "text request cancelled");
                    return;
                }
                result = client.send_text(&session_id, &text) => match result {
                    Ok(turn) => Event::TurnReceived { epoch, turn },
                    Err(e) => {
                        warn!(%epoch, transport = e.is_transport(), "text request failed: {}", e);
                        Event::TurnFailed { epoch, channel: Channel::Text }
                    }
                },
            };
            post(&tx, event).await;
        });
    }

    /// Waits `delay_ms` before uploading so the clip is fully flushed.
    pub fn send_voice(&self, epoch: TurnEpoch, session_id: String, audio: Vec<u8>, delay_ms: u64) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            let request = async {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                client.send_voice(&session_id, audio).await
            };
            let event = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(%epoch, "voice request cancelled");
                    return;
                }
                result = request => match result {
                    Ok(turn) => Event::TurnReceived { epoch, turn },
                    Err(e) => {
                        warn!(%epoch, transport = e.is_transport(), "voice request failed: {}", e);
                        Event::TurnFailed { epoch, channel: Channel::Voice }
                    }
                },
            };
            post(&tx, event).await;
        });
    }

    /// Cancels everything in flight. Later requests get a fresh token.
    pub fn cancel_all(&mut self) {
        info!("cancelling in-flight backend requests");
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
    }
}

async fn post(tx: &mpsc::Sender<Event>, event: Event) {
    if tx.send(event).await.is_err() {
        debug!("reactor channel closed, dropping backend result");
    }
}
