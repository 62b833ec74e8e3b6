//! Dispatcher: drains the delivery queue and hands messages to host messengers.

use crate::delivery::{CallbackClient, DeliveryReport, OutboundMessage};
use crate::messengers::MessengerRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid message body: {0}")]
    Payload(String),
    #[error("no messenger for recipient {0}")]
    NoMessenger(String),
    #[error("messenger {messenger} failed: {reason}")]
    Send { messenger: String, reason: String },
    #[error("messenger {messenger} did not answer within {after:?}")]
    Timeout { messenger: String, after: Duration },
}

/// Upper bound on one messenger call.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers queued messages one at a time.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<MessengerRegistry>,
    callbacks: CallbackClient,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<MessengerRegistry>) -> Self {
        Self {
            registry,
            callbacks: CallbackClient::new(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Override how long a single messenger call may take.
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Decode, route, and send one message.
    pub async fn deliver(&self, message: &OutboundMessage) -> Result<(), DispatchError> {
        let payload = message.payload().map_err(DispatchError::Payload)?;
        let (messenger, target) = self
            .registry
            .route(&message.recipient)
            .await
            .ok_or_else(|| DispatchError::NoMessenger(message.recipient.clone()))?;
        match tokio::time::timeout(self.send_timeout, messenger.send_message(&target, &payload))
            .await
        {
            Ok(result) => result.map_err(|reason| DispatchError::Send {
                messenger: messenger.id().to_string(),
                reason,
            }),
            Err(_) => Err(DispatchError::Timeout {
                messenger: messenger.id().to_string(),
                after: self.send_timeout,
            }),
        }
    }

    async fn process(&self, message: OutboundMessage) {
        log::debug!("dispatching message {} to {}", message.id, message.recipient);
        let report = match self.deliver(&message).await {
            Ok(()) => {
                log::info!("delivered message {} to {}", message.id, message.recipient);
                DeliveryReport::delivered(&message.id)
            }
            Err(e) => {
                log::error!("delivery of message {} failed: {}", message.id, e);
                DeliveryReport::failed(&message.id, e.to_string())
            }
        };
        if let Some(url) = message.callback_url {
            self.callbacks.spawn_send(url, report);
        }
    }

    /// Start the drain loop. It ends when `shutdown` changes (or its sender is
    /// dropped) or when every queue sender is gone. Shutdown also cuts short a
    /// delivery in flight; that message and anything still queued are discarded.
    pub fn spawn(
        self,
        mut rx: mpsc::Receiver<OutboundMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        log::info!("delivery dispatcher started");
        tokio::spawn(async move {
            loop {
                if *shutdown.borrow() {
                    break;
                }
                let next = tokio::select! {
                    _ = shutdown.changed() => break,
                    next = rx.recv() => next,
                };
                let Some(message) = next else {
                    break;
                };
                let id = message.id.clone();
                tokio::select! {
                    _ = self.process(message) => {}
                    _ = shutdown.changed() => {
                        log::warn!("shutdown interrupted delivery of message {}", id);
                        break;
                    }
                }
            }

            rx.close();
            let mut discarded = 0usize;
            while rx.try_recv().is_ok() {
                discarded += 1;
            }
            if discarded > 0 {
                log::warn!("discarded {} undelivered message(s) on shutdown", discarded);
            }
            log::info!("delivery dispatcher stopped");
        })
    }
}
