//! Delivery queue: non-blocking hand-off from the gateway to the dispatcher.

use crate::delivery::OutboundMessage;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery queue is full ({capacity} messages waiting)")]
    QueueFull { capacity: usize },
    #[error("delivery queue is closed")]
    Closed,
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// Where the gateway submits messages. One call per accepted push.
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    /// Submit a message for delivery. Must not wait for the delivery itself.
    async fn enqueue(&self, message: OutboundMessage) -> Result<(), DeliveryError>;

    /// Messages accepted but not yet picked up. Reported in acks and health.
    fn pending(&self) -> usize {
        0
    }
}

/// In-process queue backed by a bounded tokio mpsc channel.
#[derive(Clone)]
pub struct BoundedQueue {
    tx: mpsc::Sender<OutboundMessage>,
}

impl BoundedQueue {
    /// Create the queue and the receiver the dispatcher drains. Capacity is at least 1.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

#[async_trait]
impl DeliveryQueue for BoundedQueue {
    async fn enqueue(&self, message: OutboundMessage) -> Result<(), DeliveryError> {
        match self.tx.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(DeliveryError::QueueFull {
                capacity: self.capacity(),
            }),
            Err(TrySendError::Closed(_)) => Err(DeliveryError::Closed),
        }
    }

    fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn enqueue_until_full() {
        let (queue, mut rx) = BoundedQueue::new(2);
        queue.enqueue(OutboundMessage::text("a", "1")).await.unwrap();
        queue.enqueue(OutboundMessage::text("a", "2")).await.unwrap();
        assert_eq!(queue.pending(), 2);

        let err = queue.enqueue(OutboundMessage::text("a", "3")).await.unwrap_err();
        assert!(matches!(err, DeliveryError::QueueFull { capacity: 2 }));

        assert_eq!(rx.recv().await.unwrap().body, "1");
        assert_eq!(queue.pending(), 1);
    }

    #[tokio::test]
    async fn enqueue_after_receiver_dropped_is_closed() {
        let (queue, rx) = BoundedQueue::new(4);
        drop(rx);
        let err = queue.enqueue(OutboundMessage::text("a", "1")).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Closed));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (queue, _rx) = BoundedQueue::new(0);
        assert_eq!(queue.capacity(), 1);
    }
}
