//! Delivery: the queue between the HTTP intake and the host messengers.
//!
//! The gateway pushes `OutboundMessage`s onto a `DeliveryQueue` without waiting;
//! a `Dispatcher` task drains the queue, hands each message to the messenger
//! chosen by its umo, and reports the outcome to the message's callback URL.

mod callback;
mod dispatcher;
mod message;
mod queue;

pub use callback::{CallbackClient, DeliveryReport};
pub use dispatcher::{DispatchError, Dispatcher};
pub use message::{ImageFormat, MessageKind, OutboundMessage, Payload};
pub use queue::{BoundedQueue, DeliveryError, DeliveryQueue};
