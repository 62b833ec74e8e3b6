//! Host messengers: the integrations that actually deliver a message to a chat.
//!
//! The dispatcher looks a messenger up by the platform part of the recipient's umo
//! and falls back to the registry's default messenger otherwise.

mod log_messenger;
mod registry;
mod telegram;

pub use log_messenger::LogMessenger;
pub use registry::{Messenger, MessengerRegistry};
pub use telegram::TelegramMessenger;
