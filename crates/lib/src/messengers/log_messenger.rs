//! Messenger that only writes deliveries to the log.

use crate::delivery::Payload;
use crate::messengers::Messenger;
use async_trait::async_trait;

/// Used as the fallback when no real host integration is configured.
pub struct LogMessenger {
    id: String,
}

impl Default for LogMessenger {
    fn default() -> Self {
        Self::new()
    }
}

impl LogMessenger {
    pub fn new() -> Self {
        Self {
            id: "log".to_string(),
        }
    }
}

#[async_trait]
impl Messenger for LogMessenger {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, target: &str, payload: &Payload) -> Result<(), String> {
        match payload {
            Payload::Text(text) => log::info!("[{}] {}", target, text),
            Payload::Image { bytes, format } => log::info!(
                "[{}] <{} image, {} bytes>",
                target,
                format.extension(),
                bytes.len()
            ),
        }
        Ok(())
    }
}
