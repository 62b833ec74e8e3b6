//! Messenger registry: register and look up messengers by platform id.

use crate::delivery::Payload;
use crate::recipient::Umo;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A host integration that can deliver a message to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Platform id (e.g. "telegram"); matches the first segment of a umo.
    fn id(&self) -> &str;
    /// Deliver `payload` to `target` (the platform's chat id).
    async fn send_message(&self, target: &str, payload: &Payload) -> Result<(), String>;
}

/// Platform ids to messengers, plus an optional fallback for umos no platform claims.
pub struct MessengerRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<dyn Messenger>>>>,
    fallback: RwLock<Option<Arc<dyn Messenger>>>,
}

impl Default for MessengerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MessengerRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            fallback: RwLock::new(None),
        }
    }

    pub async fn register(&self, id: String, messenger: Arc<dyn Messenger>) {
        let mut g = self.inner.write().await;
        if g.insert(id.clone(), messenger).is_some() {
            log::debug!("messenger {} replaced", id);
        }
    }

    pub async fn set_fallback(&self, messenger: Arc<dyn Messenger>) {
        *self.fallback.write().await = Some(messenger);
    }

    pub async fn get(&self, id: &str) -> Option<Arc<dyn Messenger>> {
        let g = self.inner.read().await;
        g.get(id).cloned()
    }

    /// Pick the messenger and platform-level target for a recipient.
    /// A `platform:type:session` umo with a registered platform goes to that
    /// messenger with the session id as target; anything else goes to the
    /// fallback with the full umo as target.
    pub async fn route(&self, recipient: &str) -> Option<(Arc<dyn Messenger>, String)> {
        if let Some(umo) = Umo::parse(recipient) {
            if let Some(messenger) = self.get(umo.platform).await {
                return Some((messenger, umo.session_id.to_string()));
            }
        }
        self.fallback
            .read()
            .await
            .clone()
            .map(|m| (m, recipient.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl Messenger for Named {
        fn id(&self) -> &str {
            self.0
        }

        async fn send_message(&self, _target: &str, _payload: &Payload) -> Result<(), String> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn routes_by_platform_then_fallback() {
        let registry = MessengerRegistry::new();
        registry
            .register("telegram".to_string(), Arc::new(Named("telegram")))
            .await;

        let (m, target) = registry.route("telegram:FriendMessage:12345").await.unwrap();
        assert_eq!(m.id(), "telegram");
        assert_eq!(target, "12345");

        assert!(registry.route("group1").await.is_none());
        assert!(registry.route("qq:GroupMessage:1").await.is_none());

        registry.set_fallback(Arc::new(Named("log"))).await;
        let (m, target) = registry.route("qq:GroupMessage:1").await.unwrap();
        assert_eq!(m.id(), "log");
        assert_eq!(target, "qq:GroupMessage:1");
    }
}
