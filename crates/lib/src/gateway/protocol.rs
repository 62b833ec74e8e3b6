//! Push API wire types.

use crate::delivery::{MessageKind, OutboundMessage};
use crate::gateway::GatewayError;
use crate::recipient::{resolve_recipient, Resolution};
use serde::{Deserialize, Serialize};

/// POST body: `{ "message", "umo"?, "message_id"?, "message_type"?, "callback_url"? }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushRequest {
    #[serde(default, alias = "content")]
    pub message: Option<String>,
    #[serde(default)]
    pub umo: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    /// "text" (default) or "image" (base64 body).
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

impl PushRequest {
    /// Validate and resolve the recipient, producing the message to enqueue.
    pub fn into_outbound(self, default_umo: Option<&str>) -> Result<OutboundMessage, GatewayError> {
        let body = self
            .message
            .filter(|m| !m.is_empty())
            .ok_or_else(|| GatewayError::Validation("missing required field: message".to_string()))?;

        let kind: MessageKind = self
            .message_type
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(GatewayError::Validation)?;

        let recipient = match resolve_recipient(self.umo.as_deref(), default_umo) {
            Resolution::Resolved(r) => r,
            Resolution::Unresolved => {
                return Err(GatewayError::Validation(
                    "no recipient: pass umo or configure api.default_umo".to_string(),
                ))
            }
        };

        let id = self
            .message_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let callback_url = self
            .callback_url
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(ref url) = callback_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GatewayError::Validation(format!(
                    "callback_url must be http(s): {}",
                    url
                )));
            }
        }

        let message = OutboundMessage {
            id,
            recipient: recipient.into_string(),
            body,
            kind,
            callback_url,
        };
        message.payload().map_err(GatewayError::Validation)?;
        Ok(message)
    }
}

/// 200 response for an accepted push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushAck {
    pub status: String,
    pub message_id: String,
    pub umo: String,
    pub queue_size: usize,
}

/// GET /health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub queue_size: usize,
    pub timestamp: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> PushRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn default_recipient_used_without_umo() {
        let msg = request(r#"{"message":"hello"}"#)
            .into_outbound(Some("group1"))
            .unwrap();
        assert_eq!(msg.recipient, "group1");
        assert_eq!(msg.body, "hello");
        assert_eq!(msg.kind, MessageKind::Text);
    }

    #[test]
    fn content_is_accepted_as_message() {
        let msg = request(r#"{"content":"hi","umo":"user42","message_id":"m-1"}"#)
            .into_outbound(Some("group1"))
            .unwrap();
        assert_eq!(msg.recipient, "user42");
        assert_eq!(msg.body, "hi");
        assert_eq!(msg.id, "m-1");
    }

    #[test]
    fn empty_message_is_rejected() {
        for json in [r#"{}"#, r#"{"message":""}"#, r#"{"message":null,"umo":"u"}"#] {
            let err = request(json).into_outbound(Some("group1")).unwrap_err();
            assert!(matches!(err, GatewayError::Validation(_)), "{}", json);
        }
    }

    #[test]
    fn whitespace_message_is_still_a_message() {
        let msg = request(r#"{"message":"  ","umo":"u"}"#)
            .into_outbound(Some("group1"))
            .unwrap();
        assert_eq!(msg.body, "  ");
        assert_eq!(msg.recipient, "u");
    }

    #[test]
    fn unresolved_recipient_is_rejected() {
        let err = request(r#"{"message":"hello"}"#)
            .into_outbound(None)
            .unwrap_err();
        assert!(err.to_string().contains("no recipient"));
    }

    #[test]
    fn unknown_type_and_bad_image_are_rejected() {
        let err = request(r#"{"message":"x","message_type":"video"}"#)
            .into_outbound(Some("g"))
            .unwrap_err();
        assert!(err.to_string().contains("unsupported message_type"));

        let err = request(r#"{"message":"aGVsbG8=","message_type":"image"}"#)
            .into_outbound(Some("g"))
            .unwrap_err();
        assert!(err.to_string().contains("unrecognized image format"));
    }

    #[test]
    fn callback_url_must_be_http() {
        let err = request(r#"{"message":"x","callback_url":"ftp://host/cb"}"#)
            .into_outbound(Some("g"))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        let msg = request(r#"{"message":"x","callback_url":"https://host/cb"}"#)
            .into_outbound(Some("g"))
            .unwrap();
        assert_eq!(msg.callback_url.as_deref(), Some("https://host/cb"));
    }
}
