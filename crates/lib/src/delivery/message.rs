//! Outbound message handed from the gateway to the delivery queue.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How `OutboundMessage::body` is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Body is plain text.
    #[default]
    Text,
    /// Body is a base64-encoded image.
    Image,
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            other => Err(format!("unsupported message_type: {}", other)),
        }
    }
}

/// One message waiting for delivery. Its lifecycle ends when the dispatcher is done with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub id: String,
    /// Resolved umo.
    pub recipient: String,
    pub body: String,
    #[serde(default)]
    pub kind: MessageKind,
    /// Where to POST the delivery report, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

impl OutboundMessage {
    /// Text message with a fresh id and no callback.
    pub fn text(recipient: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipient: recipient.into(),
            body: body.into(),
            kind: MessageKind::Text,
            callback_url: None,
        }
    }

    /// Decode the body into what a messenger sends.
    pub fn payload(&self) -> Result<Payload, String> {
        match self.kind {
            MessageKind::Text => Ok(Payload::Text(self.body.clone())),
            MessageKind::Image => decode_image(&self.body),
        }
    }
}

/// Decoded message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Image { bytes: Vec<u8>, format: ImageFormat },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Detect the format from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else if bytes.starts_with(b"BM") && bytes.len() > 14 {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

fn decode_image(body: &str) -> Result<Payload, String> {
    // Accept data URLs as well as bare base64.
    let encoded = match body.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => body,
    };
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("invalid base64 image: {}", e))?;
    let format = ImageFormat::sniff(&bytes).ok_or("unrecognized image format")?;
    Ok(Payload::Image { bytes, format })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn message_kind_parses_case_insensitively() {
        assert_eq!("Image".parse::<MessageKind>(), Ok(MessageKind::Image));
        assert_eq!("".parse::<MessageKind>(), Ok(MessageKind::Text));
        assert!("video".parse::<MessageKind>().is_err());
    }

    #[test]
    fn text_payload_is_body() {
        let msg = OutboundMessage::text("group1", "hello");
        assert_eq!(msg.payload(), Ok(Payload::Text("hello".to_string())));
        assert!(uuid::Uuid::parse_str(&msg.id).is_ok());
    }

    #[test]
    fn image_payload_decodes_and_sniffs() {
        let mut png = PNG_HEADER.to_vec();
        png.extend_from_slice(&[0u8; 16]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);

        let mut msg = OutboundMessage::text("group1", encoded.clone());
        msg.kind = MessageKind::Image;
        assert_eq!(
            msg.payload(),
            Ok(Payload::Image {
                bytes: png.clone(),
                format: ImageFormat::Png
            })
        );

        msg.body = format!("data:image/png;base64,{}", encoded);
        assert!(matches!(
            msg.payload(),
            Ok(Payload::Image {
                format: ImageFormat::Png,
                ..
            })
        ));
    }

    #[test]
    fn image_payload_rejects_garbage() {
        let mut msg = OutboundMessage::text("group1", "not base64!!");
        msg.kind = MessageKind::Image;
        assert!(msg.payload().unwrap_err().contains("invalid base64"));

        msg.body = base64::engine::general_purpose::STANDARD.encode(b"plain text bytes");
        assert_eq!(msg.payload().unwrap_err(), "unrecognized image format");
    }
}
