//! Delivery reports POSTed to a caller-supplied callback URL.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one delivery, as sent to the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub message_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(message_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Posts reports; failures are logged, never retried.
#[derive(Clone, Default)]
pub struct CallbackClient {
    client: reqwest::Client,
}

impl CallbackClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// POST the report as JSON. Returns an error string on transport failure or non-2xx.
    pub async fn send(&self, url: &str, report: &DeliveryReport) -> Result<(), String> {
        let res = self
            .client
            .post(url)
            .timeout(CALLBACK_TIMEOUT)
            .json(report)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            return Err(format!("callback returned {}", res.status()));
        }
        Ok(())
    }

    /// Send in the background so the dispatcher moves on to the next message.
    pub fn spawn_send(&self, url: String, report: DeliveryReport) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send(&url, &report).await {
                log::warn!(
                    "delivery callback for message {} to {} failed: {}",
                    report.message_id,
                    url,
                    e
                );
            }
        });
    }
}
