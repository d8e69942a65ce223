//! Vonage SMS transport.

use crate::dispatch::SmsTransport;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct VonageConfig {
    pub api_key: String,
    pub api_secret: String,
    /// API endpoint, overridable for tests.
    pub base_url: String,
    /// Bounded per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VonageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: "https://rest.nexmo.com".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct VonageSms {
    client: Client,
    config: VonageConfig,
}

impl VonageSms {
    pub fn new(config: VonageConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    api_key: &'a str,
    api_secret: &'a str,
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsResponse {
    #[serde(default)]
    messages: Vec<SmsMessageStatus>,
}

#[derive(Debug, Deserialize)]
struct SmsMessageStatus {
    status: String,
    #[serde(rename = "error-text", default)]
    error_text: Option<String>,
}

#[async_trait]
impl SmsTransport for VonageSms {
    async fn send(&self, from: &str, to: &str, text: &str) -> Result<(), TransportError> {
        let url = format!("{}/sms/json", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .form(&SmsRequest {
                api_key: &self.config.api_key,
                api_secret: &self.config.api_secret,
                from,
                to,
                text,
            })
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Request(format!(
                "sms api returned HTTP {status}"
            )));
        }

        let body: SmsResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Request(format!("failed to parse response: {e}")))?;

        // One message was submitted, so exactly one status is expected.
        let message = body
            .messages
            .first()
            .ok_or_else(|| TransportError::Request("sms api returned no message status".to_string()))?;

        if message.status == "0" {
            Ok(())
        } else {
            Err(TransportError::Rejected {
                status: message.status.clone(),
                reason: message
                    .error_text
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vonage_config_default() {
        let config = VonageConfig::default();
        assert_eq!(config.base_url, "https://rest.nexmo.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_sms_response_success_status() {
        let body: SmsResponse = serde_json::from_str(
            r#"{"message-count": "1", "messages": [{"to": "316", "status": "0", "message-id": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(body.messages[0].status, "0");
        assert!(body.messages[0].error_text.is_none());
    }

    #[test]
    fn test_sms_response_error_status() {
        let body: SmsResponse = serde_json::from_str(
            r#"{"messages": [{"status": "2", "error-text": "Missing to param"}]}"#,
        )
        .unwrap();
        assert_eq!(body.messages[0].status, "2");
        assert_eq!(body.messages[0].error_text.as_deref(), Some("Missing to param"));
    }
}
