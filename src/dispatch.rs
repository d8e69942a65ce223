//! Alert dispatcher: renders the message template and fans it out to every
//! receiver through the SMS transport.

use crate::config::AlertRule;
use crate::error::TransportError;
use async_trait::async_trait;
use tracing::{info, warn};

/// Outgoing SMS transport, implemented by the Vonage client in production
/// and by mocks in tests.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn send(&self, from: &str, to: &str, text: &str) -> Result<(), TransportError>;
}

/// Per-receiver send outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Sent,
    Skipped(String),
    Failed(String),
}

/// Renders alert messages and sends them per receiver. Each receiver's send
/// is independent: one failure never aborts the rest.
pub struct AlertDispatcher<T> {
    transport: T,
    dry_run: bool,
}

impl<T: SmsTransport> AlertDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            dry_run: false,
        }
    }

    /// In dry-run mode messages are rendered and logged but never sent.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Send one rendered message per receiver and report each outcome.
    pub async fn dispatch(
        &self,
        rule: &AlertRule,
        values: &[String],
        range: &str,
    ) -> Vec<(String, SendResult)> {
        let text = render_template(&rule.text, values, range);
        let mut results = Vec::with_capacity(rule.to.as_slice().len());

        for receiver in rule.to.as_slice() {
            if self.dry_run {
                info!(receiver = %receiver, text = %text, "dry-run: would send sms");
                results.push((receiver.clone(), SendResult::Skipped("dry-run".to_string())));
                continue;
            }

            match self.transport.send(&rule.from, receiver, &text).await {
                Ok(()) => {
                    info!(receiver = %receiver, range = %range, "sms sent");
                    results.push((receiver.clone(), SendResult::Sent));
                }
                Err(error) => {
                    warn!(receiver = %receiver, range = %range, error = %error, "sms send failed");
                    results.push((receiver.clone(), SendResult::Failed(error.to_string())));
                }
            }
        }

        results
    }
}

/// Substitute the observed values and the range into the message template.
/// `{value}` renders the flattened raw values, `{range}` the range specifier.
pub fn render_template(template: &str, values: &[String], range: &str) -> String {
    template
        .replace("{value}", &format!("[{}]", values.join(", ")))
        .replace("{range}", range)
}
