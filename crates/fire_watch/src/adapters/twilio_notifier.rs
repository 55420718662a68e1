// Rust guideline compliant 2026-10-14

//! Twilio adapter for the `Notifier` port.
//!
//! Sends one SMS per alert through the Messages REST resource
//! (`POST {api_base}/2010-04-01/Accounts/{sid}/Messages.json`) using HTTP
//! basic auth and a form-encoded body. Every failure is reported as a
//! `NotificationError`; nothing is retried.

use domain::{MessageId, NotificationError, Notifier};
use std::fmt;
use std::time::Duration;

/// Production endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Account, credentials and phone numbers for [`TwilioNotifier`].
#[derive(Clone, PartialEq, Eq)]
pub struct TwilioConfig {
    /// Scheme and host of the REST API, without trailing path.
    pub api_base: String,
    /// Account SID (`AC...`).
    pub account_sid: String,
    /// Auth token paired with the account SID.
    pub auth_token: String,
    /// Sender number owned by the account, E.164.
    pub from_number: String,
    /// Recipient number, E.164.
    pub to_number: String,
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("api_base", &self.api_base)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .finish()
    }
}

/// Successful response body; only the message SID is used.
#[derive(Debug, serde::Deserialize)]
struct MessageResource {
    sid: String,
}

/// Error response body.
#[derive(Debug, serde::Deserialize)]
struct ErrorResource {
    code: Option<u32>,
    message: String,
}

/// `Notifier` adapter backed by the Twilio Messages API.
#[derive(Debug)]
pub struct TwilioNotifier {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioNotifier {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Transport`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: TwilioConfig) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotificationError::Transport { reason: e.to_string() })?;
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

/// Map an HTTP status and body to a message id or a provider error.
fn parse_response(status: u16, body: &str) -> Result<MessageId, NotificationError> {
    if (200..300).contains(&status) {
        return serde_json::from_str::<MessageResource>(body)
            .map(|m| MessageId(m.sid))
            .map_err(|e| NotificationError::InvalidResponse { reason: e.to_string() });
    }
    match serde_json::from_str::<ErrorResource>(body) {
        Ok(err) => {
            Err(NotificationError::Rejected { status, code: err.code, message: err.message })
        }
        Err(_) => Err(NotificationError::Rejected {
            status,
            code: None,
            message: body.chars().take(200).collect(),
        }),
    }
}

impl Notifier for TwilioNotifier {
    async fn send_alert(&self, body: &str) -> Result<MessageId, NotificationError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", self.config.to_number.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| NotificationError::Transport { reason: e.to_string() })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| NotificationError::Transport { reason: e.to_string() })?;

        let message_id = parse_response(status, &text)?;
        tracing::info!(
            message_id = %message_id,
            to = %self.config.to_number,
            "twilio_notifier.sent"
        );
        Ok(message_id)
    }
}
