//! Outbound SMS transports implementing [`Notifier`].

use std::{convert::Infallible, time::Duration};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use stacks_core::notify::Notifier;
use thiserror::Error;

/// Credentials for the Twilio Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
  pub account_sid: String,
  pub auth_token:  String,
  /// Sender number in E.164 form.
  pub from_number: String,
  #[serde(default = "default_api_base")]
  pub api_base:    String,
}

fn default_api_base() -> String { "https://api.twilio.com".to_owned() }

#[derive(Debug, Error)]
pub enum SmsError {
  #[error("sms request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("sms gateway rejected message ({status}): {body}")]
  Rejected { status: StatusCode, body: String },
}

// ─── Twilio ───────────────────────────────────────────────────────────────────

/// Sends each message as one `POST .../Messages.json`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TwilioNotifier {
  client: Client,
  config: SmsConfig,
}

impl TwilioNotifier {
  pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}/2010-04-01/Accounts/{}/Messages.json",
      self.config.api_base.trim_end_matches('/'),
      self.config.account_sid
    )
  }
}

impl Notifier for TwilioNotifier {
  type Error = SmsError;

  async fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
    let resp = self
      .client
      .post(self.url())
      .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
      .form(&[("To", to), ("From", self.config.from_number.as_str()), ("Body", body)])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(SmsError::Rejected { status, body });
    }
    Ok(())
  }
}

// ─── Log only ─────────────────────────────────────────────────────────────────

/// Used when no SMS credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  type Error = Infallible;

  async fn send(&self, to: &str, body: &str) -> Result<(), Infallible> {
    tracing::info!(%to, %body, "sms transport not configured; reminder logged only");
    Ok(())
  }
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// The transport chosen at startup from the `[sms]` configuration.
#[derive(Clone)]
pub enum SmsNotifier {
  Twilio(TwilioNotifier),
  Log(LogNotifier),
}

impl SmsNotifier {
  pub fn from_config(config: Option<&SmsConfig>) -> Result<Self, SmsError> {
    match config {
      Some(c) => Ok(Self::Twilio(TwilioNotifier::new(c.clone())?)),
      None => Ok(Self::Log(LogNotifier)),
    }
  }
}

impl Notifier for SmsNotifier {
  type Error = SmsError;

  async fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
    match self {
      Self::Twilio(t) => t.send(to, body).await,
      Self::Log(l) => l.send(to, body).await.map_err(|e| match e {}),
    }
  }
}
