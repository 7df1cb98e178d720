//! Runtime configuration, read from an optional TOML file and `STACKS_*`
//! environment variables.
//!
//! ```toml
//! host       = "0.0.0.0"
//! port       = 8008
//! store_path = "~/.local/share/stacks/stacks.db"
//!
//! [policy]
//! loan_period_days = 14
//! late_fee_per_day = "10"
//!
//! [sms]
//! account_sid = "AC..."
//! auth_token  = "..."
//! from_number = "+12184844884"
//! ```
//!
//! Nested keys use `__` in the environment, e.g. `STACKS_SMS__AUTH_TOKEN`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use stacks_core::policy::LendingPolicy;

use crate::sms::SmsConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub policy:     LendingPolicy,
  /// Without this section reminders are only logged.
  #[serde(default)]
  pub sms:        Option<SmsConfig>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 8008 }

fn default_store_path() -> PathBuf { PathBuf::from("stacks.db") }

impl ServerConfig {
  /// Layer `path` (if it exists) under the process environment.
  ///
  /// Out-of-range `[policy]` values are rejected here rather than at the
  /// first checkout.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("STACKS")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()?
      .try_deserialize()?;

    cfg
      .policy
      .validate()
      .map_err(|e| config::ConfigError::Message(format!("invalid [policy]: {e}")))?;
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn file_values_override_defaults() {
    let path = temp_file(
      "stacks-settings",
      r#"
        port = 9000
        store_path = "/tmp/stacks-test.db"

        [policy]
        loan_period_days = 7

        [sms]
        account_sid = "AC123"
        auth_token  = "secret"
        from_number = "+15550000000"
      "#,
    );

    let cfg = ServerConfig::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/stacks-test.db"));
    assert_eq!(cfg.policy.loan_period_days, 7);
    assert_eq!(cfg.policy.reminder_window_days, LendingPolicy::default().reminder_window_days);

    let sms = cfg.sms.unwrap();
    assert_eq!(sms.account_sid, "AC123");
    assert_eq!(sms.from_number, "+15550000000");
    assert_eq!(sms.api_base, "https://api.twilio.com");
  }

  #[test]
  fn out_of_range_policy_is_rejected() {
    for (name, table) in [
      ("stacks-period-negative", "loan_period_days = -1"),
      ("stacks-period-huge", "loan_period_days = 200000000"),
      ("stacks-window-negative", "reminder_window_days = -1"),
      ("stacks-fee-negative", "late_fee_per_day = \"-10\""),
    ] {
      let path = temp_file(name, &format!("[policy]\n{table}\n"));
      let err = ServerConfig::load(&path).unwrap_err();
      fs::remove_file(&path).ok();

      assert!(err.to_string().contains("invalid [policy]"), "{table}: {err}");
    }
  }

  #[test]
  fn address_joins_host_and_port() {
    let path = temp_file("stacks-address", "host = \"127.0.0.1\"\nport = 8123\n");
    let cfg = ServerConfig::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(cfg.address(), "127.0.0.1:8123");
    assert!(cfg.sms.is_none());
  }
}
