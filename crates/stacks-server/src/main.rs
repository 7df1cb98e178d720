//! `stacks` server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and either serves the JSON API over HTTP or runs one reminder pass.
//!
//! ```text
//! stacks serve
//! stacks remind                      # every open loan due within the window
//! stacks remind --usn 1RV20CS001     # one student's loans
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use stacks_core::{Lending, lending::ReminderTarget};
use stacks_server::{ServerConfig, expand_tilde, sms::SmsNotifier};
use stacks_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(author, version, about = "Stacks library lending server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,
  /// Send reminders once and print the report.
  ///
  /// Without filters, reminds every open loan due within the reminder window.
  Remind {
    #[arg(long)]
    usn:        Option<String>,
    #[arg(long)]
    student_id: Option<Uuid>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config).context("failed to read configuration")?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let notifier =
    SmsNotifier::from_config(cfg.sms.as_ref()).context("failed to set up sms transport")?;
  if matches!(notifier, SmsNotifier::Log(_)) {
    tracing::warn!("no [sms] configuration; reminders will only be logged");
  }

  let lending = Arc::new(Lending::new(Arc::new(store), notifier, cfg.policy.clone()));

  match cli.command {
    Command::Serve => {
      let app = stacks_server::app(lending);
      let address = cfg.address();

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
    Command::Remind { usn, student_id } => {
      let report = match (usn, student_id) {
        (None, None) => lending.send_due_reminders().await,
        (usn, borrower_id) => {
          lending.send_reminders_for(&ReminderTarget { borrower_id, usn }).await
        }
      }
      .context("reminder pass failed")?;

      println!("{}", serde_json::to_string_pretty(&report)?);
    }
  }

  Ok(())
}
