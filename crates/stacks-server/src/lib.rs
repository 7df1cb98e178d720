//! Process wiring for the Stacks server: configuration, SMS transports and
//! the traced HTTP application.

pub mod settings;
pub mod sms;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use stacks_core::{Lending, notify::Notifier, store::LendingStore};
use tower_http::trace::TraceLayer;

pub use settings::ServerConfig;

/// The API router with request tracing attached.
pub fn app<S, N>(lending: Arc<Lending<S, N>>) -> Router
where
  S: LendingStore + 'static,
  N: Notifier + 'static,
{
  stacks_api::api_router(lending).layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_paths_are_untouched() {
    assert_eq!(expand_tilde(Path::new("/var/lib/stacks.db")), PathBuf::from("/var/lib/stacks.db"));
    assert_eq!(expand_tilde(Path::new("stacks.db")), PathBuf::from("stacks.db"));
  }

  #[test]
  fn tilde_expands_under_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/.local/share/stacks.db")),
      PathBuf::from(home).join(".local/share/stacks.db"),
    );
  }
}
