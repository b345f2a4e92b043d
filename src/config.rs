//! Loading service configuration (remote API, sync policy, export labels) from TOML.
//!
//! Every field has a default, so an absent or partial file is fine. Environment
//! variables `PORT`, `QUIZ_API_BASE_URL` and `QUIZ_ACCESS_TOKEN` override the file.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub sync: SyncConfig,
  #[serde(default)]
  pub export: ExportConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub port: u16,
  /// Frontend bundle served with an `index.html` fallback.
  pub static_dir: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { port: 3000, static_dir: "./static".into() }
  }
}

/// Where the remote test store lives and how to reach it.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout_secs: u64,
  pub user_agent: String,
  /// Token used by sessions that never signed in (service accounts, local dev).
  pub access_token: Option<String>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "http://localhost:8000/api/v1".into(),
      timeout_secs: 20,
      user_agent: "quizdraft-backend/0.1".into(),
      access_token: None,
    }
  }
}

/// How deleted questions are detected when an edited test is saved.
#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeletionPolicy {
  /// Every snapshot question missing from the draft is deleted.
  #[default]
  SetDifference,
  /// Legacy rule: only look for deletions when the draft has fewer questions than the
  /// snapshot. Misses deletions when questions were added in the same edit.
  LengthGated,
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
  pub deletion_policy: DeletionPolicy,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
  pub shuffle: bool,
  /// Shuffle both match columns with one permutation so rows stay paired.
  pub keep_match_pairs: bool,
  pub strip_commas: bool,
  pub labels: ExportLabels,
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self { shuffle: true, keep_match_pairs: false, strip_commas: true, labels: ExportLabels::default() }
  }
}

/// Fixed phrases of the text export.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExportLabels {
  pub title: String,
  pub count: String,
  pub questions: String,
  pub choice: String,
  pub matching: String,
}

impl Default for ExportLabels {
  fn default() -> Self {
    Self {
      title: "Test title: ".into(),
      count: "Number of questions: ".into(),
      questions: "Questions:".into(),
      choice: "Answer options:".into(),
      matching: "Match each with one of:".into(),
    }
  }
}

impl AppConfig {
  /// File from QUIZ_CONFIG_PATH (if any), then environment overrides.
  pub fn load_from_env() -> Self {
    let mut cfg = load_config_file_from_env().unwrap_or_default();
    cfg.apply_env_overrides(|key| std::env::var(key).ok());
    cfg
  }

  fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
    if let Some(port) = var("PORT").and_then(|p| p.parse::<u16>().ok()) {
      self.server.port = port;
    }
    if let Some(url) = var("QUIZ_API_BASE_URL") {
      self.api.base_url = url;
    }
    if let Some(token) = var("QUIZ_ACCESS_TOKEN") {
      self.api.access_token = Some(token);
    }
  }
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_file_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quizdraft", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quizdraft", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quizdraft", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
