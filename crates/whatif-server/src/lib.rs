//! Process wiring for the whatif server: configuration, store and generator
//! bootstrap, and the final HTTP stack around [`whatif_api::api_router`].

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use whatif_api::AppState;
use whatif_core::{
  generator::{Generator, TemplatePools},
  store::RealityStore,
};
use whatif_store_sqlite::SqliteStore;

/// `store_path` value selecting a throwaway in-memory database.
pub const IN_MEMORY: &str = ":memory:";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, layered from defaults, an optional TOML
/// file, and `WHATIF_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Prefix for share URLs handed back to clients.
  pub public_url:     String,
  /// JSON file overriding the built-in template pools.
  #[serde(default)]
  pub templates_path: Option<PathBuf>,
}

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3001)?
      .set_default("store_path", "whatif.db")?
      .set_default("public_url", "http://localhost:3001")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("WHATIF"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

/// Open the SQLite store at `path`, or an in-memory one for `:memory:`.
pub async fn open_store(path: &Path) -> anyhow::Result<SqliteStore> {
  if path == Path::new(IN_MEMORY) {
    tracing::warn!("using an in-memory store; nothing will be persisted");
    return SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store");
  }

  let path = expand_tilde(path);
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

/// Build the generator, reading template pools from `path` when given.
pub fn load_generator(path: Option<&Path>) -> anyhow::Result<Generator> {
  let Some(path) = path else {
    return Ok(Generator::default());
  };

  let path = expand_tilde(path);
  let raw = std::fs::read_to_string(&path)
    .with_context(|| format!("failed to read templates at {path:?}"))?;
  let pools = TemplatePools::from_json(&raw)
    .with_context(|| format!("invalid templates at {path:?}"))?;

  tracing::info!(
    descriptions = pools.descriptions.len(),
    effects = pools.effects.len(),
    consequences = pools.consequences.len(),
    "loaded template pools"
  );
  Ok(Generator::new(pools))
}

/// The API router with request tracing applied.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: RealityStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  whatif_api::api_router(state).layer(TraceLayer::new_for_http())
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

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tower::ServiceExt as _;
  use whatif_api::ApiConfig;

  fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir()
      .join(format!("whatif-server-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/whatif.toml")).unwrap();
    assert_eq!(cfg.port, 3001);
    assert_eq!(cfg.store_path, PathBuf::from("whatif.db"));
    assert_eq!(cfg.public_url, "http://localhost:3001");
    assert!(cfg.templates_path.is_none());
  }

  #[test]
  fn config_file_overrides_defaults() {
    let path = scratch_file(
      "config.toml",
      "port = 8080\nstore_path = \":memory:\"\npublic_url = \"https://whatif.example\"\n",
    );
    let cfg = ServerConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.store_path, PathBuf::from(IN_MEMORY));
    assert_eq!(cfg.public_url, "https://whatif.example");
    assert_eq!(cfg.address(), "0.0.0.0:8080");
  }

  #[test]
  fn tilde_expands_only_as_prefix() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/data/whatif.db")),
      PathBuf::from(home).join("data/whatif.db")
    );
    assert_eq!(expand_tilde(Path::new("data/~/x")), PathBuf::from("data/~/x"));
  }

  #[test]
  fn custom_templates_are_loaded() {
    let path = scratch_file(
      "templates.json",
      r#"{"descriptions":["Only {event}"],"effects":["e"],"consequences":["c"]}"#,
    );
    let generator = load_generator(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(generator.pools().descriptions, vec!["Only {event}".to_owned()]);
  }

  #[test]
  fn empty_template_pool_is_rejected_at_startup() {
    let path = scratch_file(
      "empty.json",
      r#"{"descriptions":[],"effects":["e"],"consequences":["c"]}"#,
    );
    let result = load_generator(Some(&path));
    std::fs::remove_file(&path).ok();

    assert!(result.is_err());
  }

  #[test]
  fn no_templates_path_uses_builtin_pools() {
    let generator = load_generator(None).unwrap();
    assert!(generator.pools().validate().is_ok());
  }

  #[tokio::test]
  async fn wired_app_serves_health() {
    let store = open_store(Path::new(IN_MEMORY)).await.unwrap();
    let state = AppState::new(store, Generator::default(), ApiConfig {
      public_url: "http://localhost:3001".to_owned(),
    });

    let response = app(state)
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
  }
}
