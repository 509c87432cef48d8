//! HTTP server wiring for Demeter.
//!
//! Holds the runtime configuration and assembles the top-level router that
//! mounts [`demeter_api::api_router`] under `/api`.

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use demeter_core::{
  limits::{DEFAULT_MAX_DEPTH, TraversalLimits},
  store::RecipeStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DEMETER_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Deepest ingredient tree a single walk may visit; the root is depth 1.
  pub max_depth:            Option<usize>,
  /// Wall-clock bound on a single tree walk, in milliseconds.
  pub traversal_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("demeter.db"),
      max_depth:            None,
      traversal_timeout_ms: None,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Traversal bounds for the store, falling back to the library defaults.
  pub fn limits(&self) -> TraversalLimits {
    let limits =
      TraversalLimits::default().with_max_depth(self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH));
    match self.traversal_timeout_ms {
      Some(ms) => limits.with_timeout(Duration::from_millis(ms)),
      None => limits,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application router: the REST API under `/api`, with request
/// tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: RecipeStore + 'static,
{
  Router::new()
    .nest("/api", demeter_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
