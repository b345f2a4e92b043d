//! Quizdraft · Quiz Editor Backend
//!
//! - Axum HTTP + WebSocket API for the quiz editor frontend
//! - Drafts are edited per WebSocket connection and reconciled with the remote
//!   test store on save
//! - Static SPA fallback (`<static_dir>/index.html`)
//!
//! Important env variables:
//!   QUIZ_CONFIG_PATH   : path to TOML config (server, api, sync, export sections)
//!   PORT               : u16 (default 3000)
//!   QUIZ_API_BASE_URL  : remote test store, default "http://localhost:8000/api/v1"
//!   QUIZ_ACCESS_TOKEN  : token for sessions that never signed in
//!   LOG_LEVEL          : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT         : "pretty" (default) or "json"

mod api;
mod config;
mod controller;
mod domain;
mod draft;
mod editor;
mod error;
mod export;
mod logic;
mod protocol;
mod reconcile;
mod remote;
mod routes;
mod state;
mod telemetry;
mod util;
mod variants;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = AppConfig::load_from_env();
  let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

  // Shared application state (config, remote client, exporter).
  let state = Arc::new(AppState::new(config)?);

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quizdraft", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "quizdraft", error = %e, "Could not listen for Ctrl-C");
    return;
  }
  info!(target: "quizdraft", "Shutting down");
}
