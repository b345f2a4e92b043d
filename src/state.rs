//! Application state: configuration, the remote API client, and the exporter.
//!
//! Nothing in here is mutated after startup. Per-connection editing state lives in
//! `controller::Controller`; sign-in state lives in per-session clones of `ApiClient`.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::controller::Controller;
use crate::error::ApiError;
use crate::export::Exporter;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: AppConfig,
    pub exporter: Exporter,
}

impl AppState {
    /// Build state from an already loaded configuration.
    #[instrument(level = "info", skip_all)]
    pub fn new(config: AppConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let exporter = Exporter::from_config(&config.export);

        info!(
            target: "quizdraft",
            base_url = %api.base_url(),
            deletion_policy = ?config.sync.deletion_policy,
            shuffle = config.export.shuffle,
            service_token = config.api.access_token.is_some(),
            "Remote test store configured"
        );

        Ok(Self { api, config, exporter })
    }

    /// Remote client acting on behalf of one HTTP caller.
    pub fn api_for(&self, token: Option<String>) -> ApiClient {
        self.api.with_token(token)
    }

    /// Fresh controller for a new WebSocket connection, with its own sign-in state.
    pub fn controller(&self) -> Controller {
        Controller::new(
            Arc::new(self.api.session()),
            self.exporter.clone(),
            self.config.export.shuffle,
            self.config.sync.deletion_policy,
        )
    }
}
