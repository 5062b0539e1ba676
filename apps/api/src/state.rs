use std::sync::Arc;

use crate::admin::session::SessionStore;
use crate::applications::placement::ResumePlacer;
use crate::applications::service::ApplicationService;
use crate::config::Config;
use crate::errors::AppError;
use crate::store::JsonFileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub applications: ApplicationService,
    pub sessions: SessionStore,
}

impl AppState {
    /// Opens the JSON store (creating it if needed) and wires the services.
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(JsonFileStore::open(&config.data_file).await?);
        let placer = ResumePlacer::new(config.upload_dir());
        let sessions = SessionStore::new(config.session_ttl);

        Ok(AppState {
            applications: ApplicationService::new(store, placer),
            sessions,
            config,
        })
    }
}
