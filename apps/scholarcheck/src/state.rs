use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::store::{FileStorage, Session};

/// Everything a command needs, built once per process.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Same session the API client invalidates tokens in.
    pub session: Arc<Session>,
    pub api: ApiClient,
}

impl AppState {
    pub fn init(config: Config) -> Result<Self> {
        let path = config.storage_path();
        let storage = FileStorage::open(path.clone())
            .with_context(|| format!("Failed to open session storage at {}", path.display()))?;
        let session = Arc::new(
            Session::hydrate(Arc::new(storage)).context("Failed to read session storage")?,
        );
        let api = ApiClient::new(&config.api_url, config.request_timeout, session.clone())
            .context("Failed to build HTTP client")?;
        debug!(api_url = %config.api_url, storage = %path.display(), "state initialized");

        Ok(Self {
            config,
            session,
            api,
        })
    }
}
