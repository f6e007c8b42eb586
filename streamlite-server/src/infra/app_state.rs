use std::{fmt, sync::Arc};

use streamlite_core::{CatalogStore, ScanReport, SyncEngine};
use tokio::sync::Mutex;

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub config: Arc<Config>,
    /// Held for the duration of a scan so refreshes never interleave.
    pub scan_lock: Arc<Mutex<()>>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, config: Config) -> Self {
        Self {
            catalog,
            config: Arc::new(config),
            scan_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Scans the configured video directory, waiting for any scan already
    /// in progress to finish first.
    pub async fn refresh_catalog(&self) -> streamlite_core::Result<ScanReport> {
        let _guard = self.scan_lock.lock().await;
        SyncEngine::new(self.catalog.clone())
            .sync(&self.config.video_dir)
            .await
    }
}
