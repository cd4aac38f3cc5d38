//! Application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::auth::SessionKeys;
use crate::config::{ApiConfig, StoreBackend};
use crate::services::{ApplicationService, JobCatalogue};
use crate::store::{FirestoreStore, MemoryStore, Stores};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub stores: Stores,
    pub sessions: Arc<SessionKeys>,
    pub applications: ApplicationService,
    pub jobs: JobCatalogue,
}

impl AppState {
    /// Create state with the store backend selected by `config`.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let stores = match config.store_backend {
            StoreBackend::Firestore => {
                let store = FirestoreStore::from_env()
                    .await
                    .context("failed to initialize Firestore store")?;
                Stores::from_backend(Arc::new(store))
            }
            StoreBackend::Memory => {
                let store = match &config.memory_seed_path {
                    Some(path) => MemoryStore::from_seed_file(path)
                        .await
                        .with_context(|| format!("failed to load seed file {}", path.display()))?,
                    None => MemoryStore::new(),
                };
                Stores::from_backend(Arc::new(store))
            }
        };

        info!(backend = config.store_backend.as_str(), "Store initialized");
        Ok(Self::with_stores(config, stores))
    }

    /// Create state over already constructed stores.
    pub fn with_stores(config: ApiConfig, stores: Stores) -> Self {
        let sessions = Arc::new(SessionKeys::new(&config.jwt_secret));
        let applications = ApplicationService::new(stores.clone(), config.resume_max_bytes);
        let jobs = JobCatalogue::new(stores.clone());

        Self {
            config,
            stores,
            sessions,
            applications,
            jobs,
        }
    }
}
