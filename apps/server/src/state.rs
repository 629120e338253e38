//! Shared application state

use anyhow::Context as _;
use convene_query::{MemoryStore, PlanExecutor};
use std::sync::Arc;

use crate::auth::TenantAuthenticator;
use crate::config::{Config, StoreBackend};
use crate::db::{self, PostgresPlanExecutor};
use crate::models::collections;
use crate::services::ListingService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<TenantAuthenticator>,
    pub listings: Arc<ListingService>,
}

impl AppState {
    /// Connects the configured store and wires the services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn PlanExecutor> = match config.database.backend {
            StoreBackend::Postgres => {
                let pool = db::connect(&config.database).await?;
                tracing::info!(
                    max_connections = config.database.pool_max_size,
                    "Database pool ready"
                );
                Arc::new(PostgresPlanExecutor::new(pool))
            }
            StoreBackend::Memory => Arc::new(load_memory_store(&config).await?),
        };
        Ok(Self::with_store(config, store))
    }

    /// Builds the state over an existing store.
    pub fn with_store(config: Config, store: Arc<dyn PlanExecutor>) -> Self {
        let listings = ListingService::new(store, config.query.pagination_policy());
        Self {
            auth: Arc::new(TenantAuthenticator::new(&config.auth)),
            listings: Arc::new(listings),
            config: Arc::new(config),
        }
    }
}

async fn load_memory_store(config: &Config) -> anyhow::Result<MemoryStore> {
    let Some(path) = &config.database.seed_file else {
        tracing::warn!("Memory backend without seed_file, starting empty");
        return Ok(MemoryStore::new());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read seed file {}", path.display()))?;
    let seed: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parse seed file {}", path.display()))?;
    let store = MemoryStore::from_seed(seed)?;

    tracing::info!(
        seed_file = %path.display(),
        events = store.document_count(collections::EVENTS).await,
        schedules = store.document_count(collections::EVENT_SCHEDULES).await,
        speakers = store.document_count(collections::SPEAKERS).await,
        "Memory store seeded"
    );
    Ok(store)
}
