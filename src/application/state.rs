// src/application/state.rs

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::db::{create_connection_pool, get_connection, initialize_database, ConnectionPool};
use crate::error::AppResult;
use crate::events::{register_aggregate_handlers, EventBus};
use crate::repositories::{
    MediaRepository, MetaRepository, NodeRepository, SqliteMediaRepository, SqliteMetaRepository,
    SqliteNodeRepository, SqliteTranslationRepository, TranslationRepository,
};
use crate::services::{AggregateService, ContentLoader, TreeEngine, TreeService};

/// Wired services sharing one pool and one event bus.
/// All fields are Arc-wrapped for thread-safe sharing across callers.
pub struct AppState {
    pub pool: ConnectionPool,
    pub event_bus: Arc<EventBus>,
    pub tree_service: Arc<TreeService>,
    pub aggregate_service: Arc<AggregateService>,
}

impl AppState {
    /// Open the configured database, bring the schema up to date and wire everything.
    pub fn initialize(config: &StoreConfig) -> AppResult<Self> {
        config.validate()?;
        let pool = create_connection_pool(config)?;
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
        }
        Ok(Self::with_pool(pool, config))
    }

    /// Wire services over an already initialised pool.
    pub fn with_pool(pool: ConnectionPool, config: &StoreConfig) -> Self {
        let node_repo: Arc<dyn NodeRepository> = Arc::new(SqliteNodeRepository::new());
        let translation_repo: Arc<dyn TranslationRepository> =
            Arc::new(SqliteTranslationRepository::new());
        let meta_repo: Arc<dyn MetaRepository> = Arc::new(SqliteMetaRepository::new());
        let media_repo: Arc<dyn MediaRepository> = Arc::new(SqliteMediaRepository::new());

        let event_bus = Arc::new(EventBus::new());
        let engine = Arc::new(TreeEngine::new(Arc::clone(&node_repo)));

        let tree_service = Arc::new(TreeService::new(
            pool.clone(),
            config,
            Arc::clone(&engine),
            node_repo,
            Arc::clone(&translation_repo),
            Arc::clone(&meta_repo),
            Arc::clone(&media_repo),
            Arc::clone(&event_bus),
        ));

        let aggregate_service = Arc::new(AggregateService::new(
            pool.clone(),
            engine,
            ContentLoader::new(translation_repo, meta_repo),
            media_repo,
        ));
        register_aggregate_handlers(&event_bus, Arc::clone(&aggregate_service));

        Self {
            pool,
            event_bus,
            tree_service,
            aggregate_service,
        }
    }
}
