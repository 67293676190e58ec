// src/lib.rs
// Canopy - hierarchical category and collection store
//
// Architecture:
// - Domain-centric: tree and locale rules are pure functions over domain values
// - Transactional: every mutation is one SQLite write transaction
// - Event-driven: the façade publishes committed facts, caches react to them
// - Explicit: the locale is always an argument, never ambient state

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_forest,
    validate_key,
    validate_media,
    validate_node,
    // View state
    Aggregates,
    BreadcrumbEntry,
    DescendantKind,
    DomainError,
    DomainResult,
    // Tree
    Forest,
    Interval,
    // Media
    MediaItem,
    // Locale content
    Meta,
    MetaInput,
    NewTranslation,
    // Nodes
    Node,
    NodeContent,
    NodeKind,
    NodeSummary,
    NodeView,
    Translation,
    TreeShift,
    DEFAULT_COLLECTION_TYPE,
    SYSTEM_COLLECTION_TYPE,
};

// ============================================================================
// PUBLIC API - Errors and Configuration
// ============================================================================

pub use config::StoreConfig;
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    register_aggregate_handlers,
    ContentUpdated,
    DomainEvent,
    EventBus,
    EventLogEntry,
    MediaAttached,
    MediaDetached,
    MetaUpdated,
    NodeCreated,
    NodeDeleted,
    NodeMoved,
};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    MediaRepository,
    MetaRepository,
    NodeRepository,
    SqliteMediaRepository,
    SqliteMetaRepository,
    SqliteNodeRepository,
    SqliteTranslationRepository,
    TranslationRepository,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    AggregateService,
    AttachMediaRequest,
    ContentLoader,
    CreateNodeRequest,
    MoveNodeRequest,
    SetContentRequest,
    TreeEngine,
    TreeService,
    UpdateNodeRequest,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::AppState;

pub use application::commands;
pub use application::dto;
