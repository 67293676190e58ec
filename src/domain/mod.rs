// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod locale;
pub mod media;
pub mod node;
pub mod tree;
pub mod view;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use node::{validate_key, validate_node, Node, NodeKind, DEFAULT_COLLECTION_TYPE, SYSTEM_COLLECTION_TYPE};

pub use locale::{Meta, MetaInput, NewTranslation, NodeContent, Translation};

pub use media::{validate_media, MediaItem};

pub use tree::{validate_forest, Forest, Interval, TreeShift};

pub use view::{Aggregates, BreadcrumbEntry, DescendantKind, NodeSummary, NodeView};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors
/// These represent violations of tree rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    /// A stored forest broke a structural rule; the transaction is aborted
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Caller input rejected before anything is written
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Moving {node_id} under {target_id} would create a cycle")]
    Cycle { node_id: Uuid, target_id: Uuid },

    #[error("Node {node_id} has {descendants} descendants; delete with cascade")]
    HasChildren { node_id: Uuid, descendants: i64 },

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Key '{0}' is already in use")]
    DuplicateKey(String),

    #[error("Node {0} is locked")]
    Locked(Uuid),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
