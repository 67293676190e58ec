pub mod entity;
pub mod invariants;

pub use entity::{Node, NodeKind, DEFAULT_COLLECTION_TYPE, SYSTEM_COLLECTION_TYPE};
pub use invariants::{validate_key, validate_node};
