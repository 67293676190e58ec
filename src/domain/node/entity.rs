use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::tree::Interval;
use crate::domain::DomainError;

/// Type key given to collections created without an explicit type
pub const DEFAULT_COLLECTION_TYPE: &str = "collection.default";

/// Type key of system collections (locked)
pub const SYSTEM_COLLECTION_TYPE: &str = "collection.system";

/// Which forest a node lives in. The two forests never share intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Category,
    Collection,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Category => "category",
            NodeKind::Collection => "collection",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "category" => Ok(NodeKind::Category),
            "collection" => Ok(NodeKind::Collection),
            other => Err(DomainError::Validation(format!(
                "Unknown node kind '{}'",
                other
            ))),
        }
    }
}

/// A category or collection positioned in its nested-set forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Internal immutable identifier
    pub id: Uuid,

    pub kind: NodeKind,

    /// Parent node (lookup only, never cascades)
    pub parent_id: Option<Uuid>,

    /// Nested-set bounds
    pub lft: i64,
    pub rgt: i64,
    pub depth: i64,

    /// Stable external identifier, unique per kind when present
    pub key: Option<String>,

    /// Locale of the first translation ever written
    pub default_locale: Option<String>,

    /// Meta entry used when no entry matches a requested locale
    pub default_meta_id: Option<Uuid>,

    /// Collection type key (collections only)
    pub collection_type: Option<String>,

    /// Free-form collection style (collections only)
    pub style: Option<serde_json::Value>,

    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub changed_by: Option<Uuid>,
}

impl Node {
    /// Create an unpositioned node. The tree engine assigns bounds and depth.
    pub fn new(kind: NodeKind, actor: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            parent_id: None,
            lft: 0,
            rgt: 0,
            depth: 0,
            key: None,
            default_locale: None,
            default_meta_id: None,
            collection_type: match kind {
                NodeKind::Collection => Some(DEFAULT_COLLECTION_TYPE.to_string()),
                NodeKind::Category => None,
            },
            style: None,
            created_at: now,
            changed_at: now,
            created_by: actor,
            changed_by: actor,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.lft, self.rgt)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// True when the interval encloses at least one other node
    pub fn has_children(&self) -> bool {
        self.rgt - self.lft > 1
    }

    /// Number of descendants, read from the interval width
    pub fn descendant_count(&self) -> i64 {
        (self.rgt - self.lft - 1) / 2
    }

    /// System collections can be neither moved nor deleted
    pub fn is_locked(&self) -> bool {
        self.kind == NodeKind::Collection
            && self.collection_type.as_deref() == Some(SYSTEM_COLLECTION_TYPE)
    }

    /// Record a change by `actor`
    pub fn touch(&mut self, actor: Option<Uuid>) {
        self.changed_at = Utc::now();
        if actor.is_some() {
            self.changed_by = actor;
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} {} [{}, {}]", self.kind, key, self.lft, self.rgt),
            None => write!(f, "{} {} [{}, {}]", self.kind, self.id, self.lft, self.rgt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_gets_default_type() {
        let node = Node::new(NodeKind::Collection, None);
        assert_eq!(node.collection_type.as_deref(), Some(DEFAULT_COLLECTION_TYPE));
        assert!(!node.is_locked());

        let category = Node::new(NodeKind::Category, None);
        assert!(category.collection_type.is_none());
    }

    #[test]
    fn test_system_collection_is_locked() {
        let mut node = Node::new(NodeKind::Collection, None);
        node.collection_type = Some(SYSTEM_COLLECTION_TYPE.to_string());
        assert!(node.is_locked());
    }

    #[test]
    fn test_interval_helpers() {
        let mut node = Node::new(NodeKind::Category, None);
        node.lft = 2;
        node.rgt = 7;
        assert!(node.has_children());
        assert_eq!(node.descendant_count(), 2);

        node.rgt = 3;
        assert!(!node.has_children());
        assert_eq!(node.descendant_count(), 0);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!("collection".parse::<NodeKind>().unwrap(), NodeKind::Collection);
        assert!("page".parse::<NodeKind>().is_err());
    }
}
