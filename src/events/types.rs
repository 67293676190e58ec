// events/types.rs
//
// All domain events in the system.
// Each event represents an immutable fact that has already been committed.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are emitted only after the write transaction commits
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::NodeKind;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// TREE EVENTS
// ============================================================================

/// Emitted when a node is inserted into a forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCreated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub node_id: Uuid,
    pub kind: NodeKind,
    pub parent_id: Option<Uuid>,
    /// Root first, parent last
    pub ancestor_ids: Vec<Uuid>,
}

impl NodeCreated {
    pub fn new(node_id: Uuid, kind: NodeKind, parent_id: Option<Uuid>, ancestor_ids: Vec<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            node_id,
            kind,
            parent_id,
            ancestor_ids,
        }
    }
}

impl DomainEvent for NodeCreated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "NodeCreated" }
}

/// Emitted when a subtree changes position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMoved {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub node_id: Uuid,
    pub kind: NodeKind,
    pub old_parent_id: Option<Uuid>,
    pub new_parent_id: Option<Uuid>,
    pub old_ancestor_ids: Vec<Uuid>,
    pub new_ancestor_ids: Vec<Uuid>,
}

impl NodeMoved {
    pub fn new(
        node_id: Uuid,
        kind: NodeKind,
        old_ancestor_ids: Vec<Uuid>,
        new_ancestor_ids: Vec<Uuid>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            node_id,
            kind,
            old_parent_id: old_ancestor_ids.last().copied(),
            new_parent_id: new_ancestor_ids.last().copied(),
            old_ancestor_ids,
            new_ancestor_ids,
        }
    }
}

impl DomainEvent for NodeMoved {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "NodeMoved" }
}

/// Emitted when a node (and possibly its subtree) is removed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDeleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub node_id: Uuid,
    pub kind: NodeKind,
    /// Every removed node, the deleted node first
    pub removed_ids: Vec<Uuid>,
    pub ancestor_ids: Vec<Uuid>,
}

impl NodeDeleted {
    pub fn new(node_id: Uuid, kind: NodeKind, removed_ids: Vec<Uuid>, ancestor_ids: Vec<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            node_id,
            kind,
            removed_ids,
            ancestor_ids,
        }
    }
}

impl DomainEvent for NodeDeleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "NodeDeleted" }
}

// ============================================================================
// CONTENT EVENTS
// ============================================================================

/// Emitted when a translation is created or replaced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub node_id: Uuid,
    pub locale: String,
}

impl ContentUpdated {
    pub fn new(node_id: Uuid, locale: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            node_id,
            locale,
        }
    }
}

impl DomainEvent for ContentUpdated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ContentUpdated" }
}

/// Emitted when meta entries are written, removed or re-designated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaUpdated {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub node_id: Uuid,
    pub meta_ids: Vec<Uuid>,
}

impl MetaUpdated {
    pub fn new(node_id: Uuid, meta_ids: Vec<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            node_id,
            meta_ids,
        }
    }
}

impl DomainEvent for MetaUpdated {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MetaUpdated" }
}

// ============================================================================
// MEDIA EVENTS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAttached {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub media_id: Uuid,
    pub node_id: Uuid,
    pub ancestor_ids: Vec<Uuid>,
}

impl MediaAttached {
    pub fn new(media_id: Uuid, node_id: Uuid, ancestor_ids: Vec<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            media_id,
            node_id,
            ancestor_ids,
        }
    }
}

impl DomainEvent for MediaAttached {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MediaAttached" }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDetached {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub media_id: Uuid,
    pub node_id: Uuid,
    pub ancestor_ids: Vec<Uuid>,
}

impl MediaDetached {
    pub fn new(media_id: Uuid, node_id: Uuid, ancestor_ids: Vec<Uuid>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            media_id,
            node_id,
            ancestor_ids,
        }
    }
}

impl DomainEvent for MediaDetached {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "MediaDetached" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_derives_parents_from_chains() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let event = NodeMoved::new(Uuid::new_v4(), NodeKind::Category, vec![a, b], vec![c]);
        assert_eq!(event.old_parent_id, Some(b));
        assert_eq!(event.new_parent_id, Some(c));

        let to_root = NodeMoved::new(Uuid::new_v4(), NodeKind::Category, vec![a], Vec::new());
        assert_eq!(to_root.new_parent_id, None);
    }

    #[test]
    fn test_events_serialize() {
        let event = NodeDeleted::new(Uuid::new_v4(), NodeKind::Collection, vec![], vec![]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "collection");
    }
}
