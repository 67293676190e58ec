// src/services/tree_engine.rs
//
// Nested-set tree engine
//
// Executes the plans from `domain::tree` against the store. Every method
// takes the connection (in practice the caller's transaction); the engine
// never opens or commits transactions itself, so a failed step leaves
// the rollback to whoever owns the transaction.

use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::domain::tree::{plan_delete, plan_insert, plan_move, resolve_anchor, validate_forest};
use crate::domain::{validate_node, DomainError, Node, NodeKind};
use crate::error::{AppError, AppResult};
use crate::repositories::NodeRepository;

pub struct TreeEngine {
    node_repo: Arc<dyn NodeRepository>,
}

impl TreeEngine {
    pub fn new(node_repo: Arc<dyn NodeRepository>) -> Self {
        Self { node_repo }
    }

    /// Load a node or fail with `NotFound`
    pub fn require(&self, conn: &Connection, id: Uuid) -> AppResult<Node> {
        self.node_repo
            .get_by_id(conn, id)?
            .ok_or_else(|| AppError::Domain(DomainError::NotFound(format!("Node {}", id))))
    }

    /// Load a node of `kind`. A node of the other forest counts as a bad position.
    fn require_in(&self, conn: &Connection, kind: NodeKind, id: Uuid) -> AppResult<Node> {
        let node = self.require(conn, id)?;
        if node.kind != kind {
            return Err(DomainError::InvalidPosition(format!(
                "Node {} is a {}, expected a {}",
                id, node.kind, kind
            ))
            .into());
        }
        Ok(node)
    }

    /// Place an unpositioned node as last child of `parent_id` (last root
    /// when `None`) or directly after `after_sibling_id`.
    pub fn insert_child(
        &self,
        conn: &Connection,
        mut node: Node,
        parent_id: Option<Uuid>,
        after_sibling_id: Option<Uuid>,
    ) -> AppResult<Node> {
        let parent = parent_id
            .map(|id| self.require_in(conn, node.kind, id))
            .transpose()?;
        let sibling = after_sibling_id
            .map(|id| self.require_in(conn, node.kind, id))
            .transpose()?;
        let forest_right = self.node_repo.max_right(conn, node.kind)?;

        let slot = resolve_anchor(parent.as_ref(), sibling.as_ref(), forest_right)?.slot();
        for shift in plan_insert(&slot) {
            self.node_repo.apply_shift(conn, node.kind, &shift)?;
        }

        node.lft = slot.left;
        node.rgt = slot.left + 1;
        node.depth = slot.depth;
        node.parent_id = slot.parent_id;
        validate_node(&node)?;
        self.node_repo.insert(conn, &node)?;

        log::debug!("inserted {} at depth {}", node, node.depth);
        Ok(node)
    }

    /// Move a node with its subtree. Returns the repositioned node, or
    /// `None` when it already was at the requested position. Locked nodes
    /// never move.
    pub fn move_subtree(
        &self,
        conn: &Connection,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        after_sibling_id: Option<Uuid>,
        actor: Option<Uuid>,
    ) -> AppResult<Option<Node>> {
        let node = self.require(conn, id)?;
        if node.is_locked() {
            return Err(DomainError::Locked(id).into());
        }
        if after_sibling_id.is_none() && new_parent_id == node.parent_id {
            return Ok(None);
        }
        if after_sibling_id == Some(id) {
            return Err(DomainError::InvalidPosition(
                "a node cannot be placed after itself".to_string(),
            )
            .into());
        }

        let parent = new_parent_id
            .map(|pid| self.require_in(conn, node.kind, pid))
            .transpose()?;
        let sibling = after_sibling_id
            .map(|sid| self.require_in(conn, node.kind, sid))
            .transpose()?;

        if let Some(parent) = &parent {
            if node.interval().encloses(&parent.interval()) {
                return Err(DomainError::Cycle {
                    node_id: id,
                    target_id: parent.id,
                }
                .into());
            }
        }

        let forest_right = self.node_repo.max_right(conn, node.kind)?;
        let slot = resolve_anchor(parent.as_ref(), sibling.as_ref(), forest_right)?.slot();
        let Some(plan) = plan_move(&node, &slot)? else {
            return Ok(None);
        };

        log::debug!(
            "moving {} to [{}, {}] depth {}",
            node,
            plan.new_left,
            plan.new_right,
            plan.new_depth
        );
        for shift in &plan.shifts {
            self.node_repo.apply_shift(conn, node.kind, shift)?;
        }

        let mut moved = self.require(conn, id)?;
        moved.parent_id = plan.parent_id;
        moved.touch(actor);
        self.node_repo.update_attributes(conn, &moved)?;
        Ok(Some(moved))
    }

    /// Remove a node (with `cascade`, its whole subtree) and close the gap.
    /// Returns the removed ids, the node itself first, then pre-order.
    /// Fails with `Locked` when the node or any removed descendant is locked.
    pub fn delete_subtree(&self, conn: &Connection, id: Uuid, cascade: bool) -> AppResult<Vec<Uuid>> {
        let node = self.require(conn, id)?;
        if node.is_locked() {
            return Err(DomainError::Locked(id).into());
        }
        if !cascade && node.has_children() {
            return Err(DomainError::HasChildren {
                node_id: id,
                descendants: node.descendant_count(),
            }
            .into());
        }

        let descendants = self.node_repo.descendants(conn, &node)?;
        if let Some(locked) = descendants.iter().find(|n| n.is_locked()) {
            return Err(DomainError::Locked(locked.id).into());
        }

        let mut removed = vec![node.id];
        removed.extend(descendants.iter().map(|n| n.id));

        for shift in plan_delete(&node) {
            self.node_repo.apply_shift(conn, node.kind, &shift)?;
        }
        log::debug!("deleted {} ({} nodes)", node, removed.len());
        Ok(removed)
    }

    pub fn get_by_key(&self, conn: &Connection, kind: NodeKind, key: &str) -> AppResult<Option<Node>> {
        self.node_repo.get_by_key(conn, kind, key)
    }

    pub fn list_roots(&self, conn: &Connection, kind: NodeKind) -> AppResult<Vec<Node>> {
        self.node_repo.list_roots(conn, kind)
    }

    /// Whole forest, ordered by `lft`
    pub fn list_forest(&self, conn: &Connection, kind: NodeKind) -> AppResult<Vec<Node>> {
        self.node_repo.list_forest(conn, kind)
    }

    /// Strict descendants in pre-order
    pub fn get_descendants(&self, conn: &Connection, id: Uuid) -> AppResult<Vec<Node>> {
        let node = self.require(conn, id)?;
        self.node_repo.descendants(conn, &node)
    }

    /// Root first, parent last
    pub fn get_ancestors(&self, conn: &Connection, id: Uuid) -> AppResult<Vec<Node>> {
        let node = self.require(conn, id)?;
        self.node_repo.ancestors(conn, &node)
    }

    pub fn get_children(&self, conn: &Connection, id: Uuid) -> AppResult<Vec<Node>> {
        let node = self.require(conn, id)?;
        self.node_repo.children(conn, &node)
    }

    pub fn count_children(&self, conn: &Connection, node: &Node) -> AppResult<u64> {
        self.node_repo.count_children(conn, node)
    }

    /// Re-read a forest and check every interval invariant.
    pub fn verify(&self, conn: &Connection, kind: NodeKind) -> AppResult<()> {
        let nodes = self.node_repo.list_forest(conn, kind)?;
        validate_forest(&nodes)?;
        Ok(())
    }
}
