// In-memory nested-set forest
//
// Executes the same plans as the SQL tree engine. Used to validate a
// forest read back inside a write transaction, to render trees, and as
// a store-free engine in tests.

use std::collections::HashSet;
use uuid::Uuid;

use super::plan::{plan_delete, plan_insert, plan_move, Anchor, TreeShift};
use crate::domain::node::{validate_node, Node};
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Default)]
pub struct Forest {
    /// Always sorted by `lft`
    nodes: Vec<Node>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(mut nodes: Vec<Node>) -> Self {
        nodes.sort_by_key(|n| n.lft);
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn require(&self, id: Uuid) -> DomainResult<&Node> {
        self.get(id)
            .ok_or_else(|| DomainError::NotFound(format!("node {}", id)))
    }

    /// Largest bound in the forest, 0 when empty
    pub fn max_right(&self) -> i64 {
        self.nodes.iter().map(|n| n.rgt).max().unwrap_or(0)
    }

    pub fn roots(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.depth == 0).collect()
    }

    /// Strictly contained nodes, pre-order
    pub fn descendants(&self, id: Uuid) -> DomainResult<Vec<&Node>> {
        let node = self.require(id)?.interval();
        Ok(self
            .nodes
            .iter()
            .filter(|n| node.contains(&n.interval()))
            .collect())
    }

    /// Strictly containing nodes, root first
    pub fn ancestors(&self, id: Uuid) -> DomainResult<Vec<&Node>> {
        let node = self.require(id)?.interval();
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.interval().contains(&node))
            .collect())
    }

    pub fn children(&self, id: Uuid) -> DomainResult<Vec<&Node>> {
        let depth = self.require(id)?.depth + 1;
        Ok(self
            .descendants(id)?
            .into_iter()
            .filter(|n| n.depth == depth)
            .collect())
    }

    /// Insert `node` as last child of `parent_id` (or as last root), or
    /// directly after `after_sibling_id`.
    pub fn insert_child(
        &mut self,
        mut node: Node,
        parent_id: Option<Uuid>,
        after_sibling_id: Option<Uuid>,
    ) -> DomainResult<Uuid> {
        let slot = {
            let parent = parent_id.map(|id| self.require(id)).transpose()?;
            let sibling = after_sibling_id.map(|id| self.require(id)).transpose()?;
            resolve_anchor(parent, sibling, self.max_right())?.slot()
        };

        self.apply(&plan_insert(&slot));
        node.lft = slot.left;
        node.rgt = slot.left + 1;
        node.depth = slot.depth;
        node.parent_id = slot.parent_id;
        let id = node.id;
        self.nodes.push(node);
        self.nodes.sort_by_key(|n| n.lft);
        Ok(id)
    }

    /// Move a subtree. Returns `false` when the node was already in place.
    pub fn move_subtree(
        &mut self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        after_sibling_id: Option<Uuid>,
    ) -> DomainResult<bool> {
        let node = self.require(id)?.clone();
        if after_sibling_id.is_none() && new_parent_id == node.parent_id {
            return Ok(false);
        }

        let plan = {
            let parent = new_parent_id.map(|pid| self.require(pid)).transpose()?;
            let sibling = after_sibling_id.map(|sid| self.require(sid)).transpose()?;
            if sibling.map(|s| s.id) == Some(id) {
                return Err(DomainError::InvalidPosition(
                    "a node cannot be placed after itself".to_string(),
                ));
            }
            if let Some(parent) = parent {
                if node.interval().encloses(&parent.interval()) {
                    return Err(DomainError::Cycle {
                        node_id: id,
                        target_id: parent.id,
                    });
                }
            }
            let slot = resolve_anchor(parent, sibling, self.max_right())?.slot();
            plan_move(&node, &slot)?
        };

        let Some(plan) = plan else {
            return Ok(false);
        };
        self.apply(&plan.shifts);
        if let Some(moved) = self.nodes.iter_mut().find(|n| n.id == id) {
            moved.parent_id = plan.parent_id;
        }
        self.nodes.sort_by_key(|n| n.lft);
        Ok(true)
    }

    /// Delete a node (and with `cascade`, its subtree). Returns removed ids, pre-order.
    pub fn delete_subtree(&mut self, id: Uuid, cascade: bool) -> DomainResult<Vec<Uuid>> {
        let node = self.require(id)?.clone();
        if !cascade && node.has_children() {
            return Err(DomainError::HasChildren {
                node_id: id,
                descendants: node.descendant_count(),
            });
        }
        let removed: Vec<Uuid> = self
            .nodes
            .iter()
            .filter(|n| node.interval().encloses(&n.interval()))
            .map(|n| n.id)
            .collect();
        self.apply(&plan_delete(&node));
        Ok(removed)
    }

    /// Execute plan steps in order
    pub fn apply(&mut self, shifts: &[TreeShift]) {
        for shift in shifts {
            match *shift {
                TreeShift::Shift { from, delta } => {
                    for n in self.nodes.iter_mut().filter(|n| n.lft > 0) {
                        if n.lft >= from {
                            n.lft += delta;
                        }
                        if n.rgt >= from {
                            n.rgt += delta;
                        }
                    }
                }
                TreeShift::Detach { left, right } => {
                    for n in self
                        .nodes
                        .iter_mut()
                        .filter(|n| n.lft >= left && n.rgt <= right)
                    {
                        n.lft = -n.lft;
                        n.rgt = -n.rgt;
                    }
                }
                TreeShift::Reattach { offset, depth_delta } => {
                    for n in self.nodes.iter_mut().filter(|n| n.lft < 0) {
                        n.lft = -n.lft + offset;
                        n.rgt = -n.rgt + offset;
                        n.depth += depth_delta;
                    }
                }
                TreeShift::Remove { left, right } => {
                    self.nodes.retain(|n| !(n.lft >= left && n.rgt <= right));
                }
            }
        }
        self.nodes.sort_by_key(|n| n.lft);
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_forest(&self.nodes)
    }
}

/// Pick the anchor for an insert or move target.
///
/// A sibling must live under the requested parent; with no parent and no
/// sibling the node becomes the last root.
pub fn resolve_anchor<'a>(
    parent: Option<&'a Node>,
    sibling: Option<&'a Node>,
    forest_right: i64,
) -> DomainResult<Anchor<'a>> {
    match (parent, sibling) {
        (_, Some(sibling)) => {
            if sibling.parent_id != parent.map(|p| p.id) {
                return Err(DomainError::InvalidPosition(format!(
                    "node {} is not a child of {}",
                    sibling.id,
                    parent.map(|p| p.id.to_string()).unwrap_or_else(|| "the root level".to_string())
                )));
            }
            Ok(Anchor::After(sibling))
        }
        (Some(parent), None) => Ok(Anchor::LastChildOf(parent)),
        (None, None) => Ok(Anchor::Root { forest_right }),
    }
}

/// Check the whole-forest invariants in one ordered pass:
/// nesting, depth = ancestor count, parent = innermost enclosing node,
/// distinct bounds, single kind.
pub fn validate_forest(nodes: &[Node]) -> DomainResult<()> {
    let mut ordered: Vec<&Node> = nodes.iter().collect();
    ordered.sort_by_key(|n| n.lft);

    let mut bounds = HashSet::with_capacity(nodes.len() * 2);
    let mut stack: Vec<&Node> = Vec::new();
    let kind = ordered.first().map(|n| n.kind);

    for node in ordered {
        validate_node(node)?;

        if Some(node.kind) != kind {
            return Err(DomainError::InvariantViolation(format!(
                "Node {} of kind {} mixed into a {:?} forest",
                node.id, node.kind, kind
            )));
        }
        if !bounds.insert(node.lft) || !bounds.insert(node.rgt) {
            return Err(DomainError::InvariantViolation(format!(
                "Node {} shares a bound with another node",
                node.id
            )));
        }

        while stack.last().is_some_and(|top| top.rgt < node.lft) {
            stack.pop();
        }

        match stack.last() {
            Some(enclosing) => {
                if node.rgt > enclosing.rgt {
                    return Err(DomainError::InvariantViolation(format!(
                        "Node {} {} partially overlaps {} {}",
                        node.id,
                        node.interval(),
                        enclosing.id,
                        enclosing.interval()
                    )));
                }
                if node.parent_id != Some(enclosing.id) {
                    return Err(DomainError::InvariantViolation(format!(
                        "Node {} has parent {:?} but is enclosed by {}",
                        node.id, node.parent_id, enclosing.id
                    )));
                }
            }
            None => {
                if node.parent_id.is_some() {
                    return Err(DomainError::InvariantViolation(format!(
                        "Node {} has a parent but no enclosing interval",
                        node.id
                    )));
                }
            }
        }

        if node.depth != stack.len() as i64 {
            return Err(DomainError::InvariantViolation(format!(
                "Node {} has depth {} but {} ancestors",
                node.id,
                node.depth,
                stack.len()
            )));
        }

        stack.push(node);
    }

    Ok(())
}
