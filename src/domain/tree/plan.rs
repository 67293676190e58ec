// Nested-set mutation plans
//
// A plan is computed from one consistent snapshot: every bound and width
// it carries is captured before the first step runs. Executors (SQL in
// the tree engine, `Forest` in memory) apply the steps in order.

use uuid::Uuid;

use crate::domain::node::Node;
use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeShift {
    /// For attached nodes: `lft += delta` where `lft >= from`,
    /// `rgt += delta` where `rgt >= from`
    Shift { from: i64, delta: i64 },

    /// Negate the bounds of every node in `[left, right]` so that shifts skip it
    Detach { left: i64, right: i64 },

    /// Detached nodes: bound = -bound + offset, depth += depth_delta
    Reattach { offset: i64, depth_delta: i64 },

    /// Delete every node in `[left, right]`
    Remove { left: i64, right: i64 },
}

/// Where a node is about to be placed, in pre-mutation coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub left: i64,
    pub depth: i64,
    pub parent_id: Option<Uuid>,
}

/// Reference point a slot is derived from
#[derive(Debug, Clone, Copy)]
pub enum Anchor<'a> {
    /// After the last root; `forest_right` is the largest bound of the forest (0 when empty)
    Root { forest_right: i64 },

    /// Appended as the last child of the node
    LastChildOf(&'a Node),

    /// Directly after the node, under the same parent
    After(&'a Node),
}

impl Anchor<'_> {
    pub fn slot(&self) -> Slot {
        match self {
            Anchor::Root { forest_right } => Slot {
                left: forest_right + 1,
                depth: 0,
                parent_id: None,
            },
            Anchor::LastChildOf(parent) => Slot {
                left: parent.rgt,
                depth: parent.depth + 1,
                parent_id: Some(parent.id),
            },
            Anchor::After(sibling) => Slot {
                left: sibling.rgt + 1,
                depth: sibling.depth,
                parent_id: sibling.parent_id,
            },
        }
    }
}

/// Open a two-wide gap at the slot. The new node takes `[slot.left, slot.left + 1]`.
pub fn plan_insert(slot: &Slot) -> Vec<TreeShift> {
    vec![TreeShift::Shift {
        from: slot.left,
        delta: 2,
    }]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub shifts: Vec<TreeShift>,
    /// Post-move bounds of the moved node
    pub new_left: i64,
    pub new_right: i64,
    pub new_depth: i64,
    pub parent_id: Option<Uuid>,
}

/// Plan moving `node` (with its subtree) into `slot`.
///
/// Returns `Ok(None)` when the slot is the node's current position and
/// `Cycle` when the slot lies inside the node's own subtree.
pub fn plan_move(node: &Node, slot: &Slot) -> DomainResult<Option<MovePlan>> {
    let l = node.lft;
    let r = node.rgt;
    let width = r - l + 1;
    let depth_delta = slot.depth - node.depth;

    if slot.left > l && slot.left <= r {
        return Err(DomainError::Cycle {
            node_id: node.id,
            target_id: slot.parent_id.unwrap_or(node.id),
        });
    }

    if (slot.left == l || slot.left == r + 1)
        && depth_delta == 0
        && slot.parent_id == node.parent_id
    {
        return Ok(None);
    }

    // Insertion point once the subtree's own gap has been closed
    let target = if slot.left > r { slot.left - width } else { slot.left };

    Ok(Some(MovePlan {
        shifts: vec![
            TreeShift::Detach { left: l, right: r },
            TreeShift::Shift {
                from: r + 1,
                delta: -width,
            },
            TreeShift::Shift {
                from: target,
                delta: width,
            },
            TreeShift::Reattach {
                offset: target - l,
                depth_delta,
            },
        ],
        new_left: target,
        new_right: target + width - 1,
        new_depth: slot.depth,
        parent_id: slot.parent_id,
    }))
}

/// Remove the node's interval and close the gap it leaves.
pub fn plan_delete(node: &Node) -> Vec<TreeShift> {
    let width = node.rgt - node.lft + 1;
    vec![
        TreeShift::Remove {
            left: node.lft,
            right: node.rgt,
        },
        TreeShift::Shift {
            from: node.rgt + 1,
            delta: -width,
        },
    ]
}
