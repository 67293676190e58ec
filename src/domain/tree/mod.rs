//! Nested-set tree model.
//!
//! Every node of a forest owns an interval `[lft, rgt]`; descendants are
//! exactly the intervals it strictly contains. Mutations are expressed as
//! plans of bound shifts (`plan`) and executed either against the store or
//! against an in-memory `Forest`.

pub mod forest;
pub mod interval;
pub mod plan;

#[cfg(test)]
mod forest_tests;

pub use forest::{resolve_anchor, validate_forest, Forest};
pub use interval::Interval;
pub use plan::{plan_delete, plan_insert, plan_move, Anchor, MovePlan, Slot, TreeShift};
