// Request-scoped projections
//
// Nothing here is persisted. Views are built for one explicit locale
// from already-consistent tree state and dropped after the read.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::locale::Meta;
use crate::domain::node::Node;

/// Which descendants `count_descendants_of_kind` counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescendantKind {
    /// Every node strictly inside the subtree
    Node,
    /// Media filed under the node or any of its descendants
    Media,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbEntry {
    pub id: Uuid,
    /// `None` when the ancestor has no content for the locale or its default
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub child_count: u64,
    pub descendant_count: u64,
    /// Media filed directly under the node
    pub media_count: u64,
    /// Media filed under the node or any descendant
    pub subtree_media_count: u64,
}

impl Aggregates {
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: Uuid,
    pub key: Option<String>,
    pub title: Option<String>,
    pub depth: i64,
    pub has_children: bool,
}

/// A node as seen in one locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub node: Node,
    pub locale: String,
    /// Locale the content was actually resolved from (the default on fallback)
    pub resolved_locale: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub meta: Vec<Meta>,
    pub locked: bool,
    pub breadcrumb: Vec<BreadcrumbEntry>,
    pub parent: Option<NodeSummary>,
    pub children: Vec<NodeSummary>,
    pub aggregates: Aggregates,
}
