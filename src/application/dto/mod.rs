// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are caller-friendly representations (ids and times as strings)
// - DTOs are simple, serializable structs
// - Conversion FROM domain values only; input DTOs are parsed in commands

use serde::{Deserialize, Serialize};

use crate::domain::{
    Aggregates, BreadcrumbEntry, MediaItem, Meta, Node, NodeSummary, NodeView, Translation,
};

// ============================================================================
// NODE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub kind: String,
    pub parent_id: Option<String>,
    pub lft: i64,
    pub rgt: i64,
    pub depth: i64,
    pub key: Option<String>,
    pub default_locale: Option<String>,
    pub default_meta_id: Option<String>,
    pub collection_type: Option<String>,
    pub style: Option<serde_json::Value>,
    pub locked: bool,
    pub created_at: String,
    pub changed_at: String,
}

impl From<Node> for NodeDto {
    fn from(node: Node) -> Self {
        Self {
            id: node.id.to_string(),
            kind: node.kind.to_string(),
            parent_id: node.parent_id.map(|id| id.to_string()),
            lft: node.lft,
            rgt: node.rgt,
            depth: node.depth,
            locked: node.is_locked(),
            key: node.key,
            default_locale: node.default_locale,
            default_meta_id: node.default_meta_id.map(|id| id.to_string()),
            collection_type: node.collection_type,
            style: node.style,
            created_at: node.created_at.to_rfc3339(),
            changed_at: node.changed_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateNodeDto {
    pub kind: String,
    pub parent_id: Option<String>,
    pub after_sibling_id: Option<String>,
    pub key: Option<String>,
    /// Initial translation; both or neither
    pub locale: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub collection_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveNodeDto {
    pub node_id: String,
    pub parent_id: Option<String>,
    pub after_sibling_id: Option<String>,
}

/// Attribute changes; absent fields stay as they are
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNodeDto {
    pub node_id: String,
    pub key: Option<String>,
    pub collection_type: Option<String>,
    pub default_locale: Option<String>,
}

/// One line of a rendered forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeLineDto {
    pub id: String,
    pub key: Option<String>,
    pub title: Option<String>,
    pub depth: i64,
    pub lft: i64,
    pub rgt: i64,
}

// ============================================================================
// CONTENT DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationDto {
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

impl From<Translation> for TranslationDto {
    fn from(t: Translation) -> Self {
        Self {
            locale: t.locale,
            title: t.title,
            description: t.description,
            keywords: t.keywords,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetContentDto {
    pub node_id: String,
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaDto {
    pub id: String,
    pub locale: Option<String>,
    pub key: String,
    pub value: String,
}

impl From<Meta> for MetaDto {
    fn from(meta: Meta) -> Self {
        Self {
            id: meta.id.to_string(),
            locale: meta.locale,
            key: meta.key,
            value: meta.value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMetaDto {
    pub node_id: String,
    /// Update this entry instead of creating one
    pub id: Option<String>,
    pub locale: Option<String>,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub make_default: bool,
}

// ============================================================================
// MEDIA DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDto {
    pub id: String,
    pub node_id: String,
    pub file_name: String,
    pub created_at: String,
}

impl From<MediaItem> for MediaDto {
    fn from(media: MediaItem) -> Self {
        Self {
            id: media.id.to_string(),
            node_id: media.node_id.to_string(),
            file_name: media.file_name,
            created_at: media.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachMediaDto {
    pub node_id: String,
    pub file_name: String,
}

// ============================================================================
// VIEW DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreadcrumbDto {
    pub id: String,
    pub title: Option<String>,
}

impl From<BreadcrumbEntry> for BreadcrumbDto {
    fn from(entry: BreadcrumbEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            title: entry.title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSummaryDto {
    pub id: String,
    pub key: Option<String>,
    pub title: Option<String>,
    pub has_children: bool,
}

impl From<NodeSummary> for NodeSummaryDto {
    fn from(summary: NodeSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            key: summary.key,
            title: summary.title,
            has_children: summary.has_children,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AggregatesDto {
    pub child_count: u64,
    pub descendant_count: u64,
    pub media_count: u64,
    pub subtree_media_count: u64,
}

impl From<Aggregates> for AggregatesDto {
    fn from(a: Aggregates) -> Self {
        Self {
            child_count: a.child_count,
            descendant_count: a.descendant_count,
            media_count: a.media_count,
            subtree_media_count: a.subtree_media_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeViewDto {
    pub node: NodeDto,
    pub locale: String,
    pub resolved_locale: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub meta: Vec<MetaDto>,
    pub breadcrumb: Vec<BreadcrumbDto>,
    pub parent: Option<NodeSummaryDto>,
    pub children: Vec<NodeSummaryDto>,
    pub aggregates: AggregatesDto,
}

impl From<NodeView> for NodeViewDto {
    fn from(view: NodeView) -> Self {
        Self {
            node: NodeDto::from(view.node),
            locale: view.locale,
            resolved_locale: view.resolved_locale,
            title: view.title,
            description: view.description,
            keywords: view.keywords,
            meta: view.meta.into_iter().map(MetaDto::from).collect(),
            breadcrumb: view.breadcrumb.into_iter().map(BreadcrumbDto::from).collect(),
            parent: view.parent.map(NodeSummaryDto::from),
            children: view.children.into_iter().map(NodeSummaryDto::from).collect(),
            aggregates: AggregatesDto::from(view.aggregates),
        }
    }
}
