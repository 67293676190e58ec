use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::node::Node;

/// Locale-specific display data of a node. At most one per (node, locale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub node_id: Uuid,
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
}

/// Translation content supplied by a caller, before it is attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTranslation {
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl NewTranslation {
    pub fn new(locale: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            title: title.into(),
            description: None,
            keywords: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

impl PartialEq<NewTranslation> for Translation {
    fn eq(&self, other: &NewTranslation) -> bool {
        self.locale == other.locale
            && self.title == other.title
            && self.description == other.description
            && self.keywords == other.keywords
    }
}

/// Key/value pair attached to a node; `locale == None` applies to every locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub id: Uuid,
    pub node_id: Uuid,
    pub locale: Option<String>,
    pub key: String,
    pub value: String,
}

impl Meta {
    pub fn new(node_id: Uuid, locale: Option<String>, key: String, value: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            locale,
            key,
            value,
        }
    }

    /// Eligible for "current meta" in `locale`
    pub fn applies_to(&self, locale: &str) -> bool {
        self.locale.as_deref().map_or(true, |l| l == locale)
    }
}

/// Meta entry to upsert: without `id` it is created, with a known `id` updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInput {
    pub id: Option<Uuid>,
    pub locale: Option<String>,
    pub key: String,
    pub value: String,
}

/// A node with every locale record it owns
#[derive(Debug, Clone, PartialEq)]
pub struct NodeContent {
    pub node: Node,
    pub translations: Vec<Translation>,
    /// Stored order
    pub meta: Vec<Meta>,
}

impl NodeContent {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            translations: Vec::new(),
            meta: Vec::new(),
        }
    }
}
