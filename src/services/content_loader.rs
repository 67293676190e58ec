// src/services/content_loader.rs
//
// Loads a node together with the locale records it owns.

use std::sync::Arc;

use rusqlite::Connection;

use crate::domain::{Node, NodeContent};
use crate::error::AppResult;
use crate::repositories::{MetaRepository, TranslationRepository};

#[derive(Clone)]
pub struct ContentLoader {
    translation_repo: Arc<dyn TranslationRepository>,
    meta_repo: Arc<dyn MetaRepository>,
}

impl ContentLoader {
    pub fn new(
        translation_repo: Arc<dyn TranslationRepository>,
        meta_repo: Arc<dyn MetaRepository>,
    ) -> Self {
        Self {
            translation_repo,
            meta_repo,
        }
    }

    /// Node with translations and meta
    pub fn load(&self, conn: &Connection, node: Node) -> AppResult<NodeContent> {
        let translations = self.translation_repo.list_for_node(conn, node.id)?;
        let meta = self.meta_repo.list_for_node(conn, node.id)?;
        Ok(NodeContent {
            node,
            translations,
            meta,
        })
    }

    /// Node with translations only, enough to resolve titles
    pub fn load_translations(&self, conn: &Connection, node: Node) -> AppResult<NodeContent> {
        let translations = self.translation_repo.list_for_node(conn, node.id)?;
        Ok(NodeContent {
            node,
            translations,
            meta: Vec::new(),
        })
    }
}
