// src/services/tree_service.rs
//
// Tree mutation façade
//
// The only way to change a forest. Every mutation:
// 1. runs in one IMMEDIATE write transaction
// 2. re-validates the affected forest before commit (when configured)
// 3. emits its events only after the commit succeeded
//
// Any error drops the transaction, so the store is left exactly as it
// was before the call.

use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::db::{with_read_transaction, with_write_transaction, ConnectionPool};
use crate::domain::locale::{self as resolver, NewTranslation, Translation};
use crate::domain::{
    validate_key, validate_media, validate_node, DomainError, MediaItem, Meta, MetaInput, Node,
    NodeContent, NodeKind,
};
use crate::error::{AppError, AppResult};
use crate::events::{
    ContentUpdated, EventBus, MediaAttached, MediaDetached, MetaUpdated, NodeCreated, NodeDeleted,
    NodeMoved,
};
use crate::repositories::{MediaRepository, MetaRepository, NodeRepository, TranslationRepository};
use crate::services::content_loader::ContentLoader;
use crate::services::tree_engine::TreeEngine;

#[derive(Debug, Clone)]
pub struct CreateNodeRequest {
    pub kind: NodeKind,
    pub parent_id: Option<Uuid>,
    pub after_sibling_id: Option<Uuid>,
    pub key: Option<String>,
    pub translation: Option<NewTranslation>,
    /// Collections only; `collection.default` when omitted
    pub collection_type: Option<String>,
    pub style: Option<serde_json::Value>,
    pub actor: Option<Uuid>,
}

impl CreateNodeRequest {
    /// Last root (or last child of `parent_id`) with no content and defaults everywhere else
    pub fn new(kind: NodeKind, parent_id: Option<Uuid>) -> Self {
        Self {
            kind,
            parent_id,
            after_sibling_id: None,
            key: None,
            translation: None,
            collection_type: None,
            style: None,
            actor: None,
        }
    }

    pub fn with_translation(mut self, translation: NewTranslation) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn after(mut self, sibling_id: Uuid) -> Self {
        self.after_sibling_id = Some(sibling_id);
        self
    }
}

#[derive(Debug, Clone)]
pub struct MoveNodeRequest {
    pub node_id: Uuid,
    pub new_parent_id: Option<Uuid>,
    pub after_sibling_id: Option<Uuid>,
    pub actor: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct SetContentRequest {
    pub node_id: Uuid,
    pub translation: NewTranslation,
    pub actor: Option<Uuid>,
}

/// Attribute changes. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct UpdateNodeRequest {
    pub node_id: Uuid,
    pub key: Option<Option<String>>,
    pub collection_type: Option<String>,
    pub style: Option<Option<serde_json::Value>>,
    /// Locale used as translation fallback; `Some(None)` clears it
    pub default_locale: Option<Option<String>>,
    pub actor: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct AttachMediaRequest {
    pub node_id: Uuid,
    pub file_name: String,
    pub actor: Option<Uuid>,
}

pub struct TreeService {
    pool: ConnectionPool,
    verify_after_mutation: bool,
    engine: Arc<TreeEngine>,
    content: ContentLoader,
    node_repo: Arc<dyn NodeRepository>,
    translation_repo: Arc<dyn TranslationRepository>,
    meta_repo: Arc<dyn MetaRepository>,
    media_repo: Arc<dyn MediaRepository>,
    event_bus: Arc<EventBus>,
}

impl TreeService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: ConnectionPool,
        config: &StoreConfig,
        engine: Arc<TreeEngine>,
        node_repo: Arc<dyn NodeRepository>,
        translation_repo: Arc<dyn TranslationRepository>,
        meta_repo: Arc<dyn MetaRepository>,
        media_repo: Arc<dyn MediaRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            verify_after_mutation: config.verify_after_mutation,
            engine,
            content: ContentLoader::new(Arc::clone(&translation_repo), Arc::clone(&meta_repo)),
            node_repo,
            translation_repo,
            meta_repo,
            media_repo,
            event_bus,
        }
    }

    // ========================================================================
    // TREE MUTATIONS
    // ========================================================================

    /// Insert a node and its initial translation atomically.
    pub fn create_node(&self, request: CreateNodeRequest) -> AppResult<Node> {
        validate_key(request.key.as_deref())?;

        let (node, ancestor_ids) = with_write_transaction(&self.pool, |tx| {
            if let Some(key) = &request.key {
                self.ensure_key_free(tx, request.kind, key, None)?;
            }

            let mut node = Node::new(request.kind, request.actor);
            node.key = request.key.clone();
            node.style = request.style.clone();
            if let Some(collection_type) = &request.collection_type {
                node.collection_type = Some(collection_type.clone());
            }

            let node = self.engine.insert_child(
                tx,
                node,
                request.parent_id,
                request.after_sibling_id,
            )?;

            let node = match &request.translation {
                Some(translation) => {
                    let mut content = NodeContent::new(node);
                    let written = resolver::apply_translation(&mut content, translation.clone())?.clone();
                    self.translation_repo.upsert(tx, &written)?;
                    self.node_repo.update_attributes(tx, &content.node)?;
                    content.node
                }
                None => node,
            };

            self.verify(tx, node.kind)?;
            let ancestor_ids = self.ancestor_ids(tx, node.id)?;
            Ok((node, ancestor_ids))
        })?;

        log::info!("created {}", node);
        self.event_bus
            .emit(NodeCreated::new(node.id, node.kind, node.parent_id, ancestor_ids));
        Ok(node)
    }

    /// Move a subtree. Returns the node at its (possibly unchanged) position.
    pub fn move_node(&self, request: MoveNodeRequest) -> AppResult<Node> {
        let outcome = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, request.node_id)?;
            let old_ancestors = self.ancestor_ids(tx, node.id)?;
            let moved = self.engine.move_subtree(
                tx,
                node.id,
                request.new_parent_id,
                request.after_sibling_id,
                request.actor,
            )?;

            match moved {
                Some(moved) => {
                    self.verify(tx, moved.kind)?;
                    let new_ancestors = self.ancestor_ids(tx, moved.id)?;
                    Ok((moved, Some((old_ancestors, new_ancestors))))
                }
                None => Ok((node, None)),
            }
        })?;

        let (node, chains) = outcome;
        match chains {
            Some((old_ancestors, new_ancestors)) => {
                log::info!("moved {}", node);
                self.event_bus
                    .emit(NodeMoved::new(node.id, node.kind, old_ancestors, new_ancestors));
            }
            None => log::debug!("{} already in place", node),
        }
        Ok(node)
    }

    /// Delete a node (with `cascade`, its subtree) together with every
    /// translation, meta entry and media item the removed nodes own.
    /// Returns the removed node ids.
    pub fn delete_node(&self, node_id: Uuid, cascade: bool) -> AppResult<Vec<Uuid>> {
        let (node, removed, ancestor_ids) = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            let ancestor_ids = self.ancestor_ids(tx, node_id)?;
            let removed = self.engine.delete_subtree(tx, node_id, cascade)?;

            let translations = self.translation_repo.delete_for_nodes(tx, &removed)?;
            let meta = self.meta_repo.delete_for_nodes(tx, &removed)?;
            let media = self.media_repo.delete_for_nodes(tx, &removed)?;
            log::debug!(
                "removed {} translations, {} meta entries, {} media items",
                translations,
                meta,
                media
            );

            self.verify(tx, node.kind)?;
            Ok((node, removed, ancestor_ids))
        })?;

        log::info!("deleted {} ({} nodes)", node, removed.len());
        self.event_bus.emit(NodeDeleted::new(
            node.id,
            node.kind,
            removed.clone(),
            ancestor_ids,
        ));
        Ok(removed)
    }

    /// Change key, collection type, style or default locale.
    pub fn update_node(&self, request: UpdateNodeRequest) -> AppResult<Node> {
        if let Some(key) = &request.key {
            validate_key(key.as_deref())?;
        }
        if let Some(Some(locale)) = &request.default_locale {
            resolver::validate_locale(locale)?;
        }

        let node = with_write_transaction(&self.pool, |tx| {
            let mut node = self.engine.require(tx, request.node_id)?;

            if let Some(key) = &request.key {
                if let Some(key) = key {
                    self.ensure_key_free(tx, node.kind, key, Some(node.id))?;
                }
                node.key = key.clone();
            }
            if let Some(collection_type) = &request.collection_type {
                node.collection_type = Some(collection_type.clone());
            }
            if let Some(style) = &request.style {
                node.style = style.clone();
            }
            if let Some(default_locale) = &request.default_locale {
                node.default_locale = default_locale.clone();
            }

            node.touch(request.actor);
            validate_node(&node)?;
            self.node_repo.update_attributes(tx, &node)?;
            Ok(node)
        })?;

        log::info!("updated {}", node);
        Ok(node)
    }

    // ========================================================================
    // CONTENT
    // ========================================================================

    /// Create or replace the translation for one locale.
    pub fn set_content(&self, request: SetContentRequest) -> AppResult<Translation> {
        let locale = request.translation.locale.clone();

        let translation = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, request.node_id)?;
            let mut content = self.content.load(tx, node)?;

            let written = resolver::apply_translation(&mut content, request.translation.clone())?.clone();
            self.translation_repo.upsert(tx, &written)?;

            content.node.touch(request.actor);
            self.node_repo.update_attributes(tx, &content.node)?;
            Ok(written)
        })?;

        log::info!("set {} content of node {}", locale, request.node_id);
        self.event_bus
            .emit(ContentUpdated::new(request.node_id, locale));
        Ok(translation)
    }

    /// Upsert meta entries by id. Returns the node's meta in stored order.
    pub fn set_meta(
        &self,
        node_id: Uuid,
        entries: Vec<MetaInput>,
        actor: Option<Uuid>,
    ) -> AppResult<Vec<Meta>> {
        let (meta, touched) = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            let mut content = self.content.load(tx, node)?;

            let touched = resolver::apply_meta(&mut content, entries)?;
            for (position, meta) in content.meta.iter().enumerate() {
                if touched.contains(&meta.id) {
                    self.meta_repo.upsert(tx, meta, position)?;
                }
            }

            content.node.touch(actor);
            self.node_repo.update_attributes(tx, &content.node)?;
            Ok((content.meta, touched))
        })?;

        self.event_bus.emit(MetaUpdated::new(node_id, touched));
        Ok(meta)
    }

    /// Remove one meta entry; clears the default designation if it pointed there.
    pub fn remove_meta(&self, node_id: Uuid, meta_id: Uuid, actor: Option<Uuid>) -> AppResult<()> {
        with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            let mut content = self.content.load(tx, node)?;
            require_meta(&content, meta_id)?;

            self.meta_repo.delete(tx, meta_id)?;
            if content.node.default_meta_id == Some(meta_id) {
                content.node.default_meta_id = None;
            }
            content.node.touch(actor);
            self.node_repo.update_attributes(tx, &content.node)?;
            Ok(())
        })?;

        self.event_bus.emit(MetaUpdated::new(node_id, vec![meta_id]));
        Ok(())
    }

    /// Designate (or with `None`, clear) the meta entry used as fallback.
    pub fn set_default_meta(
        &self,
        node_id: Uuid,
        meta_id: Option<Uuid>,
        actor: Option<Uuid>,
    ) -> AppResult<Node> {
        let node = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            let mut content = self.content.load(tx, node)?;
            if let Some(meta_id) = meta_id {
                require_meta(&content, meta_id)?;
            }

            content.node.default_meta_id = meta_id;
            content.node.touch(actor);
            self.node_repo.update_attributes(tx, &content.node)?;
            Ok(content.node)
        })?;

        self.event_bus
            .emit(MetaUpdated::new(node_id, meta_id.into_iter().collect()));
        Ok(node)
    }

    /// Meta entry for exactly `locale`, created empty when the node has none.
    pub fn resolve_or_create_meta(
        &self,
        node_id: Uuid,
        locale: &str,
        actor: Option<Uuid>,
    ) -> AppResult<Meta> {
        resolver::validate_locale(locale)?;

        let (meta, created) = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            let mut content = self.content.load(tx, node)?;
            let before = content.meta.len();

            let meta = resolver::resolve_or_create_meta(&mut content, locale).clone();
            let created = content.meta.len() > before;
            if created {
                self.meta_repo.upsert(tx, &meta, before)?;
                content.node.touch(actor);
                self.node_repo.update_attributes(tx, &content.node)?;
            }
            Ok((meta, created))
        })?;

        if created {
            self.event_bus.emit(MetaUpdated::new(node_id, vec![meta.id]));
        }
        Ok(meta)
    }

    // ========================================================================
    // MEDIA
    // ========================================================================

    /// File a media item under a collection.
    pub fn attach_media(&self, request: AttachMediaRequest) -> AppResult<MediaItem> {
        let media = MediaItem::new(request.node_id, request.file_name.trim().to_string(), request.actor);
        validate_media(&media)?;

        let ancestor_ids = with_write_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, request.node_id)?;
            if node.kind != NodeKind::Collection {
                return Err(DomainError::InvalidPosition(format!(
                    "media can only be filed under a collection, {} is a {}",
                    node.id, node.kind
                ))
                .into());
            }
            self.media_repo.insert(tx, &media)?;
            self.ancestor_ids(tx, node.id)
        })?;

        log::info!("attached '{}' to {}", media.file_name, media.node_id);
        self.event_bus
            .emit(MediaAttached::new(media.id, media.node_id, ancestor_ids));
        Ok(media)
    }

    pub fn detach_media(&self, media_id: Uuid) -> AppResult<()> {
        let (media, ancestor_ids) = with_write_transaction(&self.pool, |tx| {
            let media = self.media_repo.get_by_id(tx, media_id)?.ok_or_else(|| {
                AppError::Domain(DomainError::NotFound(format!("Media {}", media_id)))
            })?;
            self.media_repo.delete(tx, media_id)?;
            let ancestor_ids = self.ancestor_ids(tx, media.node_id)?;
            Ok((media, ancestor_ids))
        })?;

        log::info!("detached '{}' from {}", media.file_name, media.node_id);
        self.event_bus
            .emit(MediaDetached::new(media.id, media.node_id, ancestor_ids));
        Ok(())
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn get_node(&self, node_id: Uuid) -> AppResult<Node> {
        with_read_transaction(&self.pool, |tx| self.engine.require(tx, node_id))
    }

    pub fn get_node_by_key(&self, kind: NodeKind, key: &str) -> AppResult<Option<Node>> {
        with_read_transaction(&self.pool, |tx| self.engine.get_by_key(tx, kind, key))
    }

    pub fn list_roots(&self, kind: NodeKind) -> AppResult<Vec<Node>> {
        with_read_transaction(&self.pool, |tx| self.engine.list_roots(tx, kind))
    }

    /// Every node of a forest in pre-order
    pub fn list_forest(&self, kind: NodeKind) -> AppResult<Vec<Node>> {
        with_read_transaction(&self.pool, |tx| self.engine.list_forest(tx, kind))
    }

    pub fn get_children(&self, node_id: Uuid) -> AppResult<Vec<Node>> {
        with_read_transaction(&self.pool, |tx| self.engine.get_children(tx, node_id))
    }

    pub fn get_ancestors(&self, node_id: Uuid) -> AppResult<Vec<Node>> {
        with_read_transaction(&self.pool, |tx| self.engine.get_ancestors(tx, node_id))
    }

    pub fn get_descendants(&self, node_id: Uuid) -> AppResult<Vec<Node>> {
        with_read_transaction(&self.pool, |tx| self.engine.get_descendants(tx, node_id))
    }

    /// Node with all of its translations and meta
    pub fn get_content(&self, node_id: Uuid) -> AppResult<NodeContent> {
        with_read_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            self.content.load(tx, node)
        })
    }

    /// `None` means "no content for this locale", not an error
    pub fn resolve_translation(
        &self,
        node_id: Uuid,
        locale: &str,
        with_default: bool,
    ) -> AppResult<Option<Translation>> {
        let content = self.get_content(node_id)?;
        Ok(resolver::resolve_translation(&content, locale, with_default).cloned())
    }

    /// Read-only: exact locale, then the default meta
    pub fn resolve_meta(&self, node_id: Uuid, locale: &str) -> AppResult<Option<Meta>> {
        let content = self.get_content(node_id)?;
        Ok(resolver::resolve_meta(&content, locale).cloned())
    }

    pub fn current_meta(&self, node_id: Uuid, locale: &str) -> AppResult<Vec<Meta>> {
        let content = self.get_content(node_id)?;
        Ok(resolver::current_meta(&content, locale)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn list_media(&self, node_id: Uuid) -> AppResult<Vec<MediaItem>> {
        with_read_transaction(&self.pool, |tx| {
            self.engine.require(tx, node_id)?;
            self.media_repo.list_for_node(tx, node_id)
        })
    }

    /// Check a whole forest outside of any mutation
    pub fn verify_forest(&self, kind: NodeKind) -> AppResult<()> {
        with_read_transaction(&self.pool, |tx| self.engine.verify(tx, kind))
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn verify(&self, conn: &Connection, kind: NodeKind) -> AppResult<()> {
        if self.verify_after_mutation {
            self.engine.verify(conn, kind)?;
        }
        Ok(())
    }

    fn ancestor_ids(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .engine
            .get_ancestors(conn, node_id)?
            .into_iter()
            .map(|n| n.id)
            .collect())
    }

    fn ensure_key_free(
        &self,
        conn: &Connection,
        kind: NodeKind,
        key: &str,
        owner: Option<Uuid>,
    ) -> AppResult<()> {
        match self.engine.get_by_key(conn, kind, key)? {
            Some(existing) if Some(existing.id) != owner => {
                Err(DomainError::DuplicateKey(key.to_string()).into())
            }
            _ => Ok(()),
        }
    }
}

fn require_meta(content: &NodeContent, meta_id: Uuid) -> AppResult<()> {
    if content.meta.iter().any(|m| m.id == meta_id) {
        Ok(())
    } else {
        Err(DomainError::NotFound(format!(
            "Meta {} on node {}",
            meta_id, content.node.id
        ))
        .into())
    }
}
