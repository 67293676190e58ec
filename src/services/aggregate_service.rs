// src/services/aggregate_service.rs
//
// Breadcrumbs, counters and per-request views
//
// Read-only. Everything here is derived from committed tree state and
// returned as view values; nothing is written back.
//
// Aggregates are cached per node. Mutation events name the ancestor
// chains they touched and `invalidate` drops those entries. A read that
// started before an invalidation never repopulates the cache with its
// (possibly stale) result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{with_read_transaction, ConnectionPool};
use crate::domain::locale::{current_meta, keywords, resolve_translation};
use crate::domain::{
    Aggregates, BreadcrumbEntry, DescendantKind, Node, NodeContent, NodeSummary, NodeView,
};
use crate::error::AppResult;
use crate::repositories::MediaRepository;
use crate::services::content_loader::ContentLoader;
use crate::services::tree_engine::TreeEngine;

#[derive(Default)]
struct AggregateCache {
    entries: HashMap<Uuid, Aggregates>,
    generation: u64,
}

pub struct AggregateService {
    pool: ConnectionPool,
    engine: Arc<TreeEngine>,
    content: ContentLoader,
    media_repo: Arc<dyn MediaRepository>,
    cache: Mutex<AggregateCache>,
}

impl AggregateService {
    pub fn new(
        pool: ConnectionPool,
        engine: Arc<TreeEngine>,
        content: ContentLoader,
        media_repo: Arc<dyn MediaRepository>,
    ) -> Self {
        Self {
            pool,
            engine,
            content,
            media_repo,
            cache: Mutex::new(AggregateCache::default()),
        }
    }

    /// Ancestors of the node, root first and excluding the node, titled in `locale`
    pub fn build_breadcrumb(&self, node_id: Uuid, locale: &str) -> AppResult<Vec<BreadcrumbEntry>> {
        with_read_transaction(&self.pool, |tx| {
            let ancestors = self.engine.get_ancestors(tx, node_id)?;
            self.breadcrumb_of(tx, ancestors, locale)
        })
    }

    pub fn count_direct_children(&self, node_id: Uuid) -> AppResult<u64> {
        with_read_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            self.engine.count_children(tx, &node)
        })
    }

    pub fn count_descendants_of_kind(&self, node_id: Uuid, kind: DescendantKind) -> AppResult<u64> {
        with_read_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            match kind {
                DescendantKind::Node => Ok(node.descendant_count() as u64),
                DescendantKind::Media => self.media_repo.count_in_subtree(tx, &node),
            }
        })
    }

    /// All counters of a node, served from the cache when possible
    pub fn aggregates(&self, node_id: Uuid) -> AppResult<Aggregates> {
        let generation = {
            let cache = self.lock_cache();
            if let Some(cached) = cache.entries.get(&node_id) {
                return Ok(*cached);
            }
            cache.generation
        };

        let aggregates = with_read_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            self.compute_aggregates(tx, &node)
        })?;

        let mut cache = self.lock_cache();
        if cache.generation == generation {
            cache.entries.insert(node_id, aggregates);
        }
        Ok(aggregates)
    }

    /// Drop cached aggregates for the given nodes
    pub fn invalidate<I>(&self, node_ids: I)
    where
        I: IntoIterator<Item = Uuid>,
    {
        let mut cache = self.lock_cache();
        cache.generation += 1;
        let mut dropped = 0;
        for id in node_ids {
            if cache.entries.remove(&id).is_some() {
                dropped += 1;
            }
        }
        log::debug!("aggregate cache: dropped {} entries", dropped);
    }

    pub fn is_cached(&self, node_id: Uuid) -> bool {
        self.lock_cache().entries.contains_key(&node_id)
    }

    /// Everything a caller needs to display one node in one locale
    pub fn view(&self, node_id: Uuid, locale: &str) -> AppResult<NodeView> {
        let aggregates = self.aggregates(node_id)?;

        with_read_transaction(&self.pool, |tx| {
            let node = self.engine.require(tx, node_id)?;
            let ancestors = self.engine.get_ancestors(tx, node_id)?;
            let children = self.engine.get_children(tx, node_id)?;

            let parent = match ancestors.last() {
                Some(parent) => Some(self.summary_of(tx, parent.clone(), locale)?),
                None => None,
            };
            let children = children
                .into_iter()
                .map(|child| self.summary_of(tx, child, locale))
                .collect::<AppResult<Vec<_>>>()?;
            let breadcrumb = self.breadcrumb_of(tx, ancestors, locale)?;

            let content = self.content.load(tx, node)?;
            let translation = resolve_translation(&content, locale, true);

            Ok(NodeView {
                locale: locale.to_string(),
                resolved_locale: translation.map(|t| t.locale.clone()),
                title: translation.map(|t| t.title.clone()),
                description: translation.and_then(|t| t.description.clone()),
                keywords: keywords(&content, locale).to_vec(),
                meta: current_meta(&content, locale).into_iter().cloned().collect(),
                locked: content.node.is_locked(),
                breadcrumb,
                parent,
                children,
                aggregates,
                node: content.node,
            })
        })
    }

    fn compute_aggregates(&self, conn: &Connection, node: &Node) -> AppResult<Aggregates> {
        Ok(Aggregates {
            child_count: self.engine.count_children(conn, node)?,
            descendant_count: node.descendant_count() as u64,
            media_count: self.media_repo.count_for_node(conn, node.id)?,
            subtree_media_count: self.media_repo.count_in_subtree(conn, node)?,
        })
    }

    fn breadcrumb_of(
        &self,
        conn: &Connection,
        ancestors: Vec<Node>,
        locale: &str,
    ) -> AppResult<Vec<BreadcrumbEntry>> {
        ancestors
            .into_iter()
            .map(|ancestor| {
                let content = self.content.load_translations(conn, ancestor)?;
                Ok(BreadcrumbEntry {
                    id: content.node.id,
                    title: title_of(&content, locale),
                })
            })
            .collect()
    }

    fn summary_of(&self, conn: &Connection, node: Node, locale: &str) -> AppResult<NodeSummary> {
        let content = self.content.load_translations(conn, node)?;
        Ok(NodeSummary {
            id: content.node.id,
            key: content.node.key.clone(),
            title: title_of(&content, locale),
            depth: content.node.depth,
            has_children: content.node.has_children(),
        })
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, AggregateCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn title_of(content: &NodeContent, locale: &str) -> Option<String> {
    resolve_translation(content, locale, true).map(|t| t.title.clone())
}
