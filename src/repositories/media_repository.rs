// src/repositories/media_repository.rs

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::row;
use crate::domain::media::MediaItem;
use crate::domain::node::Node;
use crate::error::AppResult;

pub trait MediaRepository: Send + Sync {
    fn insert(&self, conn: &Connection, media: &MediaItem) -> AppResult<()>;
    fn get_by_id(&self, conn: &Connection, id: Uuid) -> AppResult<Option<MediaItem>>;
    fn delete(&self, conn: &Connection, id: Uuid) -> AppResult<usize>;
    fn list_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<MediaItem>>;
    fn count_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<u64>;
    /// Media filed under `node` or any node inside its interval
    fn count_in_subtree(&self, conn: &Connection, node: &Node) -> AppResult<u64>;
    fn delete_for_nodes(&self, conn: &Connection, node_ids: &[Uuid]) -> AppResult<usize>;
}

#[derive(Debug, Default)]
pub struct SqliteMediaRepository;

impl SqliteMediaRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_media(row: &Row) -> Result<MediaItem, rusqlite::Error> {
        Ok(MediaItem {
            id: row::uuid(row, "id")?,
            node_id: row::uuid(row, "node_id")?,
            file_name: row.get("file_name")?,
            created_at: row::timestamp(row, "created_at")?,
            created_by: row::opt_uuid(row, "created_by")?,
        })
    }
}

impl MediaRepository for SqliteMediaRepository {
    fn insert(&self, conn: &Connection, media: &MediaItem) -> AppResult<()> {
        conn.execute(
            "INSERT INTO media (id, node_id, file_name, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                media.id.to_string(),
                media.node_id.to_string(),
                media.file_name,
                media.created_at.to_rfc3339(),
                media.created_by.map(|id| id.to_string()),
            ],
        )?;
        Ok(())
    }

    fn get_by_id(&self, conn: &Connection, id: Uuid) -> AppResult<Option<MediaItem>> {
        let mut stmt = conn.prepare_cached("SELECT * FROM media WHERE id = ?1")?;
        Ok(stmt
            .query_row(params![id.to_string()], Self::row_to_media)
            .optional()?)
    }

    fn delete(&self, conn: &Connection, id: Uuid) -> AppResult<usize> {
        Ok(conn.execute("DELETE FROM media WHERE id = ?1", params![id.to_string()])?)
    }

    fn list_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<MediaItem>> {
        let mut stmt = conn.prepare_cached(
            "SELECT * FROM media WHERE node_id = ?1 ORDER BY created_at, file_name",
        )?;
        let media = stmt
            .query_map(params![node_id.to_string()], Self::row_to_media)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(media)
    }

    fn count_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM media WHERE node_id = ?1",
            params![node_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_in_subtree(&self, conn: &Connection, node: &Node) -> AppResult<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM media m
             JOIN nodes n ON n.id = m.node_id
             WHERE n.kind = ?1 AND n.lft >= ?2 AND n.rgt <= ?3",
            params![node.kind.as_str(), node.lft, node.rgt],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn delete_for_nodes(&self, conn: &Connection, node_ids: &[Uuid]) -> AppResult<usize> {
        let mut stmt = conn.prepare_cached("DELETE FROM media WHERE node_id = ?1")?;
        let mut removed = 0;
        for id in node_ids {
            removed += stmt.execute(params![id.to_string()])?;
        }
        Ok(removed)
    }
}
