// src/repositories/node_repository.rs
//
// Nested-set node storage. Every method takes the connection (usually a
// transaction) it runs on, so a mutation and its reads share one
// transaction.

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::row;
use crate::domain::node::{Node, NodeKind};
use crate::domain::tree::TreeShift;
use crate::error::AppResult;

pub trait NodeRepository: Send + Sync {
    fn insert(&self, conn: &Connection, node: &Node) -> AppResult<()>;
    /// Writes every column except the nested-set bounds, which only move through shifts
    fn update_attributes(&self, conn: &Connection, node: &Node) -> AppResult<()>;
    fn get_by_id(&self, conn: &Connection, id: Uuid) -> AppResult<Option<Node>>;
    fn get_by_key(&self, conn: &Connection, kind: NodeKind, key: &str) -> AppResult<Option<Node>>;
    /// Largest bound of the forest, 0 when empty
    fn max_right(&self, conn: &Connection, kind: NodeKind) -> AppResult<i64>;
    fn list_forest(&self, conn: &Connection, kind: NodeKind) -> AppResult<Vec<Node>>;
    fn list_roots(&self, conn: &Connection, kind: NodeKind) -> AppResult<Vec<Node>>;
    fn descendants(&self, conn: &Connection, node: &Node) -> AppResult<Vec<Node>>;
    fn ancestors(&self, conn: &Connection, node: &Node) -> AppResult<Vec<Node>>;
    fn children(&self, conn: &Connection, node: &Node) -> AppResult<Vec<Node>>;
    fn count_children(&self, conn: &Connection, node: &Node) -> AppResult<u64>;
    /// Execute one plan step; returns the number of rows touched
    fn apply_shift(&self, conn: &Connection, kind: NodeKind, shift: &TreeShift) -> AppResult<usize>;
}

#[derive(Debug, Default)]
pub struct SqliteNodeRepository;

impl SqliteNodeRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_node(row: &Row) -> Result<Node, rusqlite::Error> {
        let kind_raw: String = row.get("kind")?;
        let kind = kind_raw.parse::<NodeKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())),
            )
        })?;

        Ok(Node {
            id: row::uuid(row, "id")?,
            kind,
            parent_id: row::opt_uuid(row, "parent_id")?,
            lft: row.get("lft")?,
            rgt: row.get("rgt")?,
            depth: row.get("depth")?,
            key: row.get("node_key")?,
            default_locale: row.get("default_locale")?,
            default_meta_id: row::opt_uuid(row, "default_meta_id")?,
            collection_type: row.get("collection_type")?,
            style: row::opt_json(row, "style")?,
            created_at: row::timestamp(row, "created_at")?,
            changed_at: row::timestamp(row, "changed_at")?,
            created_by: row::opt_uuid(row, "created_by")?,
            changed_by: row::opt_uuid(row, "changed_by")?,
        })
    }

    fn query_nodes<P: rusqlite::Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> AppResult<Vec<Node>> {
        let mut stmt = conn.prepare_cached(sql)?;
        let nodes = stmt
            .query_map(params, Self::row_to_node)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nodes)
    }

    fn style_text(node: &Node) -> AppResult<Option<String>> {
        Ok(node.style.as_ref().map(serde_json::to_string).transpose()?)
    }
}

impl NodeRepository for SqliteNodeRepository {
    fn insert(&self, conn: &Connection, node: &Node) -> AppResult<()> {
        conn.execute(
            "INSERT INTO nodes (id, kind, parent_id, lft, rgt, depth, node_key, default_locale,
                                default_meta_id, collection_type, style, created_at, changed_at,
                                created_by, changed_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                node.id.to_string(),
                node.kind.as_str(),
                node.parent_id.map(|id| id.to_string()),
                node.lft,
                node.rgt,
                node.depth,
                node.key,
                node.default_locale,
                node.default_meta_id.map(|id| id.to_string()),
                node.collection_type,
                Self::style_text(node)?,
                node.created_at.to_rfc3339(),
                node.changed_at.to_rfc3339(),
                node.created_by.map(|id| id.to_string()),
                node.changed_by.map(|id| id.to_string()),
            ],
        )?;
        Ok(())
    }

    fn update_attributes(&self, conn: &Connection, node: &Node) -> AppResult<()> {
        conn.execute(
            "UPDATE nodes SET parent_id = ?2, node_key = ?3, default_locale = ?4,
                              default_meta_id = ?5, collection_type = ?6, style = ?7,
                              changed_at = ?8, changed_by = ?9
             WHERE id = ?1",
            params![
                node.id.to_string(),
                node.parent_id.map(|id| id.to_string()),
                node.key,
                node.default_locale,
                node.default_meta_id.map(|id| id.to_string()),
                node.collection_type,
                Self::style_text(node)?,
                node.changed_at.to_rfc3339(),
                node.changed_by.map(|id| id.to_string()),
            ],
        )?;
        Ok(())
    }

    fn get_by_id(&self, conn: &Connection, id: Uuid) -> AppResult<Option<Node>> {
        let mut stmt = conn.prepare_cached("SELECT * FROM nodes WHERE id = ?1")?;
        Ok(stmt
            .query_row(params![id.to_string()], Self::row_to_node)
            .optional()?)
    }

    fn get_by_key(&self, conn: &Connection, kind: NodeKind, key: &str) -> AppResult<Option<Node>> {
        let mut stmt =
            conn.prepare_cached("SELECT * FROM nodes WHERE kind = ?1 AND node_key = ?2")?;
        Ok(stmt
            .query_row(params![kind.as_str(), key], Self::row_to_node)
            .optional()?)
    }

    fn max_right(&self, conn: &Connection, kind: NodeKind) -> AppResult<i64> {
        let max: Option<i64> = conn.query_row(
            "SELECT MAX(rgt) FROM nodes WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0))
    }

    fn list_forest(&self, conn: &Connection, kind: NodeKind) -> AppResult<Vec<Node>> {
        Self::query_nodes(
            conn,
            "SELECT * FROM nodes WHERE kind = ?1 ORDER BY lft",
            params![kind.as_str()],
        )
    }

    fn list_roots(&self, conn: &Connection, kind: NodeKind) -> AppResult<Vec<Node>> {
        Self::query_nodes(
            conn,
            "SELECT * FROM nodes WHERE kind = ?1 AND depth = 0 ORDER BY lft",
            params![kind.as_str()],
        )
    }

    fn descendants(&self, conn: &Connection, node: &Node) -> AppResult<Vec<Node>> {
        Self::query_nodes(
            conn,
            "SELECT * FROM nodes WHERE kind = ?1 AND lft > ?2 AND rgt < ?3 ORDER BY lft",
            params![node.kind.as_str(), node.lft, node.rgt],
        )
    }

    fn ancestors(&self, conn: &Connection, node: &Node) -> AppResult<Vec<Node>> {
        Self::query_nodes(
            conn,
            "SELECT * FROM nodes WHERE kind = ?1 AND lft < ?2 AND rgt > ?3 ORDER BY lft",
            params![node.kind.as_str(), node.lft, node.rgt],
        )
    }

    fn children(&self, conn: &Connection, node: &Node) -> AppResult<Vec<Node>> {
        Self::query_nodes(
            conn,
            "SELECT * FROM nodes
             WHERE kind = ?1 AND lft > ?2 AND rgt < ?3 AND depth = ?4
             ORDER BY lft",
            params![node.kind.as_str(), node.lft, node.rgt, node.depth + 1],
        )
    }

    fn count_children(&self, conn: &Connection, node: &Node) -> AppResult<u64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM nodes
             WHERE kind = ?1 AND lft > ?2 AND rgt < ?3 AND depth = ?4",
            params![node.kind.as_str(), node.lft, node.rgt, node.depth + 1],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn apply_shift(&self, conn: &Connection, kind: NodeKind, shift: &TreeShift) -> AppResult<usize> {
        let kind = kind.as_str();
        let touched = match *shift {
            TreeShift::Shift { from, delta } => conn.execute(
                "UPDATE nodes
                 SET lft = CASE WHEN lft >= ?2 THEN lft + ?3 ELSE lft END,
                     rgt = CASE WHEN rgt >= ?2 THEN rgt + ?3 ELSE rgt END
                 WHERE kind = ?1 AND lft > 0 AND rgt >= ?2",
                params![kind, from, delta],
            )?,
            TreeShift::Detach { left, right } => conn.execute(
                "UPDATE nodes SET lft = -lft, rgt = -rgt
                 WHERE kind = ?1 AND lft >= ?2 AND rgt <= ?3",
                params![kind, left, right],
            )?,
            TreeShift::Reattach { offset, depth_delta } => conn.execute(
                "UPDATE nodes SET lft = -lft + ?2, rgt = -rgt + ?2, depth = depth + ?3
                 WHERE kind = ?1 AND lft < 0",
                params![kind, offset, depth_delta],
            )?,
            TreeShift::Remove { left, right } => conn.execute(
                "DELETE FROM nodes WHERE kind = ?1 AND lft >= ?2 AND rgt <= ?3",
                params![kind, left, right],
            )?,
        };
        log::debug!("{:?} on {} forest touched {} rows", shift, kind, touched);
        Ok(touched)
    }
}
