// src/repositories/meta_repository.rs

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::row;
use crate::domain::locale::Meta;
use crate::domain::DomainError;
use crate::error::AppResult;

pub trait MetaRepository: Send + Sync {
    /// Insert or update; `position` keeps the node's stored order.
    /// An id owned by another node is `NotFound` and writes nothing.
    fn upsert(&self, conn: &Connection, meta: &Meta, position: usize) -> AppResult<()>;
    /// In stored order
    fn list_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<Meta>>;
    fn delete(&self, conn: &Connection, id: Uuid) -> AppResult<usize>;
    fn delete_for_nodes(&self, conn: &Connection, node_ids: &[Uuid]) -> AppResult<usize>;
}

#[derive(Debug, Default)]
pub struct SqliteMetaRepository;

impl SqliteMetaRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_meta(row: &Row) -> Result<Meta, rusqlite::Error> {
        Ok(Meta {
            id: row::uuid(row, "id")?,
            node_id: row::uuid(row, "node_id")?,
            locale: row.get("locale")?,
            key: row.get("meta_key")?,
            value: row.get("value")?,
        })
    }
}

impl MetaRepository for SqliteMetaRepository {
    fn upsert(&self, conn: &Connection, meta: &Meta, position: usize) -> AppResult<()> {
        let written = conn.execute(
            "INSERT INTO meta (id, node_id, locale, meta_key, value, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (id) DO UPDATE SET
                 locale = excluded.locale,
                 meta_key = excluded.meta_key,
                 value = excluded.value,
                 position = excluded.position
             WHERE meta.node_id = excluded.node_id",
            params![
                meta.id.to_string(),
                meta.node_id.to_string(),
                meta.locale,
                meta.key,
                meta.value,
                position as i64,
            ],
        )?;
        if written == 0 {
            return Err(DomainError::NotFound(format!(
                "Meta {} of node {}",
                meta.id, meta.node_id
            ))
            .into());
        }
        Ok(())
    }

    fn list_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<Meta>> {
        let mut stmt =
            conn.prepare_cached("SELECT * FROM meta WHERE node_id = ?1 ORDER BY position")?;
        let meta = stmt
            .query_map(params![node_id.to_string()], Self::row_to_meta)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(meta)
    }

    fn delete(&self, conn: &Connection, id: Uuid) -> AppResult<usize> {
        Ok(conn.execute("DELETE FROM meta WHERE id = ?1", params![id.to_string()])?)
    }

    fn delete_for_nodes(&self, conn: &Connection, node_ids: &[Uuid]) -> AppResult<usize> {
        let mut stmt = conn.prepare_cached("DELETE FROM meta WHERE node_id = ?1")?;
        let mut removed = 0;
        for id in node_ids {
            removed += stmt.execute(params![id.to_string()])?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::create_test_connection;
    use crate::db::initialize_database;
    use crate::domain::node::{Node, NodeKind};
    use crate::error::AppError;
    use crate::repositories::{NodeRepository, SqliteNodeRepository};

    fn root(conn: &Connection, lft: i64) -> Node {
        let mut node = Node::new(NodeKind::Category, None);
        node.lft = lft;
        node.rgt = lft + 1;
        SqliteNodeRepository::new().insert(conn, &node).unwrap();
        node
    }

    #[test]
    fn test_upsert_cannot_take_over_another_nodes_entry() {
        let conn = create_test_connection().unwrap();
        initialize_database(&conn).unwrap();
        let repo = SqliteMetaRepository::new();
        let a = root(&conn, 1);
        let b = root(&conn, 3);

        let original = Meta::new(a.id, None, "color".into(), "red".into());
        repo.upsert(&conn, &original, 0).unwrap();

        let mut hijack = original.clone();
        hijack.node_id = b.id;
        hijack.value = "blue".into();
        let err = repo.upsert(&conn, &hijack, 0).unwrap_err();
        assert!(matches!(err, AppError::Domain(DomainError::NotFound(_))));

        assert_eq!(repo.list_for_node(&conn, a.id).unwrap(), vec![original]);
        assert!(repo.list_for_node(&conn, b.id).unwrap().is_empty());
    }
}
