// src/repositories/translation_repository.rs

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::row;
use crate::domain::locale::Translation;
use crate::error::AppResult;

pub trait TranslationRepository: Send + Sync {
    /// Insert, or replace the content for an existing (node, locale)
    fn upsert(&self, conn: &Connection, translation: &Translation) -> AppResult<()>;
    fn list_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<Translation>>;
    fn delete_for_nodes(&self, conn: &Connection, node_ids: &[Uuid]) -> AppResult<usize>;
}

#[derive(Debug, Default)]
pub struct SqliteTranslationRepository;

impl SqliteTranslationRepository {
    pub fn new() -> Self {
        Self
    }

    fn row_to_translation(row: &Row) -> Result<Translation, rusqlite::Error> {
        Ok(Translation {
            node_id: row::uuid(row, "node_id")?,
            locale: row.get("locale")?,
            title: row.get("title")?,
            description: row.get("description")?,
            keywords: row::json(row, "keywords")?,
        })
    }
}

impl TranslationRepository for SqliteTranslationRepository {
    fn upsert(&self, conn: &Connection, translation: &Translation) -> AppResult<()> {
        conn.execute(
            "INSERT INTO translations (node_id, locale, title, description, keywords)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (node_id, locale) DO UPDATE SET
                 title = excluded.title,
                 description = excluded.description,
                 keywords = excluded.keywords",
            params![
                translation.node_id.to_string(),
                translation.locale,
                translation.title,
                translation.description,
                serde_json::to_string(&translation.keywords)?,
            ],
        )?;
        Ok(())
    }

    fn list_for_node(&self, conn: &Connection, node_id: Uuid) -> AppResult<Vec<Translation>> {
        let mut stmt = conn.prepare_cached(
            "SELECT * FROM translations WHERE node_id = ?1 ORDER BY locale",
        )?;
        let translations = stmt
            .query_map(params![node_id.to_string()], Self::row_to_translation)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(translations)
    }

    fn delete_for_nodes(&self, conn: &Connection, node_ids: &[Uuid]) -> AppResult<usize> {
        let mut stmt = conn.prepare_cached("DELETE FROM translations WHERE node_id = ?1")?;
        let mut removed = 0;
        for id in node_ids {
            removed += stmt.execute(params![id.to_string()])?;
        }
        Ok(removed)
    }
}
