// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - One write transaction per mutation, BEGIN IMMEDIATE
// - Readers get a deferred transaction (consistent snapshot under WAL)
// - Clear error propagation

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::config::StoreConfig;
use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Create a connection pool
///
/// - SQLite in WAL mode so readers never block on the writer
/// - Foreign keys enabled
/// - Busy timeout from config, so competing writers queue instead of failing
pub fn create_connection_pool(config: &StoreConfig) -> AppResult<ConnectionPool> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let busy_timeout = config.busy_timeout_ms;
    let manager = SqliteConnectionManager::file(&config.database_path).with_init(move |conn| {
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};
             PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
            busy_timeout
        ))?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(config.max_connections)
        .build(manager)
        .map_err(|e| AppError::Other(format!("Failed to create connection pool: {}", e)))?;

    log::debug!(
        "opened pool for {} (max {} connections)",
        config.database_path.display(),
        config.max_connections
    );
    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get()
        .map_err(|e| AppError::Pool(format!("Failed to get database connection: {}", e)))
}

/// Run `work` inside a write transaction.
///
/// The transaction starts IMMEDIATE, so the write lock is held from the
/// first statement; concurrent writers wait on `busy_timeout`. It commits
/// only when `work` returns `Ok`. On `Err` the transaction is dropped and
/// SQLite rolls every statement back.
pub fn with_write_transaction<T, F>(pool: &ConnectionPool, work: F) -> AppResult<T>
where
    F: FnOnce(&Transaction<'_>) -> AppResult<T>,
{
    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    match work(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            log::warn!("rolling back write transaction: {}", e);
            drop(tx);
            Err(e)
        }
    }
}

/// Run `work` inside a deferred (read) transaction.
pub fn with_read_transaction<T, F>(pool: &ConnectionPool, work: F) -> AppResult<T>
where
    F: FnOnce(&Transaction<'_>) -> AppResult<T>,
{
    let mut conn = get_connection(pool)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
    let value = work(&tx)?;
    tx.finish()?;
    Ok(value)
}

/// Create a standalone connection (for testing)
///
/// This creates an in-memory database, useful for unit tests.
pub fn create_test_connection() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().map_err(AppError::Database)?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(AppError::Database)?;

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(dir: &tempfile::TempDir) -> StoreConfig {
        StoreConfig::with_database(dir.path().join("nested").join("canopy.db"))
    }

    #[test]
    fn test_connection_pool_creation() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_connection_pool(&temp_config(&dir)).unwrap();
        let conn = get_connection(&pool).unwrap();

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);

        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_write_transaction_rolls_back_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_connection_pool(&temp_config(&dir)).unwrap();
        get_connection(&pool)
            .unwrap()
            .execute_batch("CREATE TABLE t (v INTEGER)")
            .unwrap();

        let result: AppResult<()> = with_write_transaction(&pool, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (1)", [])?;
            Err(AppError::Other("boom".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = with_read_transaction(&pool, |tx| {
            Ok(tx.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))?)
        })
        .unwrap();
        assert_eq!(count, 0);

        with_write_transaction(&pool, |tx| {
            tx.execute("INSERT INTO t (v) VALUES (2)", [])?;
            Ok(())
        })
        .unwrap();

        let count: i64 = with_read_transaction(&pool, |tx| {
            Ok(tx.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))?)
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_test_connection() {
        let conn = create_test_connection().unwrap();

        let result: i32 = conn
            .query_row("SELECT 1 + 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(result, 2);

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }
}
